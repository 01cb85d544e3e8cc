//! Registry entities and wire types

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// A grouping of commensurable units sharing one base unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionCategory {
    /// Unique category name (e.g., "distance")
    pub name: String,
    /// Reference unit all factors in this category are relative to (e.g., "meters")
    pub base_unit: String,
}

impl ConversionCategory {
    pub fn new(name: impl Into<String>, base_unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_unit: base_unit.into(),
        }
    }

    /// The base unit as a registry entry (factor 1)
    pub fn base(&self) -> Unit {
        Unit::new(&self.base_unit, &self.name, 1.0)
    }
}

/// A unit with its factor relative to the category's base unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    /// Unit name, unique across the registry (e.g., "grams")
    pub name: String,
    /// Name of the owning category
    pub category: String,
    /// How many base units one of this unit equals (value_base = value * factor)
    pub factor_to_base: f64,
}

impl Unit {
    pub fn new(name: &str, category: &str, factor_to_base: f64) -> Self {
        Unit {
            name: name.to_string(),
            category: category.to_string(),
            factor_to_base,
        }
    }

    /// Check if this is the reference unit of `category`.
    ///
    /// Decided by name, not factor: an alias with factor 1 is not the base.
    pub fn is_base_of(&self, category: &ConversionCategory) -> bool {
        self.category == category.name && self.name == category.base_unit
    }

    /// Convert a value in this unit to the category's base unit
    pub fn to_base(&self, value: f64) -> f64 {
        value * self.factor_to_base
    }

    /// Convert a base-unit value to this unit
    pub fn from_base(&self, base_value: f64) -> f64 {
        base_value / self.factor_to_base
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validated request to add a unit to an existing category
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub name: String,
    pub factor_to_base: f64,
}

/// Validated conversion input
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub from: String,
    pub value: f64,
}

/// Result of converting one value into every unit of its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub from: String,
    pub from_value: f64,
    pub conversions: BTreeMap<String, f64>,
}

/// A category together with all of its units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub base_unit: String,
    pub units: Vec<Unit>,
}

// ============ request payloads ============
//
// Fields are optional so that missing input surfaces as a validation error
// with a useful message instead of a deserializer rejection.

/// Body of `POST /convert`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionCategoryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_unit: Option<String>,
}

impl ConversionCategoryDto {
    pub fn new(name: &str, base_unit: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            base_unit: Some(base_unit.to_string()),
        }
    }
}

/// Body of `POST /convert/{category}/units`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUnitDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_to_base: Option<f64>,
}

/// Query string of `GET /convert/{category}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kilograms() -> Unit {
        Unit::new("kilograms", "weight", 1000.0)
    }

    #[test]
    fn test_base_unit_of_category() {
        let category = ConversionCategory::new("distance", "meters");
        let base = category.base();
        assert_eq!(base.name, "meters");
        assert_eq!(base.category, "distance");
        assert!(base.is_base_of(&category));
    }

    #[test]
    fn test_unit_factor_one_alias_is_not_base() {
        let category = ConversionCategory::new("distance", "meters");
        let alias = Unit::new("metres", "distance", 1.0);
        assert!(!alias.is_base_of(&category));

        let other = ConversionCategory::new("length", "meters");
        assert!(!category.base().is_base_of(&other));
    }

    #[test]
    fn test_to_and_from_base() {
        let kg = kilograms();
        assert_eq!(kg.to_base(2.5), 2500.0);
        assert_eq!(kg.from_base(500.0), 0.5);
        assert!(!kg.is_base_of(&ConversionCategory::new("weight", "grams")));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let json = serde_json::to_value(kilograms()).unwrap();
        assert_eq!(json["factorToBase"], 1000.0);

        let category = ConversionCategory::new("distance", "meters");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["baseUnit"], "meters");
    }

    #[test]
    fn test_response_serialization() {
        let mut conversions = BTreeMap::new();
        conversions.insert("grams".to_string(), 100.0);
        conversions.insert("kilograms".to_string(), 0.1);
        let response = ConversionResponse {
            from: "grams".to_string(),
            from_value: 100.0,
            conversions,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"from":"grams","fromValue":100.0,"conversions":{"grams":100.0,"kilograms":0.1}}"#
        );
    }

    #[test]
    fn test_dto_missing_fields_deserialize() {
        let dto: ConversionCategoryDto = serde_json::from_str(r#"{"name":"distance"}"#).unwrap();
        assert_eq!(dto.name.as_deref(), Some("distance"));
        assert!(dto.base_unit.is_none());
    }
}
