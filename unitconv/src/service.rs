//! Conversion Service

use std::collections::BTreeMap;
use tracing::debug;
use unitconv_core::{
    validate_conversion_query, ConversionQuery, ConversionResponse, ConvertError, Result, Unit,
};
use unitconv_registry::Registry;

/// Convert a value between two units of the same category
pub fn convert_between(from: &Unit, to: &Unit, value: f64) -> f64 {
    to.from_base(from.to_base(value))
}

#[derive(Clone)]
pub struct ConversionService {
    registry: Registry,
}

impl ConversionService {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Convert `value` from the named unit into every unit of its category.
    ///
    /// The source unit appears in `conversions` with the input value unchanged.
    pub async fn convert(&self, from: &str, value: f64) -> Result<ConversionResponse> {
        if !value.is_finite() {
            return Err(ConvertError::validation("'value' must be a finite number"));
        }

        let unit = self.registry.find_unit(from).await?;
        let siblings = self.registry.list_units_in_category(&unit.category).await?;
        let conversions = convert_to_all(&unit, value, &siblings)?;

        debug!(
            from = %unit.name,
            category = %unit.category,
            value,
            targets = conversions.len(),
            "Converted value"
        );

        Ok(ConversionResponse {
            from: from.to_string(),
            from_value: value,
            conversions,
        })
    }

    /// Validate raw query input, then convert; the unit must belong to `category`
    pub async fn convert_in_category(
        &self,
        category: &str,
        query: &ConversionQuery,
    ) -> Result<ConversionResponse> {
        let request = validate_conversion_query(query)?;
        let category = self.registry.find_category(category).await?;
        let unit = self.registry.find_unit(&request.from).await?;

        if unit.category != category.name {
            return Err(ConvertError::validation(format!(
                "unit '{}' belongs to category '{}', not '{}'",
                unit.name, unit.category, category.name
            )));
        }

        self.convert(&request.from, request.value).await
    }
}

fn convert_to_all(from: &Unit, value: f64, siblings: &[Unit]) -> Result<BTreeMap<String, f64>> {
    let base_value = from.to_base(value);
    if !base_value.is_finite() {
        return Err(out_of_range(value, &from.category));
    }

    siblings
        .iter()
        .map(|target| {
            let converted = if target.name == from.name {
                value
            } else {
                target.from_base(base_value)
            };
            if !converted.is_finite() {
                return Err(out_of_range(value, &from.category));
            }
            Ok((target.name.clone(), converted))
        })
        .collect()
}

fn out_of_range(value: f64, category: &str) -> ConvertError {
    ConvertError::validation(format!(
        "value out of range: {value} cannot be represented in every unit of '{category}'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unitconv_core::{ConversionCategoryDto, NewUnitDto};

    const EPSILON: f64 = 1e-9;

    async fn weight_service() -> ConversionService {
        let registry = Registry::in_memory();
        registry.seed_defaults().await.unwrap();
        ConversionService::new(registry)
    }

    fn query(from: Option<&str>, value: Option<&str>) -> ConversionQuery {
        ConversionQuery {
            from: from.map(String::from),
            value: value.map(String::from),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = EPSILON * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} got {}",
            expected,
            actual
        );
    }

    #[tokio::test]
    async fn test_convert_echoes_input() {
        let service = weight_service().await;
        let response = service.convert("grams", 100.0).await.unwrap();

        assert_eq!(response.from, "grams");
        assert_eq!(response.from_value, 100.0);
    }

    #[tokio::test]
    async fn test_convert_covers_whole_category() {
        let service = weight_service().await;
        let response = service.convert("grams", 100.0).await.unwrap();

        assert_eq!(response.conversions.len(), 9);
        assert_eq!(response.conversions["grams"], 100.0);
        assert_close(response.conversions["kilograms"], 0.1);
        assert_close(response.conversions["milligrams"], 100_000.0);
        assert_close(response.conversions["ounces"], 3.527396194958041);
    }

    #[tokio::test]
    async fn test_identity_conversion_is_exact() {
        let service = weight_service().await;
        // 0.1 * 28.349523125 / 28.349523125 need not round-trip bit-for-bit
        let response = service.convert("ounces", 0.1).await.unwrap();
        assert_eq!(response.conversions["ounces"], 0.1);
    }

    #[tokio::test]
    async fn test_round_trip_between_all_pairs() {
        let service = weight_service().await;
        let units = service.registry().list_units_in_category("weight").await.unwrap();

        for value in [0.0, 1.0, 100.0, -42.5, 1e-6, 123456.789] {
            for a in &units {
                for b in &units {
                    let there = convert_between(a, b, value);
                    let back = convert_between(b, a, there);
                    assert_close(back, value);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_unit_is_not_found() {
        let service = weight_service().await;
        let err = service.convert("furlongs", 1.0).await.unwrap_err();
        assert_eq!(err, ConvertError::unknown_unit("furlongs"));
    }

    #[tokio::test]
    async fn test_non_finite_value_rejected() {
        let service = weight_service().await;
        let err = service.convert("grams", f64::NAN).await.unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[tokio::test]
    async fn test_overflowing_conversion_is_rejected() {
        let service = weight_service().await;

        // 1e303 tonnes is 1e309 grams, past f64::MAX
        let err = service.convert("tonnes", 1e303).await.unwrap_err();
        assert!(matches!(err, ConvertError::Validation(ref msg) if msg.starts_with("value out of range")));

        // The base value fits but milligrams overflow
        let err = service.convert("grams", 1e306).await.unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));

        let response = service.convert("tonnes", 1e290).await.unwrap();
        assert!(response.conversions.values().all(|v| v.is_finite()));
    }

    #[tokio::test]
    async fn test_query_validation_precedes_lookup() {
        let service = weight_service().await;

        let err = service
            .convert_in_category("time", &query(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));

        let err = service
            .convert_in_category("weight", &query(Some("furlongs"), Some("abc")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unit_name_is_not_trimmed() {
        let service = weight_service().await;
        let err = service
            .convert_in_category("weight", &query(Some(" grams"), Some("1")))
            .await
            .unwrap_err();
        assert_eq!(err, ConvertError::unknown_unit(" grams"));
    }

    #[tokio::test]
    async fn test_convert_in_category() {
        let service = weight_service().await;
        let response = service
            .convert_in_category("weight", &query(Some("pounds"), Some("1")))
            .await
            .unwrap();
        assert_close(response.conversions["grams"], 453.59237);
        assert_close(response.conversions["ounces"], 16.0);
    }

    #[tokio::test]
    async fn test_convert_in_wrong_category() {
        let service = weight_service().await;
        service
            .registry()
            .create_category(&ConversionCategoryDto::new("distance", "meters"))
            .await
            .unwrap();

        let err = service
            .convert_in_category("weight", &query(Some("meters"), Some("1")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));

        let err = service
            .convert_in_category("time", &query(Some("seconds"), Some("1")))
            .await
            .unwrap_err();
        assert_eq!(err, ConvertError::unknown_category("time"));
    }

    #[tokio::test]
    async fn test_newly_added_unit_participates() {
        let service = weight_service().await;
        service
            .registry()
            .add_unit("weight", &NewUnitDto { name: Some("slugs".into()), factor_to_base: Some(14593.903) })
            .await
            .unwrap();

        let response = service.convert("kilograms", 14.593903).await.unwrap();
        assert_close(response.conversions["slugs"], 1.0);
    }
}
