//! Input validation
//!
//! Turns raw payloads into validated domain values, or a
//! `ConvertError::Validation` naming the offending field.

use crate::error::ConvertError;
use crate::model::{
    ConversionCategory, ConversionCategoryDto, ConversionQuery, ConversionRequest, NewUnit,
    NewUnitDto,
};

/// Longest accepted category or unit name
pub const MAX_NAME_LEN: usize = 64;

/// Require a non-blank name; returns it trimmed
pub fn require_name(field: &str, raw: Option<&str>) -> Result<String, ConvertError> {
    let raw = raw.ok_or_else(|| ConvertError::missing_field(field))?;
    let name = raw.trim();

    if name.is_empty() {
        return Err(ConvertError::validation(format!("'{}' must not be blank", field)));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ConvertError::validation(format!(
            "'{}' must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    if name.contains('/') {
        return Err(ConvertError::validation(format!("'{}' must not contain '/'", field)));
    }

    Ok(name.to_string())
}

/// Require a non-blank reference to an existing name; returned exactly as given
pub fn require_present(field: &str, raw: Option<&str>) -> Result<String, ConvertError> {
    let raw = raw.ok_or_else(|| ConvertError::missing_field(field))?;
    if raw.trim().is_empty() {
        return Err(ConvertError::validation(format!("'{}' must not be blank", field)));
    }
    Ok(raw.to_string())
}

/// Parse a numeric string into a finite f64
pub fn parse_value(field: &str, raw: Option<&str>) -> Result<f64, ConvertError> {
    let raw = raw.ok_or_else(|| ConvertError::missing_field(field))?;
    let trimmed = raw.trim();

    let value: f64 = trimmed.parse().map_err(|_| {
        ConvertError::validation(format!("'{}' is not a valid number: '{}'", field, raw))
    })?;

    if !value.is_finite() {
        return Err(ConvertError::validation(format!("'{}' must be a finite number", field)));
    }

    Ok(value)
}

/// Conversion factors must be positive and finite
pub fn validate_factor(factor: f64) -> Result<f64, ConvertError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ConvertError::validation(format!(
            "'factorToBase' must be a positive finite number, got {}",
            factor
        )));
    }
    Ok(factor)
}

pub fn validate_category(dto: &ConversionCategoryDto) -> Result<ConversionCategory, ConvertError> {
    let name = require_name("name", dto.name.as_deref())?;
    let base_unit = require_name("baseUnit", dto.base_unit.as_deref())?;
    Ok(ConversionCategory::new(name, base_unit))
}

pub fn validate_new_unit(dto: &NewUnitDto) -> Result<NewUnit, ConvertError> {
    let name = require_name("name", dto.name.as_deref())?;
    let factor = dto
        .factor_to_base
        .ok_or_else(|| ConvertError::missing_field("factorToBase"))?;
    let factor_to_base = validate_factor(factor)?;
    Ok(NewUnit { name, factor_to_base })
}

/// Both `from` and `value` are checked before either is reported, so a
/// request missing both names both.
pub fn validate_conversion_query(query: &ConversionQuery) -> Result<ConversionRequest, ConvertError> {
    let missing: Vec<&str> = [
        ("from", query.from.is_none()),
        ("value", query.value.is_none()),
    ]
    .iter()
    .filter_map(|(field, absent)| absent.then_some(*field))
    .collect();

    match missing.as_slice() {
        [] => {}
        [field] => return Err(ConvertError::missing_field(field)),
        fields => {
            return Err(ConvertError::validation(format!(
                "required query parameters missing: {}",
                fields.join(", ")
            )))
        }
    }

    let from = require_present("from", query.from.as_deref())?;
    let value = parse_value("value", query.value.as_deref())?;
    Ok(ConversionRequest { from, value })
}
