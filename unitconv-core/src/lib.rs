//! unitconv Core - Fundamental types
//!
//! This crate provides the core types used throughout unitconv:
//! - `ConversionCategory` / `Unit`: registry entities
//! - `ConversionResponse` and request DTOs: the JSON wire format
//! - `ConvertError`: structured errors with machine-readable codes
//! - validation functions turning raw input into domain values

mod error;
mod model;
mod validate;

pub use error::{ConvertError, EntityKind, ErrorBody, codes};
pub use model::{
    CategorySummary, ConversionCategory, ConversionCategoryDto, ConversionQuery,
    ConversionRequest, ConversionResponse, NewUnit, NewUnitDto, Unit,
};
pub use validate::{
    parse_value, require_name, require_present, validate_category, validate_conversion_query,
    validate_factor, validate_new_unit, MAX_NAME_LEN,
};

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, ConvertError>;

