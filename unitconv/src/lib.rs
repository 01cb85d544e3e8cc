//! unitconv - Conversion service
//!
//! Converts a value given in one unit into every unit of the same category:
//! the value is scaled to the category's base unit, then divided by each
//! sibling's factor. Arithmetic is plain f64 with no rounding.

mod service;

pub use service::{convert_between, ConversionService};
