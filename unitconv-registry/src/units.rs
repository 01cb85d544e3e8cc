//! Built-in unit tables installed when seeding is enabled

use unitconv_core::{ConversionCategory, Unit};

pub const WEIGHT: &str = "weight";

/// A category with the units that ship with it (base unit excluded)
#[derive(Debug, Clone)]
pub struct DefaultCategory {
    pub category: ConversionCategory,
    pub units: Vec<Unit>,
}

impl DefaultCategory {
    fn new(name: &str, base_unit: &str) -> Self {
        Self {
            category: ConversionCategory::new(name, base_unit),
            units: Vec::new(),
        }
    }

    fn unit(mut self, name: &str, factor_to_base: f64) -> Self {
        self.units.push(Unit::new(name, &self.category.name, factor_to_base));
        self
    }
}

/// Only weight ships by default; other categories are registered through the API.
pub fn default_categories() -> Vec<DefaultCategory> {
    vec![weight()]
}

fn weight() -> DefaultCategory {
    DefaultCategory::new(WEIGHT, "grams")
        // Metric
        .unit("milligrams", 0.001)
        .unit("kilograms", 1000.0)
        .unit("tonnes", 1_000_000.0)
        // Avoirdupois
        .unit("ounces", 28.349523125)
        .unit("pounds", 453.59237)
        .unit("stones", 6350.29318)
        // Other
        .unit("carats", 0.2)
        .unit("grains", 0.06479891)
}
