//! Category/unit registry
//!
//! Validates input, turns store misses into `NotFound`, and logs every
//! mutation. Cheap to clone; all clones share one store.

use std::sync::Arc;
use tracing::{debug, info, warn};
use unitconv_core::{
    validate_category, validate_new_unit, CategorySummary, ConversionCategory,
    ConversionCategoryDto, ConvertError, NewUnitDto, Result, Unit,
};

use crate::store::{CategoryStore, MemoryStore};
use crate::units::default_categories;

#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn CategoryStore>,
}

impl Registry {
    pub fn new<S: CategoryStore + 'static>(store: S) -> Self {
        Self { store: Arc::new(store) }
    }

    /// Empty registry backed by a `MemoryStore`
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Register a new category; its base unit is registered with it
    pub async fn create_category(&self, dto: &ConversionCategoryDto) -> Result<ConversionCategory> {
        let category = validate_category(dto)?;
        let created = self.store.create(category).await?;
        info!(
            category = %created.name,
            base_unit = %created.base_unit,
            "Registered conversion category"
        );
        Ok(created)
    }

    /// Add a unit to an existing category
    pub async fn add_unit(&self, category: &str, dto: &NewUnitDto) -> Result<Unit> {
        let new_unit = validate_new_unit(dto)?;
        let category = self.find_category(category).await?;

        let unit = Unit::new(&new_unit.name, &category.name, new_unit.factor_to_base);
        let created = self.store.insert_unit(unit).await?;
        info!(
            unit = %created.name,
            category = %created.category,
            factor_to_base = created.factor_to_base,
            "Registered unit"
        );
        Ok(created)
    }

    pub async fn find_category(&self, name: &str) -> Result<ConversionCategory> {
        self.store
            .find_category(name)
            .await?
            .ok_or_else(|| ConvertError::unknown_category(name))
    }

    /// Case-sensitive exact-match unit lookup
    pub async fn find_unit(&self, name: &str) -> Result<Unit> {
        let unit = self.store.find_by_name(name).await?;
        debug!(unit = name, found = unit.is_some(), "Unit lookup");
        unit.ok_or_else(|| ConvertError::unknown_unit(name))
    }

    /// Units of a category, ordered by name
    pub async fn list_units_in_category(&self, category: &str) -> Result<Vec<Unit>> {
        let category = self.find_category(category).await?;
        self.store.list_by_category(&category.name).await
    }

    pub async fn list_categories(&self) -> Result<Vec<ConversionCategory>> {
        self.store.list_categories().await
    }

    /// Every category with its units
    pub async fn summaries(&self) -> Result<Vec<CategorySummary>> {
        let mut summaries = Vec::new();
        for category in self.store.list_categories().await? {
            let units = self.store.list_by_category(&category.name).await?;
            summaries.push(CategorySummary {
                name: category.name,
                base_unit: category.base_unit,
                units,
            });
        }
        Ok(summaries)
    }

    /// Install the built-in categories that are not present yet.
    /// Returns the names of the categories that were installed.
    pub async fn seed_defaults(&self) -> Result<Vec<String>> {
        let mut installed = Vec::new();

        for default in default_categories() {
            let name = default.category.name.clone();
            if self.store.find_category(&name).await?.is_some() {
                debug!(category = %name, "Default category already present");
                continue;
            }

            match self.store.create(default.category).await {
                Ok(_) => {}
                Err(ConvertError::Conflict { kind, name: taken }) => {
                    warn!(category = %name, %kind, name = %taken, "Skipping default category");
                    continue;
                }
                Err(e) => return Err(e),
            }

            for unit in default.units {
                match self.store.insert_unit(unit).await {
                    Ok(_) => {}
                    Err(ConvertError::Conflict { name: taken, .. }) => {
                        warn!(category = %name, unit = %taken, "Skipping default unit already registered elsewhere");
                    }
                    Err(e) => return Err(e),
                }
            }

            info!(category = %name, "Installed default category");
            installed.push(name);
        }

        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::WEIGHT;
    use unitconv_core::EntityKind;

    async fn registry_with_distance() -> Registry {
        let registry = Registry::in_memory();
        registry
            .create_category(&ConversionCategoryDto::new("distance", "meters"))
            .await
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_create_category_returns_entity() {
        let registry = Registry::in_memory();
        let created = registry
            .create_category(&ConversionCategoryDto::new(" distance ", "meters"))
            .await
            .unwrap();
        assert_eq!(created, ConversionCategory::new("distance", "meters"));
    }

    #[tokio::test]
    async fn test_create_category_validation() {
        let registry = Registry::in_memory();
        let err = registry
            .create_category(&ConversionCategoryDto::new("", "meters"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
        assert!(registry.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_category_is_conflict() {
        let registry = registry_with_distance().await;
        let err = registry
            .create_category(&ConversionCategoryDto::new("distance", "feet"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConvertError::Conflict { kind: EntityKind::Category, name: "distance".into() }
        );
    }

    #[tokio::test]
    async fn test_find_unit_is_case_sensitive() {
        let registry = registry_with_distance().await;
        assert!(registry.find_unit("meters").await.is_ok());
        assert_eq!(
            registry.find_unit("Meters").await.unwrap_err(),
            ConvertError::unknown_unit("Meters")
        );
    }

    #[tokio::test]
    async fn test_add_unit() {
        let registry = registry_with_distance().await;
        let dto = NewUnitDto { name: Some("kilometers".into()), factor_to_base: Some(1000.0) };
        let unit = registry.add_unit("distance", &dto).await.unwrap();
        assert_eq!(unit, Unit::new("kilometers", "distance", 1000.0));

        let units = registry.list_units_in_category("distance").await.unwrap();
        assert_eq!(units.len(), 2);
    }

    #[tokio::test]
    async fn test_add_unit_to_unknown_category() {
        let registry = Registry::in_memory();
        let dto = NewUnitDto { name: Some("hours".into()), factor_to_base: Some(3600.0) };
        let err = registry.add_unit("time", &dto).await.unwrap_err();
        assert_eq!(err, ConvertError::unknown_category("time"));
    }

    #[tokio::test]
    async fn test_list_units_of_unknown_category() {
        let registry = Registry::in_memory();
        let err = registry.list_units_in_category("time").await.unwrap_err();
        assert_eq!(err, ConvertError::unknown_category("time"));
    }

    #[tokio::test]
    async fn test_seed_defaults_is_idempotent() {
        let registry = Registry::in_memory();
        assert_eq!(registry.seed_defaults().await.unwrap(), vec![WEIGHT.to_string()]);
        assert!(registry.seed_defaults().await.unwrap().is_empty());

        let grams = registry.find_unit("grams").await.unwrap();
        let weight = registry.find_category(WEIGHT).await.unwrap();
        assert!(grams.is_base_of(&weight));
        assert_eq!(registry.find_unit("kilograms").await.unwrap().category, WEIGHT);
    }

    #[tokio::test]
    async fn test_seed_skips_units_taken_elsewhere() {
        let registry = Registry::in_memory();
        registry
            .create_category(&ConversionCategoryDto::new("currency", "pounds"))
            .await
            .unwrap();

        registry.seed_defaults().await.unwrap();
        assert_eq!(registry.find_unit("pounds").await.unwrap().category, "currency");
        assert_eq!(registry.find_unit("ounces").await.unwrap().category, WEIGHT);
    }

    #[tokio::test]
    async fn test_summaries() {
        let registry = registry_with_distance().await;
        registry.seed_defaults().await.unwrap();

        let summaries = registry.summaries().await.unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["distance", WEIGHT]);
        assert_eq!(summaries[0].units.len(), 1);
        assert_eq!(summaries[1].units.len(), 9);
    }
}
