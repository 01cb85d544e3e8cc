//! Repository interface and the in-memory backend

use std::collections::BTreeMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use unitconv_core::{validate_factor, ConversionCategory, ConvertError, Result, Unit};

/// Storage backend for categories and units.
///
/// Every mutating call is atomic: it either applies completely or leaves the
/// store unchanged. Name uniqueness is enforced by the store itself.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Insert a category together with its base unit
    async fn create(&self, category: ConversionCategory) -> Result<ConversionCategory>;

    /// Insert a unit into an existing category
    async fn insert_unit(&self, unit: Unit) -> Result<Unit>;

    async fn find_category(&self, name: &str) -> Result<Option<ConversionCategory>>;

    /// Look up a unit by exact, case-sensitive name
    async fn find_by_name(&self, name: &str) -> Result<Option<Unit>>;

    /// Units of one category, ordered by name (empty if the category is unknown)
    async fn list_by_category(&self, category: &str) -> Result<Vec<Unit>>;

    /// All categories, ordered by name
    async fn list_categories(&self) -> Result<Vec<ConversionCategory>>;
}

/// Category and unit tables shared by the store implementations
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    categories: BTreeMap<String, ConversionCategory>,
    units: BTreeMap<String, Unit>,
}

impl Tables {
    pub(crate) fn insert_category(&mut self, category: ConversionCategory) -> Result<ConversionCategory> {
        if self.categories.contains_key(&category.name) {
            return Err(ConvertError::duplicate_category(&category.name));
        }
        if self.units.contains_key(&category.base_unit) {
            return Err(ConvertError::duplicate_unit(&category.base_unit));
        }

        let base = category.base();
        self.units.insert(base.name.clone(), base);
        self.categories.insert(category.name.clone(), category.clone());
        Ok(category)
    }

    pub(crate) fn insert_unit(&mut self, unit: Unit) -> Result<Unit> {
        if !self.categories.contains_key(&unit.category) {
            return Err(ConvertError::unknown_category(&unit.category));
        }
        if self.units.contains_key(&unit.name) {
            return Err(ConvertError::duplicate_unit(&unit.name));
        }
        validate_factor(unit.factor_to_base)?;

        self.units.insert(unit.name.clone(), unit.clone());
        Ok(unit)
    }

    pub(crate) fn category(&self, name: &str) -> Option<ConversionCategory> {
        self.categories.get(name).cloned()
    }

    pub(crate) fn unit(&self, name: &str) -> Option<Unit> {
        self.units.get(name).cloned()
    }

    pub(crate) fn units_in(&self, category: &str) -> Vec<Unit> {
        self.units
            .values()
            .filter(|u| u.category == category)
            .cloned()
            .collect()
    }

    pub(crate) fn categories(&self) -> Vec<ConversionCategory> {
        self.categories.values().cloned().collect()
    }

    pub(crate) fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            categories: self.categories(),
            // Base units are recreated from their category on load
            units: self.units.values().filter(|u| !self.is_base_of_category(u)).cloned().collect(),
        }
    }

    /// Rebuild tables through the same checks as live inserts
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ConvertError::storage(format!(
                "unsupported snapshot version {}, expected {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let mut tables = Tables::default();
        for category in snapshot.categories {
            tables
                .insert_category(category)
                .map_err(|e| ConvertError::storage(format!("corrupt snapshot: {}", e)))?;
        }
        for unit in snapshot.units {
            tables
                .insert_unit(unit)
                .map_err(|e| ConvertError::storage(format!("corrupt snapshot: {}", e)))?;
        }
        Ok(tables)
    }

    fn is_base_of_category(&self, unit: &Unit) -> bool {
        self.categories
            .get(&unit.category)
            .map_or(false, |c| unit.is_base_of(c))
    }
}

pub(crate) const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of the tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub version: u32,
    pub categories: Vec<ConversionCategory>,
    pub units: Vec<Unit>,
}

/// Volatile store; concurrent reads, serialized writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create(&self, category: ConversionCategory) -> Result<ConversionCategory> {
        self.tables.write().await.insert_category(category)
    }

    async fn insert_unit(&self, unit: Unit) -> Result<Unit> {
        self.tables.write().await.insert_unit(unit)
    }

    async fn find_category(&self, name: &str) -> Result<Option<ConversionCategory>> {
        Ok(self.tables.read().await.category(name))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Unit>> {
        Ok(self.tables.read().await.unit(name))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Unit>> {
        Ok(self.tables.read().await.units_in(category))
    }

    async fn list_categories(&self) -> Result<Vec<ConversionCategory>> {
        Ok(self.tables.read().await.categories())
    }
}
