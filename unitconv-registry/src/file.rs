//! JSON snapshot store
//!
//! The full table set is kept in memory and rewritten to disk after every
//! successful mutation. Writes go to a sibling temporary file first and are
//! then renamed over the snapshot, so a crash never leaves a torn file.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use unitconv_core::{ConversionCategory, ConvertError, Result, Unit};

use crate::store::{CategoryStore, Snapshot, Tables};

pub struct FileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FileStore {
    /// Open the snapshot at `path`; a missing file opens as an empty store
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let tables = match fs::read_to_string(&path).await {
            Ok(raw) => {
                let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| {
                    ConvertError::storage(format!("failed to parse {}: {}", path.display(), e))
                })?;
                let tables = Tables::from_snapshot(snapshot)?;
                info!(
                    path = %path.display(),
                    categories = tables.categories().len(),
                    "Loaded registry snapshot"
                );
                tables
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No registry snapshot found; starting empty");
                Tables::default()
            }
            Err(err) => {
                return Err(ConvertError::storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )))
            }
        };

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Apply `change` to a copy of the tables, persist it, then publish it.
    /// The write guard is held across the flush so writers stay serialized.
    async fn mutate<T>(&self, change: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    async fn persist(&self, tables: &Tables) -> Result<()> {
        let body = serde_json::to_vec_pretty(&tables.to_snapshot())
            .map_err(|e| ConvertError::storage(format!("failed to encode snapshot: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ConvertError::storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let tmp = temp_path(&self.path);
        fs::write(&tmp, &body).await.map_err(|e| {
            ConvertError::storage(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            ConvertError::storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), bytes = body.len(), "Registry snapshot written");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "unitconv-data.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl CategoryStore for FileStore {
    async fn create(&self, category: ConversionCategory) -> Result<ConversionCategory> {
        self.mutate(|tables| tables.insert_category(category)).await
    }

    async fn insert_unit(&self, unit: Unit) -> Result<Unit> {
        self.mutate(|tables| tables.insert_unit(unit)).await
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
