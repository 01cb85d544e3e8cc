//! unitconv Registry - Categories and units
//!
//! Stores conversion categories and the units that belong to them, each
//! with a factor relative to its category's base unit.
//!
//! Backends:
//! - `MemoryStore`: volatile, for tests and ephemeral deployments
//! - `FileStore`: JSON snapshot on disk, rewritten after every mutation

mod store;
mod file;
mod registry;
mod units;

pub use store::{CategoryStore, MemoryStore};
pub use file::FileStore;
pub use registry::Registry;
pub use units::{default_categories, DefaultCategory, WEIGHT};
