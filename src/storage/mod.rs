pub mod local;

use crate::model::StoreError;

pub use local::LocalObjectStore;

/// Keyed blob storage holding raw batches and flattened artifacts.
pub trait ObjectStore {
    fn read(&self, key: &str) -> Result<String, StoreError>;
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}
