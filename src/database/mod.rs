use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use tracing::info;

use crate::{
    config::{Config, StoreBackend},
    error::StoreError,
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Document-level persistence used by every resource kind.
///
/// Filters are equality matches on top-level fields. Sort documents map a
/// field to `1` (ascending) or `-1` (descending), applied in key order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_many(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>, StoreError>;
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;
    async fn insert_one(&self, collection: &str, document: Document)
        -> Result<ObjectId, StoreError>;
    /// Returns `false` when no document carries `_id`.
    async fn replace_one(
        &self,
        collection: &str,
        _id: &ObjectId,
        document: Document,
    ) -> Result<bool, StoreError>;
    /// Returns `false` when no document carries `_id`.
    async fn delete_one(&self, collection: &str, _id: &ObjectId) -> Result<bool, StoreError>;
}

pub type Store = Arc<dyn EntityStore>;

/// `(collection, field)` pairs every backend keeps unique on write.
pub(crate) const UNIQUE_KEYS: [(&str, &str); 2] = [("workers", "email"), ("users", "email")];

pub async fn connect(config: &Config) -> Result<Store, StoreError> {
    match config.store {
        StoreBackend::MongoDb => {
            let store = MongoStore::connect(&config.mongodb_uri, &config.mongodb_database).await?;
            store.ensure_indexes().await?;
            info!(database = %config.mongodb_database, "connected to mongodb");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory store, records are lost on shutdown");
            Ok(Arc::new(MemoryStore::default()))
        }
    }
}
