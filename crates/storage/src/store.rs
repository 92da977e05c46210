//! Store capability traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::RecordFilter;

/// Upsert + filtered-select over one record kind.
#[async_trait]
pub trait RecordStore<R>: Send + Sync {
    /// Insert the record, or update every non-identity column when the id
    /// already exists. The owner column is never changed by an update.
    async fn save(&self, record: &R) -> Result<(), StoreError>;

    /// Fetch records matching `filter`. An empty result is not an error;
    /// an empty filter is [`StoreError::QueryUnbounded`].
    async fn load(&self, filter: RecordFilter) -> Result<Vec<R>, StoreError>;
}

/// Content-addressed blob persistence under a per-user namespace.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, user_id: Uuid, storage_key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    async fn load(&self, user_id: Uuid, storage_key: &str) -> Result<Vec<u8>, StoreError>;

    /// Idempotent: deleting a missing blob succeeds.
    async fn delete(&self, user_id: Uuid, storage_key: &str) -> Result<(), StoreError>;
}
