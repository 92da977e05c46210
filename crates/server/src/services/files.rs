//! File service: metadata rows plus the content blob.
//!
//! Pushes persist metadata first, then the blob. A blob-write failure on an
//! update triggers a compensating re-save of the previous metadata; if even
//! that fails the record and the blob disagree and the error is fatal.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use aegis_core::entity::{FileParams, FileRecord};
use aegis_core::RecordKind;
use aegis_storage::{BlobStore, FileMetaRecord, RecordFilter, RecordStore};

use super::error::{tech, ServiceError};
use super::utf8;

const KIND: RecordKind = RecordKind::File;

#[derive(Clone)]
pub struct FileService {
    meta: Arc<dyn RecordStore<FileMetaRecord>>,
    blobs: Arc<dyn BlobStore>,
}

impl FileService {
    pub fn new(meta: Arc<dyn RecordStore<FileMetaRecord>>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { meta, blobs }
    }

    /// Fetch one file with its content restored from the blob store.
    ///
    /// The restored content must hash to the stored `hash_sum`; a mismatch
    /// means the row and the blob have diverged and is reported as a tech
    /// failure, not as absence.
    pub async fn pull(&self, id: Uuid, user_id: Uuid) -> Result<FileRecord, ServiceError> {
        let mut record = self.pull_meta(id, user_id).await?;
        let data = self
            .blobs
            .load(user_id, &record.storage_key)
            .await
            .map_err(|e| tech(KIND, e))?;
        if aegis_core::entity::content_hash(&data) != record.hash_sum {
            return Err(ServiceError::HashMismatch);
        }
        record.data = data;
        Ok(record)
    }

    /// Fetch every file's metadata; content blobs stay on disk.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<FileRecord>, ServiceError> {
        self.meta
            .load(RecordFilter::owned_by(user_id))
            .await
            .map_err(|e| tech(KIND, e))?
            .into_iter()
            .map(to_entity)
            .collect()
    }

    /// Validate and save metadata plus blob.
    pub async fn push(
        &self,
        user_id: Uuid,
        id: Option<Uuid>,
        params: FileParams,
    ) -> Result<Uuid, ServiceError> {
        let mut record = FileRecord::new(user_id, params)?;

        let previous = match id {
            Some(id) => {
                let previous = self.check_access_to_update(id, user_id).await?;
                record.id = id;
                Some(previous)
            }
            None => None,
        };

        self.meta
            .save(&to_meta(&record))
            .await
            .map_err(|e| tech(KIND, e))?;

        if let Err(blob_err) = self
            .blobs
            .save(user_id, &record.storage_key, &record.data)
            .await
        {
            if let Some(previous) = &previous {
                if let Err(rollback_err) = self.meta.save(&to_meta(previous)).await {
                    return Err(ServiceError::RollbackFailed {
                        source: rollback_err,
                    });
                }
            }
            return Err(tech(KIND, blob_err));
        }

        // The old blob is unreachable once the key changes; drop it.
        if let Some(previous) = &previous {
            if previous.storage_key != record.storage_key {
                if let Err(e) = self.blobs.delete(user_id, &previous.storage_key).await {
                    warn!("Failed to remove blob at replaced key: {e}");
                }
            }
        }

        Ok(record.id)
    }

    async fn pull_meta(&self, id: Uuid, user_id: Uuid) -> Result<FileRecord, ServiceError> {
        let rows = self
            .meta
            .load(RecordFilter::one(id, user_id))
            .await
            .map_err(|e| tech(KIND, e))?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(ServiceError::NotFound { kind: KIND })?;
        to_entity(row)
    }

    /// Refuse an update unless the record exists and the caller owns it.
    /// Returns the current state for the rollback path.
    async fn check_access_to_update(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<FileRecord, ServiceError> {
        let rows = self
            .meta
            .load(RecordFilter {
                id: Some(id),
                user_id: None,
            })
            .await
            .map_err(|e| tech(KIND, e))?;
        match rows.into_iter().next() {
            None => Err(ServiceError::NotFound { kind: KIND }),
            Some(row) if row.user_id != user_id => Err(ServiceError::AccessDenied { kind: KIND }),
            Some(row) => to_entity(row),
        }
    }
}

fn to_meta(record: &FileRecord) -> FileMetaRecord {
    FileMetaRecord {
        id: record.id,
        user_id: record.user_id,
        storage_key: record.storage_key.clone().into_bytes(),
        hash_sum: record.hash_sum.clone().into_bytes(),
        description: record.description.clone().into_bytes(),
        updated_at: record.updated_at,
    }
}

fn to_entity(record: FileMetaRecord) -> Result<FileRecord, ServiceError> {
    Ok(FileRecord {
        id: record.id,
        user_id: record.user_id,
        storage_key: utf8(KIND, record.storage_key)?,
        hash_sum: utf8(KIND, record.hash_sum)?,
        description: utf8(KIND, record.description)?,
        data: Vec::new(),
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{BrokenBlobs, MemBlobs, MemStore};

    fn meta_store() -> Arc<MemStore<FileMetaRecord>> {
        Arc::new(MemStore::new(
            |r: &FileMetaRecord| r.id,
            |r: &FileMetaRecord| r.user_id,
        ))
    }

    fn params(key: &str, data: &[u8]) -> FileParams {
        FileParams {
            storage_key: key.into(),
            description: String::new(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn push_then_pull_restores_content() {
        let service = FileService::new(meta_store(), Arc::new(MemBlobs::default()));
        let user = Uuid::new_v4();

        let id = service
            .push(user, None, params("docs/a.txt", b"file body"))
            .await
            .unwrap();

        let file = service.pull(id, user).await.unwrap();
        assert_eq!(file.data, b"file body");
        assert_eq!(file.hash_sum, aegis_core::entity::content_hash(b"file body"));
    }

    #[tokio::test]
    async fn list_leaves_content_on_disk() {
        let service = FileService::new(meta_store(), Arc::new(MemBlobs::default()));
        let user = Uuid::new_v4();
        service
            .push(user, None, params("docs/a.txt", b"file body"))
            .await
            .unwrap();

        let files = service.list(user).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].data.is_empty());
    }

    #[tokio::test]
    async fn failed_blob_write_on_update_rolls_back_metadata() {
        let meta = meta_store();
        let blobs = Arc::new(MemBlobs::default());
        let service = FileService::new(meta.clone(), blobs.clone());
        let user = Uuid::new_v4();

        let id = service
            .push(user, None, params("docs/a.txt", b"version one"))
            .await
            .unwrap();

        // Same metadata store, blob writes now fail.
        let broken = FileService::new(meta.clone(), Arc::new(BrokenBlobs));
        let err = broken
            .push(user, Some(id), params("docs/a.txt", b"version two"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Tech { .. }));

        // Metadata still describes version one.
        let file = service.pull(id, user).await.unwrap();
        assert_eq!(file.data, b"version one");
        assert_eq!(
            file.hash_sum,
            aegis_core::entity::content_hash(b"version one")
        );
    }

    #[tokio::test]
    async fn failed_blob_write_on_create_is_tech_without_rollback() {
        let service = FileService::new(meta_store(), Arc::new(BrokenBlobs));
        let err = service
            .push(Uuid::new_v4(), None, params("docs/a.txt", b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Tech { .. }));
    }

    #[tokio::test]
    async fn changing_the_storage_key_removes_the_old_blob() {
        let meta = meta_store();
        let blobs = Arc::new(MemBlobs::default());
        let service = FileService::new(meta, blobs.clone());
        let user = Uuid::new_v4();

        let id = service
            .push(user, None, params("old/key.txt", b"body"))
            .await
            .unwrap();
        service
            .push(user, Some(id), params("new/key.txt", b"body"))
            .await
            .unwrap();

        let stored = blobs.blobs.lock().unwrap();
        assert!(stored.contains_key(&(user, "new/key.txt".into())));
        assert!(!stored.contains_key(&(user, "old/key.txt".into())));
    }

    #[tokio::test]
    async fn hash_mismatch_is_surfaced() {
        let meta = meta_store();
        let blobs = Arc::new(MemBlobs::default());
        let service = FileService::new(meta, blobs.clone());
        let user = Uuid::new_v4();

        let id = service
            .push(user, None, params("docs/a.txt", b"original"))
            .await
            .unwrap();

        // Swap the blob behind the service's back.
        blobs
            .blobs
            .lock()
            .unwrap()
            .insert((user, "docs/a.txt".into()), b"tampered".to_vec());

        let err = service.pull(id, user).await.unwrap_err();
        assert!(matches!(err, ServiceError::HashMismatch));
    }
}
