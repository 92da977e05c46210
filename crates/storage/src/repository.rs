//! Typed repositories: the only storage surface the application layer sees.
//!
//! Each one is `chain(raw store, crypt layer)` for its record kind, so
//! plaintext never reaches persistence and ciphertext never escapes into the
//! application layer. No behaviour is added beyond the composition.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use aegis_core::chain::chain;

use crate::blob::FileStore;
use crate::crypt::{BlobCryptLayer, CryptLayer, Encrypted, EncryptedBlobs};
use crate::error::StoreError;
use crate::keys::KeyProvider;
use crate::record::{BankCardRecord, CredentialRecord, FileMetaRecord, NoteRecord, RecordFilter};
use crate::sql::{BankCardSql, CredentialSql, FileMetaSql, NoteSql};
use crate::store::{BlobStore, RecordStore};

pub struct BankCardRepository {
    store: Encrypted<BankCardSql>,
}

impl BankCardRepository {
    pub fn new(pool: PgPool, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            store: chain(BankCardSql::new(pool), CryptLayer::new(keys)),
        }
    }
}

#[async_trait]
impl RecordStore<BankCardRecord> for BankCardRepository {
    async fn save(&self, record: &BankCardRecord) -> Result<(), StoreError> {
        self.store.save(record).await
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<BankCardRecord>, StoreError> {
        self.store.load(filter).await
    }
}

pub struct CredentialRepository {
    store: Encrypted<CredentialSql>,
}

impl CredentialRepository {
    pub fn new(pool: PgPool, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            store: chain(CredentialSql::new(pool), CryptLayer::new(keys)),
        }
    }
}

#[async_trait]
impl RecordStore<CredentialRecord> for CredentialRepository {
    async fn save(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        self.store.save(record).await
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<CredentialRecord>, StoreError> {
        self.store.load(filter).await
    }
}

pub struct NoteRepository {
    store: Encrypted<NoteSql>,
}

impl NoteRepository {
    pub fn new(pool: PgPool, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            store: chain(NoteSql::new(pool), CryptLayer::new(keys)),
        }
    }
}

#[async_trait]
impl RecordStore<NoteRecord> for NoteRepository {
    async fn save(&self, record: &NoteRecord) -> Result<(), StoreError> {
        self.store.save(record).await
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<NoteRecord>, StoreError> {
        self.store.load(filter).await
    }
}

/// File records span two backends: metadata rows in SQL and the content blob
/// on disk, both sealed under the owner's data key.
pub struct FileRepository {
    meta: Encrypted<FileMetaSql>,
    blobs: EncryptedBlobs<FileStore>,
}

impl FileRepository {
    pub fn new(
        pool: PgPool,
        blob_base: impl Into<PathBuf>,
        keys: Arc<dyn KeyProvider>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            meta: chain(FileMetaSql::new(pool), CryptLayer::new(keys.clone())),
            blobs: chain(FileStore::new(blob_base)?, BlobCryptLayer::new(keys)),
        })
    }
}

#[async_trait]
impl RecordStore<FileMetaRecord> for FileRepository {
    async fn save(&self, record: &FileMetaRecord) -> Result<(), StoreError> {
        self.meta.save(record).await
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<FileMetaRecord>, StoreError> {
        self.meta.load(filter).await
    }
}

#[async_trait]
impl BlobStore for FileRepository {
    async fn save(&self, user_id: Uuid, storage_key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.save(user_id, storage_key, bytes).await
    }

    async fn load(&self, user_id: Uuid, storage_key: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs.load(user_id, storage_key).await
    }

    async fn delete(&self, user_id: Uuid, storage_key: &str) -> Result<(), StoreError> {
        self.blobs.delete(user_id, storage_key).await
    }
}
