//! Encryption middlewares.
//!
//! [`Encrypted`] wraps any [`RecordStore`] so that records are sealed on the
//! way down and opened on the way up; [`EncryptedBlobs`] does the same for a
//! [`BlobStore`]. Both are assembled with the core [`chain`] combinator, so
//! raw stores stay ciphertext-only without knowing it.
//!
//! [`chain`]: aegis_core::chain

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use aegis_core::chain::StoreLayer;
use aegis_crypto::{open, seal};

use crate::error::StoreError;
use crate::keys::KeyProvider;
use crate::record::{RecordFilter, SecretRecord};
use crate::store::{BlobStore, RecordStore};

// ── Record middleware ────────────────────────────────────────────

/// Layer that wraps a record store in [`Encrypted`].
pub struct CryptLayer {
    keys: Arc<dyn KeyProvider>,
}

impl CryptLayer {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }
}

impl<S> StoreLayer<S> for CryptLayer {
    type Output = Encrypted<S>;

    fn layer(self, inner: S) -> Encrypted<S> {
        Encrypted {
            inner,
            keys: self.keys,
        }
    }
}

/// A record store whose sensitive fields are sealed at rest.
pub struct Encrypted<S> {
    inner: S,
    keys: Arc<dyn KeyProvider>,
}

#[async_trait]
impl<R, S> RecordStore<R> for Encrypted<S>
where
    R: SecretRecord + 'static,
    S: RecordStore<R>,
{
    async fn save(&self, record: &R) -> Result<(), StoreError> {
        let key = self
            .keys
            .data_key(record.owner())
            .await
            .map_err(StoreError::KeyUnavailable)?;

        // Seal a clone; the caller's record keeps its plaintext.
        let sealed = record
            .clone()
            .map_secrets(|plaintext| seal(key.as_bytes(), &plaintext))
            .map_err(StoreError::Crypto)?;

        self.inner.save(&sealed).await
    }

    async fn load(&self, filter: RecordFilter) -> Result<Vec<R>, StoreError> {
        let rows = self.inner.load(filter).await?;
        // Empty listings never touch the key subsystem.
        if rows.is_empty() {
            return Ok(rows);
        }

        let owner = match filter.user_id {
            Some(user_id) => user_id,
            // Id-only load: every row belongs to the same owner column.
            None => rows[0].owner(),
        };
        let key = self
            .keys
            .data_key(owner)
            .await
            .map_err(StoreError::KeyUnavailable)?;

        rows.into_iter()
            .map(|row| {
                row.map_secrets(|sealed| {
                    if sealed.is_empty() {
                        Ok(sealed)
                    } else {
                        open(key.as_bytes(), &sealed)
                    }
                })
                .map_err(StoreError::Integrity)
            })
            .collect()
    }
}

// ── Blob middleware ──────────────────────────────────────────────

/// Layer that wraps a blob store in [`EncryptedBlobs`].
pub struct BlobCryptLayer {
    keys: Arc<dyn KeyProvider>,
}

impl BlobCryptLayer {
    pub fn new(keys: Arc<dyn KeyProvider>) -> Self {
        Self { keys }
    }
}

impl<S> StoreLayer<S> for BlobCryptLayer {
    type Output = EncryptedBlobs<S>;

    fn layer(self, inner: S) -> EncryptedBlobs<S> {
        EncryptedBlobs {
            inner,
            keys: self.keys,
        }
    }
}

/// A blob store whose contents are sealed at rest.
pub struct EncryptedBlobs<S> {
    inner: S,
    keys: Arc<dyn KeyProvider>,
}

#[async_trait]
impl<S: BlobStore> BlobStore for EncryptedBlobs<S> {
    async fn save(&self, user_id: Uuid, storage_key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let key = self
            .keys
            .data_key(user_id)
            .await
            .map_err(StoreError::KeyUnavailable)?;
        let sealed = seal(key.as_bytes(), bytes).map_err(StoreError::Crypto)?;
        self.inner.save(user_id, storage_key, &sealed).await
    }

    async fn load(&self, user_id: Uuid, storage_key: &str) -> Result<Vec<u8>, StoreError> {
        let sealed = self.inner.load(user_id, storage_key).await?;
        let key = self
            .keys
            .data_key(user_id)
            .await
            .map_err(StoreError::KeyUnavailable)?;
        open(key.as_bytes(), &sealed).map_err(StoreError::Integrity)
    }

    async fn delete(&self, user_id: Uuid, storage_key: &str) -> Result<(), StoreError> {
        self.inner.delete(user_id, storage_key).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::keys::{DataKey, KeyError, MasterKeyProvider};
    use crate::record::NoteRecord;
    use aegis_core::chain::chain;

    /// Key provider that counts lookups, for the empty-result fast path.
    struct CountingKeys {
        inner: MasterKeyProvider,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl KeyProvider for CountingKeys {
        async fn data_key(&self, user_id: Uuid) -> Result<DataKey, KeyError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.data_key(user_id).await
        }
    }

    #[derive(Default)]
    struct MemNotes {
        rows: Mutex<HashMap<Uuid, NoteRecord>>,
    }

    #[async_trait]
    impl RecordStore<NoteRecord> for MemNotes {
        async fn save(&self, record: &NoteRecord) -> Result<(), StoreError> {
            self.rows
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(())
        }

        async fn load(&self, filter: RecordFilter) -> Result<Vec<NoteRecord>, StoreError> {
            if filter.is_empty() {
                return Err(StoreError::QueryUnbounded);
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .values()
                .filter(|r| filter.id.is_none_or(|id| r.id == id))
                .filter(|r| filter.user_id.is_none_or(|u| r.user_id == u))
                .cloned()
                .collect())
        }
    }

    fn note(user_id: Uuid) -> NoteRecord {
        NoteRecord {
            id: Uuid::new_v4(),
            user_id,
            content: b"the plans are in the attic".to_vec(),
            description: b"reminder".to_vec(),
            updated_at: Utc::now(),
        }
    }

    fn counting_store() -> (Encrypted<MemNotes>, Arc<CountingKeys>) {
        let keys = Arc::new(CountingKeys {
            inner: MasterKeyProvider::new([3u8; 32]),
            lookups: AtomicUsize::new(0),
        });
        let store = chain(
            MemNotes::default(),
            CryptLayer::new(keys.clone() as Arc<dyn KeyProvider>),
        );
        (store, keys)
    }

    #[tokio::test]
    async fn save_seals_and_load_opens() {
        let (store, _) = counting_store();
        let user = Uuid::new_v4();
        let record = note(user);

        store.save(&record).await.unwrap();

        let loaded = store
            .load(RecordFilter::one(record.id, user))
            .await
            .unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[tokio::test]
    async fn persisted_bytes_are_not_plaintext() {
        let keys = Arc::new(MasterKeyProvider::new([3u8; 32]));
        let inner = Arc::new(MemNotes::default());

        struct Shared(Arc<MemNotes>);
        #[async_trait]
        impl RecordStore<NoteRecord> for Shared {
            async fn save(&self, r: &NoteRecord) -> Result<(), StoreError> {
                self.0.save(r).await
            }
            async fn load(&self, f: RecordFilter) -> Result<Vec<NoteRecord>, StoreError> {
                self.0.load(f).await
            }
        }

        let store = chain(Shared(inner.clone()), CryptLayer::new(keys));
        let user = Uuid::new_v4();
        let record = note(user);
        store.save(&record).await.unwrap();

        let raw = inner.rows.lock().unwrap()[&record.id].clone();
        assert_ne!(raw.content, record.content);
        assert_ne!(raw.description, record.description);
        // nonce + body + tag
        assert_eq!(
            raw.content.len(),
            aegis_crypto::NONCE_LEN + record.content.len() + 16
        );
    }

    #[tokio::test]
    async fn empty_result_skips_key_lookup() {
        let (store, keys) = counting_store();
        let loaded = store
            .load(RecordFilter::owned_by(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(loaded.is_empty());
        assert_eq!(keys.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tampered_row_is_an_integrity_error() {
        let (store, _) = counting_store();
        let user = Uuid::new_v4();
        let record = note(user);
        store.save(&record).await.unwrap();

        // Corrupt the stored ciphertext behind the middleware's back.
        {
            let mut rows = store.inner.rows.lock().unwrap();
            let row = rows.get_mut(&record.id).unwrap();
            let last = row.content.len() - 1;
            row.content[last] ^= 0xff;
        }

        let err = store
            .load(RecordFilter::one(record.id, user))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn blob_roundtrip_and_tamper() {
        #[derive(Default)]
        struct MemBlobs {
            blobs: Mutex<HashMap<(Uuid, String), Vec<u8>>>,
        }

        #[async_trait]
        impl BlobStore for MemBlobs {
            async fn save(
                &self,
                user_id: Uuid,
                storage_key: &str,
                bytes: &[u8],
            ) -> Result<(), StoreError> {
                self.blobs
                    .lock()
                    .unwrap()
                    .insert((user_id, storage_key.into()), bytes.to_vec());
                Ok(())
            }
            async fn load(&self, user_id: Uuid, storage_key: &str) -> Result<Vec<u8>, StoreError> {
                self.blobs
                    .lock()
                    .unwrap()
                    .get(&(user_id, storage_key.into()))
                    .cloned()
                    .ok_or(StoreError::BlobNotFound)
            }
            async fn delete(&self, user_id: Uuid, storage_key: &str) -> Result<(), StoreError> {
                self.blobs
                    .lock()
                    .unwrap()
                    .remove(&(user_id, storage_key.into()));
                Ok(())
            }
        }

        let keys: Arc<dyn KeyProvider> = Arc::new(MasterKeyProvider::new([5u8; 32]));
        let store = chain(MemBlobs::default(), BlobCryptLayer::new(keys));
        let user = Uuid::new_v4();

        store.save(user, "docs/a.txt", b"blob body").await.unwrap();
        assert_eq!(store.load(user, "docs/a.txt").await.unwrap(), b"blob body");

        {
            let mut blobs = store.inner.blobs.lock().unwrap();
            let sealed = blobs.get_mut(&(user, "docs/a.txt".into())).unwrap();
            sealed[0] ^= 0x01;
        }
        assert!(matches!(
            store.load(user, "docs/a.txt").await.unwrap_err(),
            StoreError::Integrity(_)
        ));
    }
}
