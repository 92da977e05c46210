//! Bulk synchronisation: the whole vault in one request.
//!
//! Pull and push fan out across the four record kinds concurrently and
//! fail fast: `tokio::try_join!` drops the sibling futures as soon as one
//! task errors, so a slow kind never delays the failure response. Items that
//! were pushed before the failing one stay persisted; callers needing
//! all-or-nothing semantics must push records individually.

use tokio::try_join;
use uuid::Uuid;

use aegis_core::{
    BankCard, BankCardParams, Credential, CredentialParams, FileParams, FileRecord, Note,
    NoteParams, RecordKind,
};

use crate::services::{
    BankCardService, CredentialService, FileService, NoteService, ServiceError,
};

/// Everything one user has in the vault. File entries carry metadata only;
/// content blobs are pulled per file.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPayload {
    pub user_id: Uuid,
    pub bank_cards: Vec<BankCard>,
    pub credentials: Vec<Credential>,
    pub notes: Vec<Note>,
    pub files: Vec<FileRecord>,
}

/// One record in a bulk push: parameters plus the id when the client means
/// to update an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct PushItem<P> {
    pub id: Option<Uuid>,
    pub params: P,
}

/// A bulk push request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncPush {
    pub bank_cards: Vec<PushItem<BankCardParams>>,
    pub credentials: Vec<PushItem<CredentialParams>>,
    pub notes: Vec<PushItem<NoteParams>>,
    pub files: Vec<PushItem<FileParams>>,
}

#[derive(Clone)]
pub struct SyncService {
    bank_cards: BankCardService,
    credentials: CredentialService,
    notes: NoteService,
    files: FileService,
}

impl SyncService {
    pub fn new(
        bank_cards: BankCardService,
        credentials: CredentialService,
        notes: NoteService,
        files: FileService,
    ) -> Self {
        Self {
            bank_cards,
            credentials,
            notes,
            files,
        }
    }

    /// Pull all four kinds concurrently and assemble the payload.
    pub async fn pull(&self, user_id: Uuid) -> Result<SyncPayload, ServiceError> {
        let (bank_cards, credentials, notes, files) = try_join!(
            async {
                self.bank_cards
                    .list(user_id)
                    .await
                    .map_err(pull_failed)
            },
            async {
                self.credentials
                    .list(user_id)
                    .await
                    .map_err(pull_failed)
            },
            async { self.notes.list(user_id).await.map_err(pull_failed) },
            async { self.files.list(user_id).await.map_err(pull_failed) },
        )?;

        Ok(SyncPayload {
            user_id,
            bank_cards,
            credentials,
            notes,
            files,
        })
    }

    /// Push all four kinds concurrently; within a kind, items go in the
    /// order the client sent them so a failure names the offending item.
    pub async fn push(&self, user_id: Uuid, payload: SyncPush) -> Result<(), ServiceError> {
        try_join!(
            async {
                for item in &payload.bank_cards {
                    self.bank_cards
                        .push(user_id, item.id, item.params.clone())
                        .await
                        .map_err(|e| push_failed(RecordKind::BankCard, item.id, e))?;
                }
                Ok::<(), ServiceError>(())
            },
            async {
                for item in &payload.credentials {
                    self.credentials
                        .push(user_id, item.id, item.params.clone())
                        .await
                        .map_err(|e| push_failed(RecordKind::Credential, item.id, e))?;
                }
                Ok(())
            },
            async {
                for item in &payload.notes {
                    self.notes
                        .push(user_id, item.id, item.params.clone())
                        .await
                        .map_err(|e| push_failed(RecordKind::Note, item.id, e))?;
                }
                Ok(())
            },
            async {
                for item in &payload.files {
                    self.files
                        .push(user_id, item.id, item.params.clone())
                        .await
                        .map_err(|e| push_failed(RecordKind::File, item.id, e))?;
                }
                Ok(())
            },
        )?;
        Ok(())
    }
}

fn pull_failed(source: ServiceError) -> ServiceError {
    ServiceError::PullFailed {
        source: Box::new(source),
    }
}

fn push_failed(kind: RecordKind, id: Option<Uuid>, source: ServiceError) -> ServiceError {
    ServiceError::PushFailed {
        kind,
        id,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use aegis_storage::{
        BankCardRecord, CredentialRecord, FileMetaRecord, NoteRecord, RecordFilter, RecordStore,
        StoreError,
    };

    use super::*;
    use crate::services::testing::{MemBlobs, MemStore};

    fn sync_service() -> SyncService {
        SyncService::new(
            BankCardService::new(Arc::new(MemStore::new(
                |r: &BankCardRecord| r.id,
                |r: &BankCardRecord| r.user_id,
            ))),
            CredentialService::new(Arc::new(MemStore::new(
                |r: &CredentialRecord| r.id,
                |r: &CredentialRecord| r.user_id,
            ))),
            NoteService::new(Arc::new(MemStore::new(
                |r: &NoteRecord| r.id,
                |r: &NoteRecord| r.user_id,
            ))),
            FileService::new(
                Arc::new(MemStore::new(
                    |r: &FileMetaRecord| r.id,
                    |r: &FileMetaRecord| r.user_id,
                )),
                Arc::new(MemBlobs::default()),
            ),
        )
    }

    fn full_push() -> SyncPush {
        SyncPush {
            bank_cards: vec![PushItem {
                id: None,
                params: BankCardParams {
                    card_number: "4532015112830366".into(),
                    card_holder: "John Doe".into(),
                    expiry_month: "12".into(),
                    expiry_year: "2099".into(),
                    cvv: "123".into(),
                    description: String::new(),
                },
            }],
            credentials: vec![PushItem {
                id: None,
                params: CredentialParams {
                    login: "root".into(),
                    password: "hunter2".into(),
                    description: String::new(),
                },
            }],
            notes: vec![PushItem {
                id: None,
                params: NoteParams {
                    content: "remember the milk".into(),
                    description: String::new(),
                },
            }],
            files: vec![PushItem {
                id: None,
                params: FileParams {
                    storage_key: "docs/a.txt".into(),
                    description: String::new(),
                    data: b"blob".to_vec(),
                },
            }],
        }
    }

    #[tokio::test]
    async fn empty_vault_pulls_empty_slices() {
        let sync = sync_service();
        let user = Uuid::new_v4();
        let payload = sync.pull(user).await.unwrap();
        assert_eq!(
            payload,
            SyncPayload {
                user_id: user,
                bank_cards: vec![],
                credentials: vec![],
                notes: vec![],
                files: vec![],
            }
        );
    }

    #[tokio::test]
    async fn push_then_pull_roundtrips_all_kinds() {
        let sync = sync_service();
        let user = Uuid::new_v4();

        sync.push(user, full_push()).await.unwrap();
        let payload = sync.pull(user).await.unwrap();

        assert_eq!(payload.bank_cards.len(), 1);
        assert_eq!(payload.credentials.len(), 1);
        assert_eq!(payload.notes.len(), 1);
        assert_eq!(payload.files.len(), 1);
        assert!(payload.bank_cards[0].user_id == user);
        assert!(payload.credentials[0].user_id == user);
        assert!(payload.notes[0].user_id == user);
        assert!(payload.files[0].user_id == user);
    }

    #[tokio::test]
    async fn push_failure_names_the_offending_item() {
        let sync = sync_service();
        let user = Uuid::new_v4();

        let mut push = full_push();
        push.notes[0].params.content = String::new();

        let err = sync.push(user, push).await.unwrap_err();
        match err {
            ServiceError::PushFailed { kind, id, source } => {
                assert_eq!(kind, RecordKind::Note);
                assert_eq!(id, None);
                assert!(matches!(*source, ServiceError::Validation(_)));
            }
            other => panic!("expected push failure, got {other:?}"),
        }
    }

    /// A store that never answers. If fail-fast works, a failure in a
    /// sibling kind returns without waiting for this one.
    struct StalledStore;

    #[async_trait]
    impl RecordStore<BankCardRecord> for StalledStore {
        async fn save(&self, _: &BankCardRecord) -> Result<(), StoreError> {
            std::future::pending().await
        }

        async fn load(&self, _: RecordFilter) -> Result<Vec<BankCardRecord>, StoreError> {
            std::future::pending().await
        }
    }

    /// A store that always fails.
    struct BrokenStore;

    #[async_trait]
    impl RecordStore<NoteRecord> for BrokenStore {
        async fn save(&self, _: &NoteRecord) -> Result<(), StoreError> {
            Err(StoreError::Persistence(sqlx::Error::PoolClosed))
        }

        async fn load(&self, _: RecordFilter) -> Result<Vec<NoteRecord>, StoreError> {
            Err(StoreError::Persistence(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn pull_fails_fast_without_waiting_for_stalled_kinds() {
        let sync = SyncService::new(
            BankCardService::new(Arc::new(StalledStore)),
            CredentialService::new(Arc::new(MemStore::new(
                |r: &CredentialRecord| r.id,
                |r: &CredentialRecord| r.user_id,
            ))),
            NoteService::new(Arc::new(BrokenStore)),
            FileService::new(
                Arc::new(MemStore::new(
                    |r: &FileMetaRecord| r.id,
                    |r: &FileMetaRecord| r.user_id,
                )),
                Arc::new(MemBlobs::default()),
            ),
        );

        let result = tokio::time::timeout(Duration::from_secs(1), sync.pull(Uuid::new_v4())).await;
        let err = result.expect("pull must not wait for the stalled kind");
        assert!(matches!(
            err.unwrap_err(),
            ServiceError::PullFailed { .. }
        ));
    }
}
