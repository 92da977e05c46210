//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use aegis_storage::{
    BankCardRecord, BankCardRepository, BlobStore, CredentialRecord, CredentialRepository,
    FileMetaRecord, FileRepository, KeyProvider, NoteRecord, NoteRepository, RecordStore,
    StoreError,
};

use crate::services::{BankCardService, CredentialService, FileService, NoteService};
use crate::sync::SyncService;

pub struct AppState {
    pub bank_cards: BankCardService,
    pub credentials: CredentialService,
    pub notes: NoteService,
    pub files: FileService,
    pub sync: SyncService,
}

impl AppState {
    /// Production wiring: sqlx repositories and the on-disk file store, all
    /// behind the per-user crypt chain.
    pub fn new(
        pool: PgPool,
        blob_base: impl Into<PathBuf>,
        keys: Arc<dyn KeyProvider>,
    ) -> Result<Self, StoreError> {
        let files = Arc::new(FileRepository::new(pool.clone(), blob_base, keys.clone())?);
        Ok(Self::with_stores(
            Arc::new(BankCardRepository::new(pool.clone(), keys.clone())),
            Arc::new(CredentialRepository::new(pool.clone(), keys.clone())),
            Arc::new(NoteRepository::new(pool, keys)),
            files.clone(),
            files,
        ))
    }

    /// Wire the services onto arbitrary store implementations. This is the
    /// seam tests use to run the full HTTP surface against in-memory stores.
    pub fn with_stores(
        bank_cards: Arc<dyn RecordStore<BankCardRecord>>,
        credentials: Arc<dyn RecordStore<CredentialRecord>>,
        notes: Arc<dyn RecordStore<NoteRecord>>,
        file_meta: Arc<dyn RecordStore<FileMetaRecord>>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let bank_cards = BankCardService::new(bank_cards);
        let credentials = CredentialService::new(credentials);
        let notes = NoteService::new(notes);
        let files = FileService::new(file_meta, blobs);
        let sync = SyncService::new(
            bank_cards.clone(),
            credentials.clone(),
            notes.clone(),
            files.clone(),
        );
        Self {
            bank_cards,
            credentials,
            notes,
            files,
            sync,
        }
    }
}
