//! Encrypted persistence for the vault.
//!
//! Layering, bottom up: raw SQL stores ([`sql`]) and the on-disk blob store
//! ([`blob`]) move ciphertext only; the crypt middlewares ([`crypt`]) seal and
//! open sensitive fields around them using per-user keys from a
//! [`keys::KeyProvider`]; the typed repositories ([`repository`]) assemble the
//! chain and are the only storage surface the application layer sees.

pub mod blob;
pub mod crypt;
pub mod error;
pub mod keys;
pub mod record;
pub mod repository;
pub mod sql;
pub mod store;

pub use blob::FileStore;
pub use crypt::{BlobCryptLayer, CryptLayer, Encrypted, EncryptedBlobs};
pub use error::StoreError;
pub use keys::{DataKey, KeyError, KeyProvider, MasterKeyProvider};
pub use record::{
    BankCardRecord, CredentialRecord, FileMetaRecord, NoteRecord, RecordFilter, SecretRecord,
};
pub use repository::{BankCardRepository, CredentialRepository, FileRepository, NoteRepository};
pub use store::{BlobStore, RecordStore};
