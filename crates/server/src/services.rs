//! Application services: one per record kind, all with the same shape.
//!
//! `pull` fetches a single owned record, `list` everything the caller owns,
//! and `push` validates and saves: a fresh id on create, or an in-place
//! update after the ownership check. Services speak plaintext entities upward
//! and records downward; repositories behind the [`RecordStore`] trait do the
//! sealing.
//!
//! [`RecordStore`]: aegis_storage::RecordStore

mod bank_cards;
mod credentials;
mod error;
mod files;
mod notes;

pub use bank_cards::BankCardService;
pub use credentials::CredentialService;
pub use error::ServiceError;
pub use files::FileService;
pub use notes::NoteService;

use aegis_core::RecordKind;

use error::tech;

/// Decode a plaintext field coming back from storage.
fn utf8(kind: RecordKind, bytes: Vec<u8>) -> Result<String, ServiceError> {
    String::from_utf8(bytes).map_err(|_| tech(kind, aegis_storage::StoreError::Encoding))
}
