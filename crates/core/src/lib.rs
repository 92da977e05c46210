//! Shared domain types for the vault: validated record entities and the
//! generic store-layer combinator.

pub mod chain;
pub mod entity;

pub use chain::{chain, StoreLayer};
pub use entity::{
    BankCard, BankCardParams, Credential, CredentialParams, FileParams, FileRecord, Note,
    NoteParams, RecordKind, ValidationError, Violation,
};
