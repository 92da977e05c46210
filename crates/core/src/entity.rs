//! Vault record entities.
//!
//! Every kind is built through a validating constructor: a successfully
//! constructed value carries a fresh id, the owner, a server-side
//! `updated_at` stamp, and fields that satisfy the kind's rules. Validators
//! all run; failures are aggregated so one request reports every violation.

use thiserror::Error;

mod bank_card;
mod credential;
mod file_record;
mod note;

pub use bank_card::{BankCard, BankCardParams};
pub use credential::{Credential, CredentialParams};
pub use file_record::{content_hash, FileParams, FileRecord};
pub use note::{Note, NoteParams};

/// The four record kinds the vault stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    BankCard,
    Credential,
    Note,
    File,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::BankCard => write!(f, "bank card"),
            RecordKind::Credential => write!(f, "credential"),
            RecordKind::Note => write!(f, "note"),
            RecordKind::File => write!(f, "file"),
        }
    }
}

/// A single violated field rule. The display string is safe to show to
/// clients verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Violation {
    #[error("Invalid card number")]
    InvalidCardNumber,
    #[error("Card number failed checksum")]
    LuhnFailed,
    #[error("Card holder is required")]
    EmptyCardHolder,
    #[error("Invalid expiry month")]
    InvalidExpiryMonth,
    #[error("Invalid expiry year")]
    InvalidExpiryYear,
    #[error("Card is expired")]
    CardExpired,
    #[error("Invalid CVV")]
    InvalidCvv,
    #[error("Login is required")]
    EmptyLogin,
    #[error("Password is required")]
    EmptyPassword,
    #[error("Invalid note text")]
    InvalidNoteText,
    #[error("Storage key is required")]
    EmptyStorageKey,
    #[error("File data is required")]
    FileDataRequired,
}

/// Aggregate of every rule a set of parameters violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    fn check(violations: Vec<Violation>) -> Result<(), ValidationError> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid parameters: ")?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

fn all_ascii_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
