//! The application-level error type shared by every service.
//!
//! Domain validation failures map through one-to-one; anything the storage
//! layer reports that the service does not recognise as a client fault is
//! carried as a kind-tagged tech error with its cause chain intact, so the
//! delivery layer can log the whole story while clients see a sanitised
//! message.

use thiserror::Error;
use uuid::Uuid;

use aegis_core::{RecordKind, ValidationError};
use aegis_storage::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{} not found", title(.kind))]
    NotFound { kind: RecordKind },

    #[error("Access to this {kind} is denied")]
    AccessDenied { kind: RecordKind },

    #[error("{kind} storage operation failed")]
    Tech {
        kind: RecordKind,
        #[source]
        source: StoreError,
    },

    /// The file blob write failed and the metadata could not be restored to
    /// its pre-update state. Fatal: the row and the blob now disagree.
    #[error("failed to restore file metadata after blob write failure")]
    RollbackFailed {
        #[source]
        source: StoreError,
    },

    /// A restored blob no longer hashes to the stored `hash_sum`.
    #[error("file content does not match its stored hash")]
    HashMismatch,

    #[error("bulk pull failed")]
    PullFailed {
        #[source]
        source: Box<ServiceError>,
    },

    #[error("bulk push failed for {kind} {}", display_id(.id))]
    PushFailed {
        kind: RecordKind,
        id: Option<Uuid>,
        #[source]
        source: Box<ServiceError>,
    },
}

impl ServiceError {
    /// Strip the bulk-sync wrappers, leaving the per-item error that carries
    /// the class and public message.
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::PullFailed { source } | ServiceError::PushFailed { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

/// Capitalised kind name for client-facing messages.
fn title(kind: &RecordKind) -> &'static str {
    match kind {
        RecordKind::BankCard => "Bank card",
        RecordKind::Credential => "Credential",
        RecordKind::Note => "Note",
        RecordKind::File => "File",
    }
}

fn display_id(id: &Option<Uuid>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "<new>".into(),
    }
}

/// Wrap an unrecognised storage failure as a kind-tagged tech error.
pub(crate) fn tech(kind: RecordKind, source: StoreError) -> ServiceError {
    ServiceError::Tech { kind, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_messages() {
        let err = ServiceError::NotFound {
            kind: RecordKind::BankCard,
        };
        assert_eq!(err.to_string(), "Bank card not found");

        let err = ServiceError::AccessDenied {
            kind: RecordKind::Note,
        };
        assert_eq!(err.to_string(), "Access to this note is denied");
    }

    #[test]
    fn root_unwraps_sync_wrappers() {
        let inner = ServiceError::NotFound {
            kind: RecordKind::Note,
        };
        let wrapped = ServiceError::PushFailed {
            kind: RecordKind::Note,
            id: Some(Uuid::new_v4()),
            source: Box::new(inner),
        };
        assert!(matches!(
            wrapped.root(),
            ServiceError::NotFound {
                kind: RecordKind::Note
            }
        ));
    }
}
