use thiserror::Error;

use crate::keys::KeyError;
use aegis_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query requires at least one of id or user_id")]
    QueryUnbounded,

    #[error("database error")]
    Persistence(#[from] sqlx::Error),

    #[error("storage key escapes the user directory")]
    PathTraversal,

    #[error("file blob not found")]
    BlobNotFound,

    #[error("filesystem error")]
    Io(#[from] std::io::Error),

    #[error("data key unavailable")]
    KeyUnavailable(#[source] KeyError),

    #[error("encryption failed")]
    Crypto(#[source] CryptoError),

    /// Stored ciphertext no longer authenticates under the owner's key.
    /// Surfaced separately from [`StoreError::BlobNotFound`]: the row exists
    /// and its refusal to open means corruption, not absence.
    #[error("stored ciphertext failed integrity check")]
    Integrity(#[source] CryptoError),

    #[error("stored field is not valid UTF-8")]
    Encoding,
}
