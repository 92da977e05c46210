//! Stored file records: metadata plus the plaintext content blob.
//!
//! The content hash is computed here, not trusted from the caller, so a
//! persisted `hash_sum` always describes the bytes that were actually pushed.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{ValidationError, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParams {
    pub storage_key: String,
    pub description: String,
    pub data: Vec<u8>,
}

/// A file record. `data` holds the plaintext blob on the way in and out of
/// the vault; listings leave it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub storage_key: String,
    pub hash_sum: String,
    pub description: String,
    pub data: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(user_id: Uuid, params: FileParams) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();
        if params.storage_key.is_empty() {
            violations.push(Violation::EmptyStorageKey);
        }
        if params.data.is_empty() {
            violations.push(Violation::FileDataRequired);
        }
        ValidationError::check(violations)?;

        let hash_sum = content_hash(&params.data);
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            storage_key: params.storage_key,
            hash_sum,
            description: params.description,
            data: params.data,
            updated_at: Utc::now(),
        })
    }
}

/// Hex SHA-256 digest of a content blob.
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
