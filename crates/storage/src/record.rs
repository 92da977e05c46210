//! Storage-layer record rows.
//!
//! Sensitive fields are byte strings. Below the crypt middleware they hold
//! sealed envelopes; above it, plaintext bytes. The structs never change
//! shape across that boundary, only content.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use aegis_crypto::CryptoError;

/// Filter for `load`: by record, by owner, or both. At least one side must be
/// present; an unbounded query is refused by the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl RecordFilter {
    /// One record of one owner.
    pub fn one(id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Some(id),
            user_id: Some(user_id),
        }
    }

    /// Everything an owner has.
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            id: None,
            user_id: Some(user_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.user_id.is_none()
    }
}

/// A record whose sensitive byte fields can be rewritten in bulk.
///
/// `map_secrets` applies `f` to every sensitive field and is how the crypt
/// middleware seals and opens records without knowing their shape.
pub trait SecretRecord: Clone + Send + Sync {
    fn owner(&self) -> Uuid;

    fn map_secrets<F>(self, f: F) -> Result<Self, CryptoError>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>, CryptoError>;
}

// ── Bank cards ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BankCardRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_number: Vec<u8>,
    pub card_holder: Vec<u8>,
    pub expiry_month: Vec<u8>,
    pub expiry_year: Vec<u8>,
    pub cvv: Vec<u8>,
    pub description: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord for BankCardRecord {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn map_secrets<F>(mut self, mut f: F) -> Result<Self, CryptoError>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>, CryptoError>,
    {
        self.card_number = f(self.card_number)?;
        self.card_holder = f(self.card_holder)?;
        self.expiry_month = f(self.expiry_month)?;
        self.expiry_year = f(self.expiry_year)?;
        self.cvv = f(self.cvv)?;
        self.description = f(self.description)?;
        Ok(self)
    }
}

// ── Credentials ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub login: Vec<u8>,
    pub password: Vec<u8>,
    pub description: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord for CredentialRecord {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn map_secrets<F>(mut self, mut f: F) -> Result<Self, CryptoError>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>, CryptoError>,
    {
        self.login = f(self.login)?;
        self.password = f(self.password)?;
        self.description = f(self.description)?;
        Ok(self)
    }
}

// ── Notes ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NoteRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: Vec<u8>,
    pub description: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord for NoteRecord {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn map_secrets<F>(mut self, mut f: F) -> Result<Self, CryptoError>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>, CryptoError>,
    {
        self.content = f(self.content)?;
        self.description = f(self.description)?;
        Ok(self)
    }
}

// ── File metadata ────────────────────────────────────────────────

/// The SQL side of a stored file. The content blob lives in the file store,
/// addressed by `(user_id, storage_key)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileMetaRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub storage_key: Vec<u8>,
    pub hash_sum: Vec<u8>,
    pub description: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord for FileMetaRecord {
    fn owner(&self) -> Uuid {
        self.user_id
    }

    fn map_secrets<F>(mut self, mut f: F) -> Result<Self, CryptoError>
    where
        F: FnMut(Vec<u8>) -> Result<Vec<u8>, CryptoError>,
    {
        self.storage_key = f(self.storage_key)?;
        self.hash_sum = f(self.hash_sum)?;
        self.description = f(self.description)?;
        Ok(self)
    }
}
