//! Per-user data keys.
//!
//! The vault never encrypts two users' records under the same key. The
//! [`KeyProvider`] capability hides where keys come from; the default
//! implementation derives them from a single master key with HKDF-SHA256,
//! which makes repeated lookups for one user trivially stable.

use std::path::Path;

use async_trait::async_trait;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Environment variable holding the master key as 64 hex characters.
pub const MASTER_KEY_ENV: &str = "VAULT_MASTER_KEY";

/// Key file written next to the vault data when no env key is configured.
const MASTER_KEY_FILE: &str = ".master_key";

/// A symmetric data key for one user's sensitive fields.
#[derive(Clone)]
pub struct DataKey(Vec<u8>);

impl DataKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        write!(f, "DataKey({} bytes)", self.0.len())
    }
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{MASTER_KEY_ENV} must be 64 hex characters (32 bytes)")]
    MasterKeyInvalid,

    #[error("failed to read or write the master key file")]
    Io(#[from] std::io::Error),

    #[error("data key unavailable for user {0}")]
    Unavailable(Uuid),
}

/// Capability to look up the data key for a user.
///
/// Implementations must hand back equal-valued keys for repeated calls with
/// the same `user_id` within one request.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn data_key(&self, user_id: Uuid) -> Result<DataKey, KeyError>;
}

/// Derives per-user AES-256 keys from one master key.
pub struct MasterKeyProvider {
    master: [u8; 32],
}

impl MasterKeyProvider {
    pub fn new(master: [u8; 32]) -> Self {
        Self { master }
    }

    /// Load the master key from `VAULT_MASTER_KEY`, falling back to a key
    /// file under `data_dir` that is generated on first start.
    pub fn from_env_or_file(data_dir: &Path) -> Result<Self, KeyError> {
        if let Ok(env_key) = std::env::var(MASTER_KEY_ENV) {
            let bytes = hex::decode(env_key.trim()).map_err(|_| KeyError::MasterKeyInvalid)?;
            let master: [u8; 32] = bytes.try_into().map_err(|_| KeyError::MasterKeyInvalid)?;
            info!("Using master key from {} env var", MASTER_KEY_ENV);
            return Ok(Self::new(master));
        }

        let key_path = data_dir.join(MASTER_KEY_FILE);
        if key_path.exists() {
            let hex_key = std::fs::read_to_string(&key_path)?;
            let bytes = hex::decode(hex_key.trim()).map_err(|_| KeyError::MasterKeyInvalid)?;
            let master: [u8; 32] = bytes.try_into().map_err(|_| KeyError::MasterKeyInvalid)?;
            info!("Loaded master key from {}", key_path.display());
            return Ok(Self::new(master));
        }

        let mut master = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut master);
        std::fs::create_dir_all(data_dir)?;
        std::fs::write(&key_path, hex::encode(master))?;
        info!("Generated new master key at {}", key_path.display());
        Ok(Self::new(master))
    }

    fn derive(&self, user_id: Uuid) -> DataKey {
        let hk = Hkdf::<Sha256>::new(None, &self.master);
        let info = format!("aegis-data-key-{user_id}");
        let mut okm = [0u8; 32];
        hk.expand(info.as_bytes(), &mut okm)
            .expect("32 bytes is a valid HKDF-SHA256 output length");
        DataKey::new(okm.to_vec())
    }
}

#[async_trait]
impl KeyProvider for MasterKeyProvider {
    async fn data_key(&self, user_id: Uuid) -> Result<DataKey, KeyError> {
        Ok(self.derive(user_id))
    }
}
