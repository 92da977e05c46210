//! Password hashing on top of bcrypt.
//!
//! bcrypt only looks at the first 72 bytes of its input, so longer inputs are
//! refused outright instead of being silently truncated.

use thiserror::Error;

/// Longest accepted password, in bytes.
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password longer than {MAX_PASSWORD_LEN} bytes")]
    InputTooLong,

    #[error("malformed password hash")]
    BadHash,

    #[error("password hashing failed")]
    HashFailure,
}

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    if plain.len() > MAX_PASSWORD_LEN {
        return Err(PasswordError::InputTooLong);
    }
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|_| PasswordError::HashFailure)
}

/// Check a plaintext password against a stored hash.
///
/// A mismatch is `Ok(false)`; only a hash that cannot be parsed is an error.
pub fn verify_password(hash: &str, plain: &str) -> Result<bool, PasswordError> {
    if plain.len() > MAX_PASSWORD_LEN {
        return Ok(false);
    }
    bcrypt::verify(plain, hash).map_err(|_| PasswordError::BadHash)
}
