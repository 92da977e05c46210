//! Byte-level crypto primitives for the vault.
//!
//! Two surfaces: the AES-GCM sealed envelope used for every sensitive field
//! and file blob ([`cipher`]), and password hashing for account secrets
//! ([`password`]). Everything above this crate treats both as opaque.

pub mod cipher;
pub mod password;

pub use cipher::{open, seal, CryptoError, NONCE_LEN};
pub use password::{hash_password, verify_password, PasswordError, MAX_PASSWORD_LEN};
