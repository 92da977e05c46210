//! AES-GCM sealed envelope: `nonce || ciphertext || tag`.
//!
//! A 16-byte key selects AES-128-GCM, a 32-byte key AES-256-GCM. The nonce is
//! sampled fresh from the OS on every `seal`, so sealing the same plaintext
//! twice yields different envelopes.

use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use thiserror::Error;

/// Nonce prefix length of the sealed envelope, in bytes.
pub const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key must be 16 or 32 bytes")]
    BadKey,

    #[error("failed to sample nonce from the OS entropy source")]
    EntropyFailure,

    #[error("sealed payload shorter than the nonce prefix")]
    Truncated,

    #[error("ciphertext failed authentication")]
    AuthFailure,

    #[error("sealing failed")]
    SealFailure,
}

enum Cipher {
    Aes128(Box<Aes128Gcm>),
    Aes256(Box<Aes256Gcm>),
}

impl Cipher {
    fn for_key(key: &[u8]) -> Result<Self, CryptoError> {
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key)
                .map(|c| Cipher::Aes128(Box::new(c)))
                .map_err(|_| CryptoError::BadKey),
            32 => Aes256Gcm::new_from_slice(key)
                .map(|c| Cipher::Aes256(Box::new(c)))
                .map_err(|_| CryptoError::BadKey),
            _ => Err(CryptoError::BadKey),
        }
    }

    fn encrypt(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = Nonce::from_slice(nonce);
        match self {
            Cipher::Aes128(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|_| CryptoError::SealFailure)
    }

    fn decrypt(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = Nonce::from_slice(nonce);
        match self {
            Cipher::Aes128(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes256(c) => c.decrypt(nonce, ciphertext),
        }
        .map_err(|_| CryptoError::AuthFailure)
    }
}

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Cipher::for_key(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| CryptoError::EntropyFailure)?;

    let ciphertext = cipher.encrypt(&nonce, plaintext)?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a sealed envelope produced by [`seal`] under the same `key`.
///
/// Tampering with any byte of the envelope, or opening under a different key,
/// fails with [`CryptoError::AuthFailure`].
pub fn open(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Cipher::for_key(key)?;

    if sealed.len() < NONCE_LEN {
        return Err(CryptoError::Truncated);
    }
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

    cipher.decrypt(nonce, ciphertext)
}
