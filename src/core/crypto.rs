//! Cryptographic engine: Argon2id key derivation and AES-256-GCM
//! authenticated encryption of individual vault fields.
//!
//! Every encrypted field is stored as `base64(nonce || ciphertext || tag)`
//! with a fresh random 12-byte nonce drawn per encryption. Nonce reuse under
//! the same key is the single catastrophic failure mode of this scheme, so
//! nonces always come from the OS RNG, never from a counter or derived value.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::core::constants::{
    ARGON2_LANES, ARGON2_MEMORY_KIB, ARGON2_TIME, KEY_LEN, NONCE_LEN, PASSWORD_CHARSET, SALT_LEN,
};
use crate::error::{CryptoError, Result};

/// Field-level encryption engine bound to one derived key.
///
/// The key lives in zeroizing memory and is wiped when the engine is
/// dropped, which happens whenever the owning session closes. The key is
/// never logged, serialized, or exposed through `Debug`.
pub struct CryptoEngine {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoEngine").finish_non_exhaustive()
    }
}

impl CryptoEngine {
    /// Derive an engine from a master password and salt with Argon2id
    /// (t=3, m=64 MiB, p=4, 32-byte output).
    ///
    /// The parameters are format constants; see [`crate::core::constants`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` if the KDF rejects its inputs.
    pub fn derive(master_password: &str, salt: &[u8]) -> Result<Self> {
        let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME, ARGON2_LANES, Some(KEY_LEN))
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        argon2
            .hash_password_into(master_password.as_bytes(), salt, key.as_mut_slice())
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

        Ok(Self { key })
    }

    /// Construct an engine from a raw 32-byte key.
    pub fn from_key(key: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_ref()))
    }

    /// Encrypt bytes, returning `base64(nonce || ciphertext || tag)`.
    ///
    /// A fresh random nonce is drawn from the OS RNG on every call.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptionFailed` if the AEAD seal fails.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a `base64(nonce || ciphertext || tag)` blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidCiphertext` if the blob is not valid
    /// base64 or decodes to fewer bytes than a nonce, before any AEAD
    /// attempt is made. Returns `CryptoError::DecryptionFailed` on a tag
    /// mismatch, which is the observable signal for a wrong master password
    /// or tampered ciphertext.
    pub fn decrypt(&self, blob: &str) -> Result<Zeroizing<Vec<u8>>> {
        let raw = BASE64
            .decode(blob)
            .map_err(|_| CryptoError::InvalidCiphertext)?;
        if raw.len() < NONCE_LEN {
            return Err(CryptoError::InvalidCiphertext.into());
        }

        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        Ok(Zeroizing::new(plaintext))
    }

    /// Encrypt a UTF-8 string.
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String> {
        self.encrypt(plaintext.as_bytes())
    }

    /// Decrypt to a UTF-8 string in zeroizing memory.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoEngine::decrypt`]; non-UTF-8 plaintext is reported
    /// as `CryptoError::DecryptionFailed`.
    pub fn decrypt_str(&self, blob: &str) -> Result<Zeroizing<String>> {
        let bytes = self.decrypt(blob)?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| CryptoError::DecryptionFailed)?;
        Ok(Zeroizing::new(text))
    }
}

/// Compute `base64(SHA-256(data))`.
///
/// This is a corruption detector, not a keyed integrity guarantee: anyone
/// who can rewrite the file can recompute a matching checksum. Per-field
/// tamper evidence comes from the AEAD tag.
pub fn checksum(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    BASE64.encode(hash)
}

/// Check data against an expected checksum.
pub fn verify_checksum(data: &[u8], expected: &str) -> bool {
    checksum(data) == expected
}

/// Generate a random 16-byte KDF salt from the OS RNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Generate a random alphanumeric password of the given length.
pub fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())] as char)
        .collect()
}
