//! Error types for warren.
//!
//! Errors are grouped by the component that produces them and wrapped in a
//! single top-level [`Error`]. The core never logs, retries, or suppresses
//! an error; every failure propagates to the immediate caller and is
//! recoverable by correcting input or retrying the call.

use thiserror::Error;

/// Top-level error type returned by all public operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from key derivation, encryption, and decryption.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ciphertext is not valid base64 or is shorter than a nonce.
    ///
    /// Raised before any AEAD attempt is made.
    #[error("invalid ciphertext")]
    InvalidCiphertext,

    /// AEAD tag mismatch. The de facto "wrong master password" or
    /// "tampered ciphertext" signal.
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Errors from vault lifecycle and entry operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("vault is not open")]
    NotOpen,

    #[error("vault is already open")]
    AlreadyOpen,

    #[error("vault already exists")]
    VaultExists,

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("entry already exists: {0}")]
    EntryExists(String),

    /// Malformed serialized vault, malformed salt encoding, or a
    /// checksum mismatch against the stored content.
    #[error("vault corrupted: {0}")]
    Corrupted(String),
}

/// Errors from blob storage backends, surfaced unchanged to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage: not found")]
    NotFound,

    #[error("storage: permission denied")]
    PermissionDenied,

    #[error("storage: connection failed: {0}")]
    ConnectionFailed(String),

    #[error("storage: io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration file handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("config write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The configured storage kind is implemented outside this crate.
    /// Construct the backend and pass it to `Manager::new` directly.
    #[error("{0} storage is provided by an external backend")]
    ExternalBackend(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
