//! Constants used throughout warren.
//!
//! The KDF parameters and length constants below are part of the vault's
//! on-disk format contract. Changing any of them silently invalidates every
//! existing vault; there is no parameter versioning, so treat a change as a
//! format migration.

/// Version tag written into new vault files.
pub const VAULT_VERSION: &str = "1.0";

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Argon2 salt length in bytes.
pub const SALT_LEN: usize = 16;

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Argon2id iteration count.
pub const ARGON2_TIME: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id parallelism.
pub const ARGON2_LANES: u32 = 4;

/// Data directory relative to HOME (~/.warren).
pub const DATA_DIR: &str = ".warren";

/// Configuration file name inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Vault file name inside the data directory.
pub const VAULT_FILE: &str = "vault.json";

/// Character set for generated passwords.
pub const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
