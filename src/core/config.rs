//! Configuration file management.
//!
//! The config is a JSON file selecting the storage backend, the vault path,
//! and optional WebDAV sync settings. A missing file yields the defaults
//! rather than an error. The config can also travel through the same
//! push/pull primitive as the vault via [`Config::to_bytes`] and
//! [`Config::from_bytes`]; it is an independent blob with no checksum or
//! key relationship to the vault.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Storage backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Webdav,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Webdav => write!(f, "webdav"),
        }
    }
}

/// WebDAV connection settings for a remote blob store.
///
/// The wire-level client itself lives outside this crate; these settings
/// are carried here so one config file can drive both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDavConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Vault path on the server.
    pub remote_path: String,
    /// Optional config-file path on the server, synced as a separate blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_remote_path: Option<String>,
    pub insecure_skip_verify: bool,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub default_storage: StorageKind,
    pub vault_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webdav: Option<WebDavConfig>,
    pub auto_sync: bool,
    /// Seconds before the (external) clipboard integration clears a copied
    /// password.
    pub clipboard_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        let vault_path = Self::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(constants::VAULT_FILE);
        Self {
            default_storage: StorageKind::Local,
            vault_path,
            webdav: None,
            auto_sync: false,
            clipboard_timeout: 30,
        }
    }
}

impl Config {
    /// Data directory (`~/.warren`), if a home directory can be determined.
    pub fn data_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(constants::DATA_DIR))
    }

    /// Default config file path (`~/.warren/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join(constants::CONFIG_FILE))
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` or `ConfigError::Parse` on failure.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read(path).map_err(ConfigError::Read)?;
        Self::from_bytes(&data)
    }

    /// Save configuration as pretty JSON, creating parent directories.
    ///
    /// The file is written with mode 0600 on Unix.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` or `ConfigError::Write` on failure.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Write)?;
        }
        fs::write(path, self.to_bytes()?).map_err(ConfigError::Write)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))
                .map_err(ConfigError::Write)?;
        }

        Ok(())
    }

    /// Serialize to the byte form used for both the local file and the
    /// remote config blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| ConfigError::Serialize(e).into())
    }

    /// Parse the byte form produced by [`Config::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| ConfigError::Parse(e).into())
    }
}
