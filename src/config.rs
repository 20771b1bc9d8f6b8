//! Configuration via `persist.toml`
//!
//! One file configures both layers: `[engine]` for key derivation and paging,
//! `[store]` for the in-memory store. Missing sections and fields fall back to
//! defaults. `open` creates a commented default file on first use.

use std::path::Path;
use std::sync::Arc;

use persist_core::{Error, Result};
use persist_engine::{Datastore, EngineConfig};
use persist_storage::{MemoryStore, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Config file name used by `open_dir`
pub const CONFIG_FILE_NAME: &str = "persist.toml";

/// Configuration loaded from `persist.toml`
///
/// # Example
///
/// ```toml
/// [engine]
/// key_policy = "first_provider"
/// default_page_size = 10
/// max_page_size = 1000
///
/// [store]
/// codec = "message_pack"
/// transaction_attempts = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl PersistConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# strata-persist configuration

[engine]
# Where a composite entity's key comes from:
#   "first_provider" = first member that implements Putter (default)
#   "first_field"    = first member only, as earlier releases did
key_policy = "first_provider"

# Page size when a request sets no limit, and the largest allowed page.
default_page_size = 10
max_page_size = 1000

[store]
# Record encoding: "message_pack" (default) or "json"
codec = "message_pack"

# Commit attempts before a contended transaction fails
transaction_attempts = 3
"#
    }

    /// Check every setting
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.store.transaction_attempts == 0 {
            return Err(Error::invalid_argument(
                "transaction_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// `Error::Storage` if the file cannot be read, `Error::InvalidArgument`
    /// if it cannot be parsed or does not validate.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PersistConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_argument(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!(target: "persist::config", path = %path.display(), "wrote default config");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Open a `Datastore` over a fresh `MemoryStore` with this configuration
    pub fn open_in_memory(&self) -> Result<Datastore> {
        self.validate()?;
        let store = Arc::new(MemoryStore::with_config(self.store.clone()));
        Datastore::with_config(store, self.engine.clone())
    }
}

/// Open a datastore configured by `persist.toml` in `dir`
///
/// The file is created with defaults if it does not exist.
pub fn open_dir(dir: &Path) -> Result<Datastore> {
    let path = dir.join(CONFIG_FILE_NAME);
    PersistConfig::write_default_if_missing(&path)?;
    let config = PersistConfig::from_file(&path)?;
    info!(
        target: "persist::config",
        key_policy = %config.engine.key_policy,
        codec = ?config.store.codec,
        "opening datastore"
    );
    config.open_in_memory()
}

/// Open a datastore with the default configuration
pub fn open_in_memory() -> Datastore {
    Datastore::new(Arc::new(MemoryStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use persist_core::Codec;
    use persist_engine::KeyPolicy;
    use tempfile::TempDir;

    #[test]
    fn default_toml_matches_default_config() {
        let parsed: PersistConfig = toml::from_str(PersistConfig::default_toml()).unwrap();
        assert_eq!(parsed, PersistConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: PersistConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, PersistConfig::default());
    }

    #[test]
    fn parse_partial_sections() {
        let parsed: PersistConfig = toml::from_str(
            "[engine]\nkey_policy = \"first_field\"\n\n[store]\ncodec = \"json\"\n",
        )
        .unwrap();
        assert_eq!(parsed.engine.key_policy().unwrap(), KeyPolicy::FirstField);
        assert_eq!(parsed.engine.default_page_size, 10);
        assert_eq!(parsed.store.codec, Codec::Json);
        assert_eq!(parsed.store.transaction_attempts, 3);
    }

    #[test]
    fn unknown_codec_rejected() {
        let result: std::result::Result<PersistConfig, _> =
            toml::from_str("[store]\ncodec = \"bincode\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn write_default_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        PersistConfig::write_default_if_missing(&path).unwrap();
        assert!(path.exists());
        let config = PersistConfig::from_file(&path).unwrap();
        assert_eq!(config, PersistConfig::default());
    }

    #[test]
    fn write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[engine]\nkey_policy = \"first_field\"\n").unwrap();
        PersistConfig::write_default_if_missing(&path).unwrap();
        let config = PersistConfig::from_file(&path).unwrap();
        assert_eq!(config.engine.key_policy, "first_field");
    }

    #[test]
    fn write_to_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = PersistConfig::default();
        config.store.codec = Codec::Json;
        config.engine.max_page_size = 50;
        config.write_to_file(&path).unwrap();
        assert_eq!(PersistConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn from_file_rejects_invalid_policy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[engine]\nkey_policy = \"magic\"\n").unwrap();
        let err = PersistConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn from_file_missing_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = PersistConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = PersistConfig::default();
        config.store.transaction_attempts = 0;
        assert!(config.validate().is_err());
        assert!(config.open_in_memory().is_err());
    }

    #[test]
    fn open_dir_creates_config() {
        let dir = TempDir::new().unwrap();
        let ds = open_dir(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        assert_eq!(ds.config(), &EngineConfig::default());
    }
}
