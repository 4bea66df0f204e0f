//! Store configuration.
//!
//! Sources are layered with the `config` crate. Precedence, lowest first:
//! built-in defaults, an optional config file, then `VAULT_RECORDS__*`
//! environment variables (`__` separates nested keys, e.g.
//! `VAULT_RECORDS__LAYOUT__VAULT_DIR`).

use crate::error::SetupError;
use crate::logging::LoggingConfig;
use crate::storage::{FsRecordStorage, StoreLayout, WriteMode};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "VAULT_RECORDS";

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Top-level configuration for a filesystem record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory that contains the vault
    #[serde(default = "default_root")]
    pub root: PathBuf,

    #[serde(default)]
    pub layout: StoreLayout,

    #[serde(default)]
    pub write_mode: WriteMode,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            layout: StoreLayout::default(),
            write_mode: WriteMode::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Build a filesystem store from this configuration. Does not connect it.
    pub fn build_storage(&self) -> FsRecordStorage {
        FsRecordStorage::new(self.root.clone())
            .with_layout(StoreLayout::new(
                self.layout.vault_dir.clone(),
                self.layout.extension.clone(),
            ))
            .with_write_mode(self.write_mode)
    }
}

/// Loads [`StoreConfig`] from files and environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, optionally reading `path` (format chosen by extension).
    pub fn load(path: Option<&Path>) -> Result<StoreConfig, SetupError> {
        let mut builder = builder_with_defaults()?;
        if let Some(path) = path {
            if !path.exists() {
                return Err(SetupError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let loaded: StoreConfig = config.try_deserialize()?;
        tracing::debug!(root = %loaded.root.display(), "Loaded store configuration");
        Ok(loaded)
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, SetupError> {
    let builder = config::Config::builder()
        .set_default("layout.vault_dir", crate::storage::fs::DEFAULT_VAULT_DIR)?
        .set_default("layout.extension", crate::storage::fs::DEFAULT_EXTENSION)?;
    Ok(builder)
}
