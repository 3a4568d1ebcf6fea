//! Layered configuration for tapp.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults ([`Config::default`]);
//! 2. a TOML file: `--config <file>` if given, otherwise `config.toml` in the
//!    platform config directory (ignored when missing);
//! 3. `TAPP_*` environment variables, e.g. `TAPP_CACHE_ROOT`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_PREFIX: &str = "TAPP_";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where extracted packages live. Must be absolute.
    pub cache_root: PathBuf,
    /// Default log filter when `RUST_LOG` isn't set.
    pub log_level: String,
    /// Host name packages are served under.
    pub virtual_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_root: std::env::temp_dir().join("tapp-cache"),
            log_level: "warn".to_string(),
            virtual_host: "appassets".to_string(),
        }
    }
}

impl Config {
    /// `config.toml` in the platform config directory, if there is one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "tapp").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// The merged sources, before extraction. An explicit `file` must exist.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let file = match file {
            Some(file) if !file.is_file() => exn::bail!(ErrorKind::NotFound(file.to_path_buf())),
            Some(file) => Some(file.to_path_buf()),
            None => Self::default_path(),
        };
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            debug!(file = %file.display(), "Reading config file");
            figment = figment.merge(Toml::file(file));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load and validate the configuration.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(file)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()
    }

    fn validate(self) -> Result<Self> {
        if !self.cache_root.is_absolute() {
            exn::bail!(ErrorKind::InvalidValue("cache_root"));
        }
        if self.virtual_host.is_empty() || self.virtual_host.contains(['/', ':', ' ']) {
            exn::bail!(ErrorKind::InvalidValue("virtual_host"));
        }
        Ok(self)
    }
}
