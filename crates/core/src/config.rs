use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names a JSON file holding a [`ToolConfig`].
pub const CONFIG_ENV: &str = "LIB_BLOAT_CONFIG";
/// Directory containing `llvm-nm`.
pub const LLVM_DIR_ENV: &str = "LLVM_DIR";
/// Directory containing `bloaty`.
pub const BLOATY_DIR_ENV: &str = "BLOATY_DIR";
/// Exact path of the symbol-dump tool.
pub const NM_ENV: &str = "LIB_BLOAT_NM";
/// Exact path of the size-report tool.
pub const BLOATY_ENV: &str = "LIB_BLOAT_BLOATY";
/// Path of the persistent tool-output cache database.
pub const CACHE_DB_ENV: &str = "LIB_BLOAT_CACHE_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read tool config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse tool config JSON at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Locations of the external tools and the optional persistent cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Symbol-dump tool, `llvm-nm` by default (resolved via `PATH`).
    pub nm: PathBuf,
    /// Size-report tool, `bloaty` by default (resolved via `PATH`).
    pub bloaty: PathBuf,
    /// SQLite database for persisting tool output across runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_db: Option<PathBuf>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self { nm: PathBuf::from("llvm-nm"), bloaty: PathBuf::from("bloaty"), cache_db: None }
    }
}

impl ToolConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    ///
    /// Later sources override earlier ones: defaults, the JSON file named by
    /// `LIB_BLOAT_CONFIG`, the `LLVM_DIR`/`BLOATY_DIR` directories, then the
    /// exact-path variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mut config = match var(CONFIG_ENV) {
            Some(path) => load_config(Path::new(&path))?,
            None => ToolConfig::default(),
        };
        if let Some(dir) = var(LLVM_DIR_ENV) {
            config.nm = PathBuf::from(dir).join("llvm-nm");
        }
        if let Some(dir) = var(BLOATY_DIR_ENV) {
            config.bloaty = PathBuf::from(dir).join("bloaty");
        }
        if let Some(nm) = var(NM_ENV) {
            config.nm = PathBuf::from(nm);
        }
        if let Some(bloaty) = var(BLOATY_ENV) {
            config.bloaty = PathBuf::from(bloaty);
        }
        if let Some(cache_db) = var(CACHE_DB_ENV) {
            config.cache_db = Some(PathBuf::from(cache_db));
        }
        Ok(config)
    }
}

/// Load a tool config JSON file; missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let body = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&body)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
