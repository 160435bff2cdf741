//! `repository.toml` support.
//!
//! ```toml
//! [repository]
//! type = "file"
//!
//! [file]
//! root = "cache"   # relative roots resolve against the file's directory
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{RepositoryError, RepositoryResult};

/// Environment variable naming an explicit `repository.toml`.
pub const REPOSITORY_CONFIG_ENV: &str = "REPOSITORY_CONFIG";

const CANDIDATE_PATHS: [&str; 3] = [
    "repository.toml",
    "backend/repository.toml",
    "../repository.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub file: FileSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Where the file store keeps its domain directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default = "default_cache_root")]
    pub root: PathBuf,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            root: default_cache_root(),
        }
    }
}

pub(crate) fn default_cache_root() -> PathBuf {
    PathBuf::from("cache")
}

impl RepositoryConfig {
    /// Parse `path`; a relative `file.root` is anchored at the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to parse {}: {}",
                path.display(),
                e
            ))
        })?;

        if config.file.root.is_relative() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                config.file.root = dir.join(&config.file.root);
            }
        }
        Ok(config)
    }

    /// `$REPOSITORY_CONFIG` when set, else the first `repository.toml`
    /// found in the working directory, `backend/` or the parent directory.
    pub fn from_default_location() -> RepositoryResult<Self> {
        if let Ok(explicit) = std::env::var(REPOSITORY_CONFIG_ENV) {
            return Self::from_file(explicit);
        }

        CANDIDATE_PATHS
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Self::from_file)
            .unwrap_or_else(|| {
                Err(RepositoryError::configuration(
                    "No repository.toml found in standard locations",
                ))
            })
    }

    pub fn repository_type(&self) -> RepositoryResult<RepositoryType> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })
    }
}
