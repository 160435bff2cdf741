//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::{default_cache_root, RepositoryConfig};
use super::repositories::{FileRepository, LocalRepository};
use super::repository::{CacheRepository, RepositoryError, RepositoryResult};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// One JSON file per key on disk
    File,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("file", "fs", "local")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "fs" => Ok(Self::File),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to File if `CACHE_DIR` is set,
    /// otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("CACHE_DIR").is_ok() {
            Self::File
        } else {
            Self::Local
        }
    }
}

/// Cache directory from `CACHE_DIR`, or `./cache`.
pub fn cache_dir_from_env() -> PathBuf {
    std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_cache_root())
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use lunar_observatory::db::{RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let on_disk = RepositoryFactory::create(RepositoryType::File, Some("cache".as_ref())).await?;
///     let in_memory = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `root` - Cache directory (required for File)
    pub async fn create(
        repo_type: RepositoryType,
        root: Option<&Path>,
    ) -> RepositoryResult<Arc<dyn CacheRepository>> {
        match repo_type {
            RepositoryType::File => {
                let root = root.ok_or_else(|| {
                    RepositoryError::configuration("File repository requires a cache directory")
                })?;
                let repo = Self::create_file(root).await?;
                Ok(repo as Arc<dyn CacheRepository>)
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a file repository rooted at `root`.
    pub async fn create_file(root: &Path) -> RepositoryResult<Arc<FileRepository>> {
        let repo = FileRepository::open(root).await?;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn CacheRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` and `CACHE_DIR`.
    pub async fn from_env() -> RepositoryResult<Arc<dyn CacheRepository>> {
        let repo_type = RepositoryType::from_env();
        let root = cache_dir_from_env();
        Self::create(repo_type, Some(&root)).await
    }

    /// Create repository from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn CacheRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Create repository from the default configuration file location.
    ///
    /// Searches for `repository.toml` in standard locations.
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn CacheRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config).await
    }

    async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn CacheRepository>> {
        Self::create(config.repository_type()?, Some(&config.file.root)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_parsing() {
        assert_eq!("file".parse::<RepositoryType>().unwrap(), RepositoryType::File);
        assert_eq!("FS".parse::<RepositoryType>().unwrap(), RepositoryType::File);
        assert_eq!("local".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert!("postgres".parse::<RepositoryType>().is_err());
    }

    #[tokio::test]
    async fn test_file_requires_root() {
        let result = RepositoryFactory::create(RepositoryType::File, None).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_local_is_healthy() {
        let repo = RepositoryFactory::create(RepositoryType::Local, None)
            .await
            .unwrap();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache_root = dir.path().join("store");
        let config_path = dir.path().join("repository.toml");
        std::fs::write(
            &config_path,
            format!(
                "[repository]\ntype = \"file\"\n\n[file]\nroot = {:?}\n",
                cache_root.display().to_string()
            ),
        )
        .unwrap();

        let repo = RepositoryFactory::from_config_file(&config_path)
            .await
            .unwrap();
        assert!(repo.health_check().await.unwrap());
        assert!(cache_root.join("yearly-events").is_dir());
    }
}
