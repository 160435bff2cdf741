//! File-backed repository implementation.
//!
//! Each entry is stored as one JSON document at `<root>/<domain>/<key>.json`.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never observes a half-written payload and a crash mid-write leaves
//! the previous payload intact.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

use crate::db::repository::*;

const ENTRY_EXTENSION: &str = "json";

/// Durable repository storing one file per cache key.
#[derive(Debug)]
pub struct FileRepository {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileRepository {
    /// Open (and create if needed) a repository rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let root = root.into();
        for domain in CacheDomain::all() {
            let dir = root.join(domain.as_str());
            fs::create_dir_all(&dir).await.map_err(|e| {
                RepositoryError::configuration_with_context(
                    format!("Failed to create cache directory: {}", e),
                    ErrorContext::new("open").with_details(dir.display().to_string()),
                )
            })?;
        }
        log::debug!("File repository opened at {}", root.display());
        Ok(Self {
            root,
            tmp_counter: AtomicU64::new(0),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn domain_dir(&self, domain: CacheDomain) -> PathBuf {
        self.root.join(domain.as_str())
    }

    fn entry_path(&self, domain: CacheDomain, key: &str) -> RepositoryResult<PathBuf> {
        validate_key(domain, key)?;
        Ok(self
            .domain_dir(domain)
            .join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }
}

/// Keys become file names, so anything that could escape the domain
/// directory is rejected.
fn validate_key(domain: CacheDomain, key: &str) -> RepositoryResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::validation_with_context(
            "Invalid cache key",
            ErrorContext::new("validate_key")
                .with_domain(domain.as_str())
                .with_key(key),
        ))
    }
}

#[async_trait]
impl CacheRepository for FileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        match fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(_) => Ok(false),
        }
    }

    async fn get(&self, domain: CacheDomain, key: &str) -> RepositoryResult<Option<String>> {
        let path = self.entry_path(domain, key)?;
        match fs::read_to_string(&path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::from(e).with_operation("get")),
        }
    }

    async fn put(&self, domain: CacheDomain, key: &str, payload: &str) -> RepositoryResult<()> {
        let path = self.entry_path(domain, key)?;
        let seq = self.tmp_counter.fetch_add(1, Ordering::SeqCst);
        let tmp = self
            .domain_dir(domain)
            .join(format!(".{}.{}.tmp", key, seq));

        fs::write(&tmp, payload.as_bytes()).await.map_err(|e| {
            RepositoryError::storage_with_context(
                e.to_string(),
                ErrorContext::new("put")
                    .with_domain(domain.as_str())
                    .with_key(key)
                    .with_details("write temp file"),
            )
        })?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(RepositoryError::storage_with_context(
                e.to_string(),
                ErrorContext::new("put")
                    .with_domain(domain.as_str())
                    .with_key(key)
                    .with_details("rename into place"),
            ));
        }
        Ok(())
    }

    async fn list_keys(&self, domain: CacheDomain) -> RepositoryResult<Vec<String>> {
        let dir = self.domain_dir(domain);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepositoryError::from(e).with_operation("list_keys")),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("list_keys"))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn delete_where(
        &self,
        domain: CacheDomain,
        predicate: KeyPredicate<'_>,
    ) -> RepositoryResult<usize> {
        let mut removed = 0;
        for key in self.list_keys(domain).await? {
            if !predicate(&key) {
                continue;
            }
            let path = self.entry_path(domain, &key)?;
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                // Already gone: another cleanup won the race
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(RepositoryError::from(e).with_operation("delete_where")),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_and_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path()).await.unwrap();

        repo.put(CacheDomain::DailyVisibility, "2026-02-24", "{\"a\":1}")
            .await
            .unwrap();
        repo.put(CacheDomain::DailyVisibility, "2026-02-24", "{\"a\":2}")
            .await
            .unwrap();

        assert_eq!(
            repo.get(CacheDomain::DailyVisibility, "2026-02-24")
                .await
                .unwrap()
                .as_deref(),
            Some("{\"a\":2}")
        );
        assert_eq!(
            repo.list_keys(CacheDomain::DailyVisibility).await.unwrap(),
            vec!["2026-02-24".to_string()]
        );
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = FileRepository::open(dir.path()).await.unwrap();
            repo.put(CacheDomain::YearlyEvents, "2027", "[]").await.unwrap();
        }
        let reopened = FileRepository::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get(CacheDomain::YearlyEvents, "2027").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path()).await.unwrap();
        assert!(repo
            .get(CacheDomain::YearlyEvents, "1999")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path()).await.unwrap();
        let err = repo
            .put(CacheDomain::YearlyEvents, "../escape", "[]")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_delete_where() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path()).await.unwrap();
        for key in ["2026-01-01", "2026-06-01"] {
            repo.put(CacheDomain::DailyVisibility, key, "{}").await.unwrap();
        }
        let removed = repo
            .delete_where(CacheDomain::DailyVisibility, &|k: &str| k < "2026-03-01")
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(repo.health_check().await.unwrap());
    }
}
