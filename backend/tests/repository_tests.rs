//! Persistent-store selection and the on-disk store behind the cache.

mod support;

use std::path::PathBuf;
use std::sync::Arc;

use lunar_observatory::config::ObservatoryConfig;
use lunar_observatory::db::factory::cache_dir_from_env;
use lunar_observatory::db::{
    CacheDomain, CacheRepository, FileRepository, RepositoryFactory, RepositoryType,
};
use lunar_observatory::services::Observatory;
use support::{date, utc_config, with_scoped_env, MockOracle};

#[test]
fn test_repository_type_from_env() {
    with_scoped_env(
        &[("REPOSITORY_TYPE", Some("file")), ("CACHE_DIR", None)],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::File),
    );
    with_scoped_env(
        &[("REPOSITORY_TYPE", None), ("CACHE_DIR", Some("/tmp/observatory"))],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::File);
            assert_eq!(cache_dir_from_env(), PathBuf::from("/tmp/observatory"));
        },
    );
    with_scoped_env(&[("REPOSITORY_TYPE", None), ("CACHE_DIR", None)], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        assert_eq!(cache_dir_from_env(), PathBuf::from("cache"));
    });
    with_scoped_env(&[("REPOSITORY_TYPE", Some("bogus"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_factory_requires_root_for_file_store() {
    assert!(RepositoryFactory::create(RepositoryType::File, None)
        .await
        .is_err());

    let dir = tempfile::tempdir().unwrap();
    let repo = RepositoryFactory::create(RepositoryType::File, Some(dir.path()))
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_file_store_serves_cache_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first_oracle = Arc::new(MockOracle::new());
    let repo = Arc::new(FileRepository::open(dir.path()).await.unwrap());
    let observatory = Observatory::new(first_oracle.clone(), repo, utc_config()).unwrap();
    let computed = observatory.visibility(date(2026, 2, 24)).await.unwrap();
    assert!(first_oracle.alt_az_calls() > 0);

    let second_oracle = Arc::new(MockOracle::new());
    let reopened = Arc::new(FileRepository::open(dir.path()).await.unwrap());
    assert_eq!(
        reopened.list_keys(CacheDomain::DailyVisibility).await.unwrap(),
        vec!["2026-02-24".to_string()]
    );
    let observatory = Observatory::new(second_oracle.clone(), reopened, utc_config()).unwrap();
    let reloaded = observatory.visibility(date(2026, 2, 24)).await.unwrap();

    assert_eq!(computed, reloaded);
    assert_eq!(second_oracle.total_calls(), 0);
}

#[tokio::test]
async fn test_unreadable_payload_is_recomputed() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(FileRepository::open(dir.path()).await.unwrap());
    repo.put(CacheDomain::DailyVisibility, "2026-02-24", "not json")
        .await
        .unwrap();

    let oracle = Arc::new(MockOracle::new());
    let observatory = Observatory::new(oracle.clone(), repo.clone(), utc_config()).unwrap();
    let visibility = observatory.visibility(date(2026, 2, 24)).await.unwrap();

    assert_eq!(visibility.len(), 5);
    assert!(oracle.alt_az_calls() > 0);
    let stored = repo
        .get(CacheDomain::DailyVisibility, "2026-02-24")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.starts_with('{'));
}

#[tokio::test]
async fn test_factory_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("store");
    let config_path = dir.path().join("repository.toml");
    std::fs::write(
        &config_path,
        format!(
            "[repository]\ntype = \"file\"\n\n[file]\nroot = \"{}\"\n",
            root.display()
        ),
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path)
        .await
        .unwrap();
    repo.put(CacheDomain::YearlyEvents, "2026", "[]").await.unwrap();
    assert!(root.exists());
}

#[test]
fn test_observatory_config_env_overrides() {
    with_scoped_env(
        &[
            ("PORT", Some("9090")),
            ("OBSERVER_LAT", Some("51.5")),
            ("OBSERVER_LON", Some("-0.12")),
            ("HOST", None),
        ],
        || {
            let mut config = ObservatoryConfig::default();
            config.apply_env_overrides().unwrap();
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.observer.latitude, 51.5);
            assert_eq!(config.observer.longitude, -0.12);
            assert!(config.validate().is_ok());
        },
    );

    with_scoped_env(&[("PORT", Some("not-a-port"))], || {
        let mut config = ObservatoryConfig::default();
        assert!(config.apply_env_overrides().is_err());
    });

    with_scoped_env(&[("OBSERVER_LAT", Some("95"))], || {
        let mut config = ObservatoryConfig::default();
        config.apply_env_overrides().unwrap();
        assert!(config.validate().is_err());
    });
}

#[test]
fn test_observatory_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("observatory.toml");
    std::fs::write(
        &path,
        "[observer]\nlatitude = 40.7\nlongitude = -74.0\nutc_offset_hours = -5.0\n\n[workers]\nmax_concurrent = 8\n",
    )
    .unwrap();

    let config = ObservatoryConfig::from_file(&path).unwrap();
    assert_eq!(config.observer.utc_offset_hours, -5.0);
    assert_eq!(config.workers.max_concurrent, 8);
    assert_eq!(config.cache.visibility_retention_days, 30);
    assert_eq!(config.eclipse.regions.len(), 4);

    std::fs::write(&path, "[workers]\nmax_concurrent = 0\n").unwrap();
    assert!(ObservatoryConfig::from_file(&path).is_err());
}
