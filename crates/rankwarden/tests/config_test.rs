//! Layered configuration loading.

use rankwarden::{RankwardenConfig, RankwardenErrorKind};
use std::path::PathBuf;

fn environment(vars: &[(&str, &str)]) -> config::Environment {
    let map: config::Map<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    RankwardenConfig::environment().source(Some(map))
}

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rankwarden-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn test_missing_user_files_fall_back_to_defaults() {
    let missing = std::env::temp_dir().join("rankwarden-does-not-exist.toml");
    let config = RankwardenConfig::load_layered(&[missing], environment(&[])).unwrap();

    let store = config.store_config().unwrap();
    assert_eq!(store.database_url(), "postgres://rankwarden:@localhost:5432/rankwarden");
    assert_eq!(*store.max_pool_size(), 10);
    assert_eq!(*store.connection_timeout_millis(), 30_000);
    assert_eq!(*store.worker_threads(), 4);
}

#[test]
fn test_later_file_overrides_earlier() {
    let home = write_temp("home", "[database]\nhost = \"home-db\"\n\n[pool]\nmax_size = 3\n");
    let local = write_temp("local", "[database]\nhost = \"local-db\"\n");

    let config =
        RankwardenConfig::load_layered(&[home.clone(), local.clone()], environment(&[])).unwrap();

    assert_eq!(config.database().host(), "local-db");
    assert_eq!(*config.pool().max_size(), 3);
    assert_eq!(*config.pool().connection_timeout_millis(), 30_000);

    std::fs::remove_file(home).ok();
    std::fs::remove_file(local).ok();
}

#[test]
fn test_environment_overrides_files() {
    let local = write_temp("env", "[workers]\nthreads = 2\n");

    let config = RankwardenConfig::load_layered(
        &[local.clone()],
        environment(&[
            ("RANKWARDEN__WORKERS__THREADS", "8"),
            ("RANKWARDEN__DATABASE__HOST", "env-db"),
        ]),
    )
    .unwrap();

    assert_eq!(*config.workers().threads(), 8);
    assert_eq!(config.database().host(), "env-db");

    std::fs::remove_file(local).ok();
}

#[test]
fn test_from_file_requires_the_file() {
    let err = RankwardenConfig::from_file("/nonexistent/rankwarden.toml").unwrap_err();
    assert!(matches!(err.kind(), RankwardenErrorKind::Config(_)));
}

#[test]
fn test_database_url_override() {
    let config = RankwardenConfig::load_layered(&[], environment(&[]))
        .unwrap()
        .with_database_url("postgres://override/ranks");
    assert_eq!(
        config.store_config().unwrap().database_url(),
        "postgres://override/ranks"
    );
}

#[test]
fn test_zero_workers_rejected() {
    let config = RankwardenConfig::load_layered(
        &[],
        environment(&[("RANKWARDEN__WORKERS__THREADS", "0")]),
    )
    .unwrap();
    let err = config.store_config().unwrap_err();
    assert!(matches!(err.kind(), RankwardenErrorKind::Config(_)));
}
