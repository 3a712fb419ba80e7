//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use pageguard_server::{create_app, AppState, Config, Database};
use std::path::Path;
use tempfile::TempDir;

pub(crate) const ALLOWED_HOST: &str = "app.example.com";
pub(crate) const EDITOR_REFERER: &str = "https://app.example.com/editor/page/7";

pub(crate) fn test_config_for_db_path(db_path: &Path) -> Config {
    Config {
        port: 0,
        db_path: db_path.to_str().expect("db path").to_string(),
        lock_ttl_secs: 300,
        allowed_hosts: vec![ALLOWED_HOST.to_string()],
        bypass_patterns: None,
        referer_patterns: None,
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let db = Database::with_lock_ttl(config.db_path.as_str(), config.lock_ttl()).expect("open db");
    let state = AppState::new(config, db);
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_server_with(configure: impl FnOnce(&mut Config)) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let mut config = test_config_for_db_path(&db_path);
    configure(&mut config);
    (test_server_for_config(config), temp_dir)
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    setup_server_with(|_| {})
}

