//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ledgersync_core::{MockClock, RecordReconciler, ReportAggregator};
use ledgersync_domain::UpstreamConfig;
use ledgersync_infra::api::{ApiClient, ApiClientConfig, TokenCache};
use ledgersync_infra::database::{DbManager, SqliteRecordRepository};
use ledgersync_infra::http::HttpClient;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/sessions";
pub const DATA_PATH: &str = "/layouts/ledger/records";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("ledger.db");

        let manager = DbManager::new(&db_path, 2).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Upstream settings pointing at a mock server.
pub fn upstream_config(server: &MockServer) -> UpstreamConfig {
    UpstreamConfig {
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
        data_url: format!("{}{DATA_PATH}", server.uri()),
        username: "user".into(),
        password: "pass".into(),
        script: "getData".into(),
        accept_invalid_certs: false,
        ca_cert_path: None,
        timeout_seconds: 5,
        token_ttl_seconds: 600,
    }
}

/// The whole pipeline wired against a mock upstream and a temp database.
pub struct Pipeline {
    pub db: TestDatabase,
    pub repository: Arc<SqliteRecordRepository>,
    pub reconciler: RecordReconciler,
    pub aggregator: ReportAggregator,
    pub clock: MockClock,
}

impl Pipeline {
    pub fn new(server: &MockServer) -> Self {
        let upstream = upstream_config(server);
        let http = HttpClient::builder()
            .max_attempts(1)
            .base_backoff(Duration::from_millis(1))
            .build()
            .expect("http client should build");

        let clock = MockClock::new();
        let tokens = Arc::new(
            TokenCache::from_config(http.clone(), &upstream).with_clock(Arc::new(clock.clone())),
        );
        let source =
            Arc::new(ApiClient::new(ApiClientConfig::from_upstream(&upstream), http, tokens));

        let db = TestDatabase::new();
        let repository = Arc::new(
            SqliteRecordRepository::new(db.manager.clone()).with_clock(Arc::new(clock.clone())),
        );

        Self {
            reconciler: RecordReconciler::new(source, repository.clone()),
            aggregator: ReportAggregator::new(repository.clone()),
            repository,
            clock,
            db,
        }
    }
}

/// Reply body of the data endpoint carrying `items` as an encoded script result.
pub fn script_reply(items: &Value) -> Value {
    json!({
        "response": {"scriptResult": items.to_string(), "scriptError": "0"},
        "messages": [{"code": "0", "message": "OK"}]
    })
}

/// Token endpoint that always issues `token`.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": {"token": token}})),
        )
        .mount(server)
        .await;
}

/// Data endpoint answering exactly one call with `body`.
pub async fn mount_data_once(server: &MockServer, body: Value) {
    Mock::given(method("PATCH"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}
