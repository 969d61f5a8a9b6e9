//! End-to-end reconciliation contract.
//!
//! Each test wires a `Reconciler` to a mock IP echo service, a mock GoDaddy
//! API, and a temp-dir state file, then checks three things together: the
//! returned outcome, whether the provider was contacted at all, and what the
//! state file holds afterwards.

use chrono::{Duration, Utc};
use godaddy_ddns::config::{Config, Records, RecordSpec};
use godaddy_ddns::error::DdnsError;
use godaddy_ddns::godaddy::GoDaddyClient;
use godaddy_ddns::reconciler::{Outcome, Reconciler};
use godaddy_ddns::resolver::PublicIpResolver;
use godaddy_ddns::state::LastIpFile;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CURRENT_IP: &str = "203.0.113.5";
const PREVIOUS_IP: &str = "198.51.100.7";

fn test_config(min_update_interval: Option<&str>) -> Config {
    Config {
        domain: "example.com".to_string(),
        api_key: "api-key".to_string(),
        secret: "api-secret".to_string(),
        records: Records::Many(vec![
            RecordSpec::Name("home".to_string()),
            RecordSpec::Name("@".to_string()),
        ]),
        min_update_interval: min_update_interval.map(str::to_string),
        ip_service: None,
        last_ip_file: None,
    }
}

/// Mock echo service that reports `ip` with the trailing newline real
/// services send.
async fn ip_server(ip: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{}\n", ip)))
        .mount(&server)
        .await;
    server
}

fn reconciler(config: Config, state_path: &Path, ip_uri: String, api_uri: String) -> Reconciler {
    let store = LastIpFile::new(state_path);
    let resolver = PublicIpResolver::with_url(ip_uri);
    let client = GoDaddyClient::with_base_url(
        "example.com".to_string(),
        "api-key".to_string(),
        "api-secret".to_string(),
        api_uri,
    );
    Reconciler::with_components(config, store, resolver, client).unwrap()
}

#[tokio::test]
async fn test_first_run_updates_and_persists() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/domains/example.com/records"))
        .and(header("Authorization", "sso-key api-key:api-secret"))
        .and(body_json(serde_json::json!([
            {"name": "home", "type": "A", "data": CURRENT_IP, "ttl": 600},
            {"name": "@", "type": "A", "data": CURRENT_IP, "ttl": 600}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let outcome = reconciler(test_config(None), &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            ip: CURRENT_IP.to_string(),
            records: 2,
        }
    );

    let saved = LastIpFile::new(&state_path).load().unwrap().unwrap();
    assert_eq!(saved.ip, CURRENT_IP);
}

#[tokio::test]
async fn test_unchanged_ip_skips_provider() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    // However stale the entry is, an unchanged IP with no interval
    // configured never reaches the provider.
    let saved_at = Utc::now() - Duration::days(45);
    LastIpFile::new(&state_path)
        .save(CURRENT_IP, saved_at)
        .unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let outcome = reconciler(test_config(None), &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Skipped);

    let saved = LastIpFile::new(&state_path).load().unwrap().unwrap();
    assert_eq!(saved.ip, CURRENT_IP);
    assert_eq!(
        saved.timestamp.timestamp_millis(),
        saved_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_changed_ip_updates_every_record() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    let before = Utc::now() - Duration::minutes(5);
    LastIpFile::new(&state_path)
        .save(PREVIOUS_IP, before)
        .unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    // One record with overrides: type and ttl pass through, data is
    // replaced by the resolved IP regardless of what was configured.
    let config = Config {
        records: Records::Many(vec![
            RecordSpec::Name("home".to_string()),
            RecordSpec::Record {
                name: "vpn".to_string(),
                record_type: None,
                ttl: Some(3600),
                data: Some("10.0.0.1".to_string()),
            },
        ]),
        ..test_config(None)
    };

    Mock::given(method("PATCH"))
        .and(path("/v1/domains/example.com/records"))
        .and(body_json(serde_json::json!([
            {"name": "home", "type": "A", "data": CURRENT_IP, "ttl": 600},
            {"name": "vpn", "type": "A", "data": CURRENT_IP, "ttl": 3600}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let outcome = reconciler(config, &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            ip: CURRENT_IP.to_string(),
            records: 2,
        }
    );

    let saved = LastIpFile::new(&state_path).load().unwrap().unwrap();
    assert_eq!(saved.ip, CURRENT_IP);
    assert!(saved.timestamp > before);
}

#[tokio::test]
async fn test_interval_holds_back_unchanged_ip() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    // 500s into a 10 minute window: still inside, so skip.
    LastIpFile::new(&state_path)
        .save(CURRENT_IP, Utc::now() - Duration::seconds(500))
        .unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let outcome = reconciler(
        test_config(Some("10 MINUTES")),
        &state_path,
        ip.uri(),
        api.uri(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Skipped);
}

#[tokio::test]
async fn test_expired_interval_reapplies_unchanged_ip() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    // 700s into a 10 minute window: expired, so the same IP is pushed
    // again as a keep-alive and the timestamp starts a fresh window.
    let before = Utc::now() - Duration::seconds(700);
    LastIpFile::new(&state_path)
        .save(CURRENT_IP, before)
        .unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/domains/example.com/records"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let outcome = reconciler(
        test_config(Some("10 MINUTES")),
        &state_path,
        ip.uri(),
        api.uri(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            ip: CURRENT_IP.to_string(),
            records: 2,
        }
    );

    let saved = LastIpFile::new(&state_path).load().unwrap().unwrap();
    assert!(saved.timestamp > before);
}

#[tokio::test]
async fn test_provider_rejection_keeps_previous_state() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    let before = Utc::now() - Duration::minutes(5);
    LastIpFile::new(&state_path)
        .save(PREVIOUS_IP, before)
        .unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({"message": "invalid record"})),
        )
        .mount(&api)
        .await;

    let err = reconciler(test_config(None), &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap_err();

    match err {
        DdnsError::Provider { message } => assert_eq!(message, "invalid record"),
        other => panic!("expected provider error, got {:?}", other),
    }

    // The rejected push must not advance the state; the next run retries.
    let saved = LastIpFile::new(&state_path).load().unwrap().unwrap();
    assert_eq!(saved.ip, PREVIOUS_IP);
    assert_eq!(saved.timestamp.timestamp_millis(), before.timestamp_millis());
}

#[tokio::test]
async fn test_state_write_failure_surfaces_after_update() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    // A directory squatting on the store's temp path makes the save fail
    // only after the provider has already accepted the records.
    std::fs::create_dir(dir.path().join("last.tmp")).unwrap();

    let ip = ip_server(CURRENT_IP).await;
    let api = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/domains/example.com/records"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&api)
        .await;

    let err = reconciler(test_config(None), &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap_err();

    // The provider change is applied but unrecorded; the next run simply
    // re-syncs.
    assert!(matches!(err, DdnsError::Io(_)));
    assert!(LastIpFile::new(&state_path).load().unwrap().is_none());
}

#[tokio::test]
async fn test_resolver_failure_aborts_before_provider() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("last.ip");

    let ip = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ip)
        .await;

    let api = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api)
        .await;

    let err = reconciler(test_config(None), &state_path, ip.uri(), api.uri())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, DdnsError::Network(_)));
    assert!(LastIpFile::new(&state_path).load().unwrap().is_none());
}
