mod common;

use std::sync::Arc;
use std::time::Duration;

use common::init_tracing;
use password_exposed::range::DEFAULT_USER_AGENT;
use password_exposed::{
    CheckerConfig, ExposureChecker, ExposureStatus, MemoryCache, NoCache, StaticTrustBundle,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PASSWORD_RANGE: &str = "1D2DA4053E34E76F6576ED1DA63134B5E2A:2\r\n\
    1E4C9B93F3F0682250B6CF8331B7EE68FD8:10434004\r\n\
    1E4EBD8A2C4F1F7A5CB2A7A7C91E8D8BEA9:1";

// The blocking client owns its own runtime, so it is built, used and dropped
// on a blocking thread rather than on the test's async runtime.
async fn check_blocking(
    build: impl FnOnce() -> ExposureChecker + Send + 'static,
    passwords: &'static [&'static str],
) -> Vec<ExposureStatus> {
    tokio::task::spawn_blocking(move || {
        let checker = build();
        passwords.iter().map(|p| checker.check_password(p)).collect()
    })
    .await
    .unwrap()
}

async fn range_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/5BAA6"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PASSWORD_RANGE))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_range_request_over_http() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/5BAA6"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(PASSWORD_RANGE))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(NoCache))
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Exposed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_user_agent_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/range/5BAA6"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(PASSWORD_RANGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = CheckerConfig {
        endpoint: server.uri(),
        user_agent: "bad\nagent".to_string(),
        ..Default::default()
    };
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .config(config)
                .cache(Arc::new(NoCache))
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Exposed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreadable_trust_bundle_path_keeps_checking() {
    let server = range_server().await;

    let endpoint = server.uri();
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(NoCache))
                .trust_bundle_path("/nonexistent/bundle.pem")
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Exposed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_trust_provider_with_non_pem_bundle_keeps_checking() {
    let server = range_server().await;
    let bundle = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(bundle.path(), "not a certificate").unwrap();

    let endpoint = server.uri();
    let provider = Arc::new(StaticTrustBundle::new(bundle.path()));
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(NoCache))
                .trust_bundle(provider)
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Exposed]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cached_range_makes_one_request() {
    let server = range_server().await;

    let endpoint = server.uri();
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(MemoryCache::new()))
                .build()
        },
        &["password", "password"],
    )
    .await;

    assert_eq!(
        statuses,
        vec![ExposureStatus::Exposed, ExposureStatus::Exposed]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(MemoryCache::new()))
                .build()
        },
        &["password", "password"],
    )
    .await;

    assert_eq!(
        statuses,
        vec![ExposureStatus::Unknown, ExposureStatus::Unknown]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PASSWORD_RANGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let endpoint = server.uri();
    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(NoCache))
                .request_timeout(Duration::from_millis(200))
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Unknown]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_refused_is_unknown() {
    // Nothing listens on the TCP port multiplexer port.
    let endpoint = "http://127.0.0.1:1".to_string();

    let statuses = check_blocking(
        move || {
            ExposureChecker::builder()
                .endpoint(endpoint)
                .cache(Arc::new(NoCache))
                .build()
        },
        &["password"],
    )
    .await;

    assert_eq!(statuses, vec![ExposureStatus::Unknown]);
}
