//! Integration tests for analytics enrichment and service health probes.

use iglb_core::{Environment, FetcherConfig};
use iglb_fetcher::{LeaderboardClient, ServiceState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEAD: &str = "http://127.0.0.1:9";

fn test_config(gateway: &str, logic: &str, analytics: &str) -> FetcherConfig {
    FetcherConfig {
        env: Environment::Test,
        log_level: "info".to_owned(),
        gateway_url: gateway.trim_end_matches('/').to_owned(),
        logic_url: logic.trim_end_matches('/').to_owned(),
        analytics_url: analytics.trim_end_matches('/').to_owned(),
        mirror_urls: vec![],
        cors_proxy_url: String::new(),
        use_cors_proxy: false,
        listing_timeout_secs: 1,
        analytics_timeout_secs: 1,
        user_agent: "iglb-test/0.1".to_owned(),
    }
}

fn client(config: FetcherConfig) -> LeaderboardClient {
    LeaderboardClient::new(config).expect("client construction should not fail")
}

#[tokio::test]
async fn enrichment_collects_all_three_metrics() {
    let analytics = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/growth/acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily_growth": 120,
            "weekly_growth": 800,
            "monthly_growth": 3000,
            "growth_rate": 1.4
        })))
        .mount(&analytics)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/changes/acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "change": 42
        })))
        .mount(&analytics)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/rolling-average/acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rolling_average": 57.5
        })))
        .mount(&analytics)
        .await;

    let enriched = client(test_config(DEAD, DEAD, &analytics.uri()))
        .enrich_profile("acct")
        .await;

    assert_eq!(enriched.username, "acct");
    let growth = enriched.growth.expect("growth should be present");
    assert_eq!(growth.daily_growth, 120);
    assert_eq!(growth.weekly_growth, 800);
    assert_eq!(enriched.changes, Some(42));
    assert_eq!(enriched.rolling_average, Some(57.5));
}

#[tokio::test]
async fn enrichment_degrades_per_metric_not_per_profile() {
    // changes 500s; the other two metrics must still come back.
    let analytics = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/growth/acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily_growth": 10
        })))
        .mount(&analytics)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/changes/acct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&analytics)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/analytics/rolling-average/acct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rolling_average": 12.0
        })))
        .mount(&analytics)
        .await;

    let enriched = client(test_config(DEAD, DEAD, &analytics.uri()))
        .enrich_profile("acct")
        .await;

    assert!(enriched.growth.is_some());
    assert_eq!(enriched.changes, None);
    assert_eq!(enriched.rolling_average, Some(12.0));
}

#[tokio::test]
async fn enrichment_with_analytics_down_yields_empty_metrics() {
    let enriched = client(test_config(DEAD, DEAD, DEAD))
        .enrich_profile("acct")
        .await;

    assert_eq!(enriched.username, "acct");
    assert!(enriched.growth.is_none());
    assert!(enriched.changes.is_none());
    assert!(enriched.rolling_average.is_none());
}

#[tokio::test]
async fn batch_enrichment_preserves_input_order() {
    let analytics = MockServer::start().await;
    for name in ["alpha", "beta", "gamma"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/analytics/growth/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily_growth": 1
            })))
            .mount(&analytics)
            .await;
    }

    let enriched = client(test_config(DEAD, DEAD, &analytics.uri()))
        .enrich_profiles(&["alpha".to_owned(), "beta".to_owned(), "gamma".to_owned()], 2)
        .await;

    let names: Vec<&str> = enriched.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn service_status_distinguishes_error_from_offline() {
    let logic = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&logic)
        .await;

    let report = client(test_config(DEAD, &logic.uri(), DEAD))
        .service_status()
        .await;

    assert_eq!(report.logic.status, ServiceState::Error);
    assert!(report.logic.message.contains("503"));
    assert_eq!(report.analytics.status, ServiceState::Offline);
}

#[tokio::test]
async fn service_status_reports_online_with_upstream_message() {
    let logic = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "scraper ready"
        })))
        .mount(&logic)
        .await;

    let report = client(test_config(DEAD, &logic.uri(), DEAD))
        .service_status()
        .await;

    assert_eq!(report.logic.status, ServiceState::Online);
    assert_eq!(report.logic.message, "scraper ready");
}
