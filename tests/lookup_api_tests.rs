//! Lookup API tests
//!
//! Exercise the full actix app (routes + middleware) against an in-memory
//! provider, so no MaxMind database file is needed.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use actix_web::middleware::from_fn;
use async_trait::async_trait;
use serde_json::Value;

use ipgeo::api::middleware::{REQUEST_ID_HEADER, RequestTracing, is_valid_request_id};
use ipgeo::api::services::{AppStartTime, ErrorBody, IpOnlyBody};
use ipgeo::config::StaticConfig;
use ipgeo::errors::{IpGeoError, Result};
use ipgeo::runtime::lifetime::startup::{StartupContext, build_context};
use ipgeo::runtime::modes::{MAX_PAYLOAD_BYTES, configure_app};
use ipgeo::services::{GeoIpLookup, GeoIpProvider, GeoRecord, IpInfo, NameMapping};

// =============================================================================
// Test Setup
// =============================================================================

fn names(pairs: &[(&str, &str)]) -> NameMapping {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// In-memory provider that counts lookups
struct MockProvider {
    records: HashMap<IpAddr, GeoRecord>,
    broken: Vec<IpAddr>,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new() -> Self {
        let mut records = HashMap::new();
        records.insert(
            "8.8.8.8".parse().unwrap(),
            GeoRecord {
                country: Some(names(&[("en", "United States"), ("zh-CN", "美国")])),
                country_iso_code: Some("US".to_string()),
                city: Some(names(&[("en", "Mountain View"), ("zh-CN", "山景城")])),
                subdivisions: vec![names(&[("en", "California"), ("zh-CN", "加利福尼亚州")])],
            },
        );
        records.insert(
            "2001:4860:4860::8888".parse().unwrap(),
            GeoRecord {
                country: Some(names(&[("en", "United States")])),
                country_iso_code: Some("US".to_string()),
                ..Default::default()
            },
        );

        Self {
            records,
            broken: vec!["10.9.9.9".parse().unwrap()],
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoIpLookup for MockProvider {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(&ip) {
            return Err(IpGeoError::lookup("corrupt search tree"));
        }
        self.records
            .get(&ip)
            .cloned()
            .ok_or_else(|| IpGeoError::not_found(format!("No record for {}", ip)))
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

fn context_with(provider: Arc<MockProvider>, config: &StaticConfig) -> StartupContext {
    build_context(GeoIpProvider::from_lookup(provider), config)
}

macro_rules! init_app {
    ($ctx:expr) => {{
        let ctx = $ctx;
        let start = AppStartTime::now();
        test::init_service(
            App::new()
                .wrap(from_fn(RequestTracing::trace))
                .configure(move |cfg| configure_app(cfg, &ctx, &start)),
        )
        .await
    }};
}

fn peer(addr: &str) -> SocketAddr {
    addr.parse().unwrap()
}

// =============================================================================
// Explicit IP
// =============================================================================

#[actix_rt::test]
async fn test_path_ip_default_locale() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    let req = TestRequest::get().uri("/8.8.8.8").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));

    let info: IpInfo = test::read_body_json(resp).await;
    assert_eq!(info.code, 200);
    assert_eq!(info.ip, "8.8.8.8");
    assert_eq!(info.country, "美国");
    assert_eq!(info.region, "加利福尼亚州");
    assert_eq!(info.city, "山景城");
    assert_eq!(provider.calls(), 1);
}

#[actix_rt::test]
async fn test_path_ip_english() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/8.8.8.8")
        .insert_header(("Accept-Language", "en;q=0.9,zh-CN"))
        .to_request();
    let info: IpInfo = test::call_and_read_body_json(&app, req).await;

    assert_eq!(info.country, "United States");
    assert_eq!(info.region, "California");
    assert_eq!(info.city, "Mountain View");
}

#[actix_rt::test]
async fn test_unknown_locale_prefers_default_over_english() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/8.8.8.8")
        .insert_header(("Accept-Language", "fr-FR,en;q=0.8"))
        .to_request();
    let info: IpInfo = test::call_and_read_body_json(&app, req).await;

    assert_eq!(info.country, "美国");
}

#[actix_rt::test]
async fn test_query_ip_on_root() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/?ip=2001:4860:4860::8888")
        .insert_header(("Accept-Language", "en"))
        .to_request();
    let info: IpInfo = test::call_and_read_body_json(&app, req).await;

    assert_eq!(info.ip, "2001:4860:4860::8888");
    assert_eq!(info.country, "United States");
    assert_eq!(info.region, "");
    assert_eq!(info.city, "");
}

#[actix_rt::test]
async fn test_post_form_ip_on_root() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::post()
        .uri("/")
        .insert_header(ContentType::form_url_encoded())
        .insert_header(("Accept-Language", "en"))
        .set_payload("ip=8.8.8.8")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let info: IpInfo = test::read_body_json(resp).await;
    assert_eq!(info.city, "Mountain View");
}

#[actix_rt::test]
async fn test_post_json_ip_on_path() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::post().uri("/8.8.8.8").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Errors
// =============================================================================

#[actix_rt::test]
async fn test_invalid_ip_never_reaches_database() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    for uri in ["/not-an-ip", "/1.2.3", "/?ip=999.1.1.1", "/8.8.8.8:53"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Invalid IP address");
        assert!(body.get("country").is_none());
        assert!(body.get("ip").is_none());
    }

    assert_eq!(provider.calls(), 0);
}

#[actix_rt::test]
async fn test_unknown_address_is_not_found() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get().uri("/192.0.2.1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 404);
    assert_eq!(body.message, "IP address not found");
}

#[actix_rt::test]
async fn test_internal_lookup_error_is_request_failed() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get().uri("/10.9.9.9").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 500);
    assert_eq!(body.message, "Request failed");
}

#[actix_rt::test]
async fn test_malformed_json_body_is_bad_request() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    let req = TestRequest::post()
        .uri("/")
        .insert_header(ContentType::json())
        .set_payload("{\"ip\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.message, "Invalid request parameters");
    assert_eq!(provider.calls(), 0);
}

#[actix_rt::test]
async fn test_whitespace_around_ip_is_rejected() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    for uri in ["/%208.8.8.8", "/?ip=%208.8.8.8", "/?ip=8.8.8.8%20"] {
        let req = TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
    }
    assert_eq!(provider.calls(), 0);
}

#[actix_rt::test]
async fn test_oversized_body_uses_error_envelope() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    let payload = format!("ip={}", "1".repeat(MAX_PAYLOAD_BYTES));
    let req = TestRequest::post()
        .uri("/")
        .insert_header(ContentType::form_url_encoded())
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 413);
    assert_eq!(body.message, "Request body too large");
    assert_eq!(provider.calls(), 0);
}

// =============================================================================
// Client IP inference
// =============================================================================

#[actix_rt::test]
async fn test_root_uses_peer_address() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/")
        .peer_addr(peer("8.8.8.8:41000"))
        .to_request();
    let info: IpInfo = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info.ip, "8.8.8.8");
}

#[actix_rt::test]
async fn test_root_prefers_first_forwarded_for() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/")
        .peer_addr(peer("10.0.0.1:41000"))
        .insert_header(("X-Forwarded-For", "8.8.8.8, 5.6.6.7"))
        .to_request();
    let info: IpInfo = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info.ip, "8.8.8.8");
}

#[actix_rt::test]
async fn test_malformed_forwarded_for_falls_back_to_peer() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/")
        .peer_addr(peer("8.8.8.8:41000"))
        .insert_header(("X-Forwarded-For", "unknown"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let info: IpInfo = test::read_body_json(resp).await;
    assert_eq!(info.ip, "8.8.8.8");

    for header in ["not-an-ip, 5.6.6.7", "<script>"] {
        let req = TestRequest::get()
            .uri("/ip")
            .peer_addr(peer("203.0.113.5:4000"))
            .insert_header(("X-Forwarded-For", header))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "203.0.113.5", "header: {header}");
    }
}

#[actix_rt::test]
async fn test_forwarded_header_ignored_from_untrusted_proxy() {
    let mut config = StaticConfig::default();
    config.network.trusted_proxies = vec!["127.0.0.1".to_string()];
    let app = init_app!(context_with(Arc::new(MockProvider::new()), &config));

    let req = TestRequest::get()
        .uri("/ip")
        .peer_addr(peer("198.51.100.20:5000"))
        .insert_header(("X-Forwarded-For", "1.2.3.4"))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "198.51.100.20");
}

// =============================================================================
// Identity-only endpoint
// =============================================================================

#[actix_rt::test]
async fn test_ip_only_plain_text() {
    let provider = Arc::new(MockProvider::new());
    let app = init_app!(context_with(provider.clone(), &StaticConfig::default()));

    let req = TestRequest::get()
        .uri("/ip")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/plain"))
    );

    let body = test::read_body(resp).await;
    assert_eq!(body, "203.0.113.5");
    assert_eq!(provider.calls(), 0);
}

#[actix_rt::test]
async fn test_ip_only_json_flag() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/ip?json=true")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let body: IpOnlyBody = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, IpOnlyBody::new("203.0.113.5"));

    let req = TestRequest::get()
        .uri("/ip?json=true")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let raw = test::call_and_read_body(&app, req).await;
    assert_eq!(raw, r#"{"code":200,"ip":"203.0.113.5"}"#);
}

#[actix_rt::test]
async fn test_ip_only_json_flag_in_post_body() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::post()
        .uri("/ip")
        .peer_addr(peer("203.0.113.5:4000"))
        .set_json(serde_json::json!({ "json": true }))
        .to_request();
    let body: IpOnlyBody = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.ip, "203.0.113.5");
}

#[actix_rt::test]
async fn test_ip_only_json_false_is_plain_text() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/ip?json=false")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, "203.0.113.5");
}

#[actix_rt::test]
async fn test_ip_only_json_flag_spellings() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/ip?json=1")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let body: IpOnlyBody = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, IpOnlyBody::new("203.0.113.5"));

    let req = TestRequest::get()
        .uri("/ip?json=")
        .peer_addr(peer("203.0.113.5:4000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "203.0.113.5");

    let req = TestRequest::post()
        .uri("/ip")
        .peer_addr(peer("203.0.113.5:4000"))
        .insert_header(ContentType::form_url_encoded())
        .set_payload("json=T")
        .to_request();
    let body: IpOnlyBody = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.ip, "203.0.113.5");
}

// =============================================================================
// Request tracing
// =============================================================================

#[actix_rt::test]
async fn test_incoming_request_id_is_reused() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/ip")
        .peer_addr(peer("203.0.113.5:4000"))
        .insert_header((REQUEST_ID_HEADER, "edge-7f3a.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some("edge-7f3a.1")
    );
}

#[actix_rt::test]
async fn test_malformed_request_id_is_replaced() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get()
        .uri("/ip")
        .peer_addr(peer("203.0.113.5:4000"))
        .insert_header((REQUEST_ID_HEADER, "bad id!"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert_ne!(id, "bad id!");
    assert!(is_valid_request_id(&id));
}

// =============================================================================
// Health
// =============================================================================

#[actix_rt::test]
async fn test_health_check() {
    let app = init_app!(context_with(
        Arc::new(MockProvider::new()),
        &StaticConfig::default()
    ));

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "Mock");
    assert_eq!(body["default_locale"], "zh-CN");
}
