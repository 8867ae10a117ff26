use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use compendium_core::config::CatalogSettings;
use compendium_core::error::Error;
use compendium_fetch::{HttpCatalog, RetryPolicy};

#[derive(Clone, Default)]
struct Hits {
    flaky: Arc<AtomicUsize>,
    limited: Arc<AtomicUsize>,
    always_limited: Arc<AtomicUsize>,
    missing: Arc<AtomicUsize>,
    garbled: Arc<AtomicUsize>,
    broken: Arc<AtomicUsize>,
}

async fn listing() -> Json<Value> {
    Json(json!({"count": 1, "results": [{"index": "fireball", "name": "Fireball", "url": "/api/spells/fireball"}]}))
}

async fn flaky(State(hits): State<Hits>) -> (StatusCode, Json<Value>) {
    if hits.flaky.fetch_add(1, Ordering::SeqCst) == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "down"})))
    } else {
        (StatusCode::OK, Json(json!({"ok": true})))
    }
}

async fn limited(State(hits): State<Hits>) -> (StatusCode, Json<Value>) {
    if hits.limited.fetch_add(1, Ordering::SeqCst) < 2 {
        (StatusCode::TOO_MANY_REQUESTS, Json(json!({})))
    } else {
        (StatusCode::OK, Json(json!({"ok": "eventually"})))
    }
}

async fn always_limited(State(hits): State<Hits>) -> StatusCode {
    hits.always_limited.fetch_add(1, Ordering::SeqCst);
    StatusCode::TOO_MANY_REQUESTS
}

async fn missing(State(hits): State<Hits>) -> StatusCode {
    hits.missing.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

async fn garbled(State(hits): State<Hits>) -> (StatusCode, &'static str) {
    hits.garbled.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, "<html>not json</html>")
}

async fn broken(State(hits): State<Hits>) -> StatusCode {
    hits.broken.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn serve(hits: Hits) -> SocketAddr {
    let app = Router::new()
        .route("/api/spells", get(listing))
        .route("/flaky", get(flaky))
        .route("/limited", get(limited))
        .route("/always-limited", get(always_limited))
        .route("/missing", get(missing))
        .route("/garbled", get(garbled))
        .route("/broken", get(broken))
        .with_state(hits);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> HttpCatalog {
    let settings = CatalogSettings { base_url: format!("http://{}/", addr), timeout_ms: 5_000 };
    let policy = RetryPolicy {
        max_attempts: 3,
        rate_limit_base: Duration::from_millis(2),
        failure_step: Duration::from_millis(2),
    };
    HttpCatalog::new(&settings, policy).expect("client")
}

#[tokio::test]
async fn success_returns_parsed_body_on_first_try() {
    let addr = serve(Hits::default()).await;
    let body = client(addr).fetch_json("/api/spells").await.expect("fetch");
    assert_eq!(body["results"][0]["index"], "fireball");
}

#[tokio::test]
async fn server_error_is_retried() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let body = client(addr).fetch_json("/flaky").await.expect("second attempt succeeds");
    assert_eq!(body["ok"], true);
    assert_eq!(hits.flaky.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rate_limit_waits_then_succeeds_within_budget() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let body = client(addr).fetch_json("/limited").await.expect("third attempt succeeds");
    assert_eq!(body["ok"], "eventually");
    assert_eq!(hits.limited.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn persistent_rate_limit_surfaces_after_three_attempts() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let err = client(addr).fetch_json("/always-limited").await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { attempts: 3, .. }), "got {:?}", err);
    assert_eq!(hits.always_limited.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn not_found_exhausts_attempts_and_is_permanent() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let err = client(addr).fetch_json("/missing").await.unwrap_err();
    assert!(matches!(err, Error::Permanent { status: 404, .. }), "got {:?}", err);
    assert!(!err.is_retryable());
    assert_eq!(hits.missing.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn malformed_body_is_transient() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let err = client(addr).fetch_json("/garbled").await.unwrap_err();
    assert!(matches!(err, Error::Transient { .. }), "got {:?}", err);
    assert_eq!(hits.garbled.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn connection_refused_is_transient() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = client(addr).fetch_json("/api/spells").await.unwrap_err();
    assert!(err.is_retryable(), "got {:?}", err);
}

#[test]
fn urls_join_against_base() {
    let settings = CatalogSettings { base_url: "https://example.test/".into(), timeout_ms: 1_000 };
    let c = HttpCatalog::new(&settings, RetryPolicy::default()).expect("client");
    assert_eq!(c.url_for("/api/spells"), "https://example.test/api/spells");
    assert_eq!(c.url_for("api/spells"), "https://example.test/api/spells");
    assert_eq!(c.url_for("http://other.test/x"), "http://other.test/x");
}

#[tokio::test]
async fn server_error_on_every_attempt_is_permanent() {
    let hits = Hits::default();
    let addr = serve(hits.clone()).await;
    let err = client(addr).fetch_json("/broken").await.expect_err("never recovers");
    assert!(matches!(err, Error::Permanent { status: 500, .. }), "got {:?}", err);
    assert!(!err.is_retryable());
    assert_eq!(hits.broken.load(Ordering::SeqCst), 3);
}
