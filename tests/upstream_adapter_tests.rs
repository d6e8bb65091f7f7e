use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Duration;
use ideaforge::config::{ContentGenResolvedConfig, ImageSearchResolvedConfig};
use ideaforge::keys::{MemoryKeyStore, UsageAccountant};
use ideaforge::providers::content_gen::{GeminiApi, PlanCall, PlanRequest};
use ideaforge::providers::image_search::{CoverImageFinder, ImageSearchCall, UnsplashApi};
use ideaforge::rotation::{AttemptOutcome, CallError, RotatingClient};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

const MODEL: &str = "test-model";

#[derive(Clone, Default)]
struct SeenKeys(Arc<Mutex<Vec<String>>>);

impl SeenKeys {
    fn push(&self, key: &str) {
        self.0.lock().unwrap().push(key.to_string());
    }

    fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}/", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

fn plan_json() -> Value {
    json!({
        "title": "Dog walking marketplace",
        "summary": "Match owners with vetted walkers.",
        "features": [
            {"name": "Booking", "description": "Book a walk", "priority": "must"}
        ],
        "techStack": {
            "frontend": ["SvelteKit"],
            "backend": ["Rust"],
            "database": ["SQLite"],
            "hosting": ["Fly.io"]
        },
        "budget": {"currency": "USD", "min": 8000, "max": 12000},
        "timeline": [
            {"name": "Build", "weeks": 6, "deliverables": ["MVP"]}
        ]
    })
}

fn gemini_error(code: u16, status: &str, message: &str) -> Response {
    (
        StatusCode::from_u16(code).unwrap(),
        Json(json!({"error": {"code": code, "message": message, "status": status}})),
    )
        .into_response()
}

async fn gemini_handler(State(seen): State<SeenKeys>, headers: HeaderMap) -> Response {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.push(&key);

    match key.as_str() {
        "exhausted" => gemini_error(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted"),
        "overloaded" => gemini_error(503, "UNAVAILABLE", "The model is overloaded"),
        "invalid" => gemini_error(400, "INVALID_ARGUMENT", "API key not valid"),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "chatty" => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Sure! Here is a plan."}]},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        _ => {
            let text = format!("```json\n{}\n```", plan_json());
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }]
            }))
            .into_response()
        }
    }
}

async fn gemini_planner(
    store: &Arc<MemoryKeyStore>,
) -> (RotatingClient<PlanCall>, SeenKeys) {
    let seen = SeenKeys::default();
    let app = Router::new()
        .route(
            &format!("/v1beta/models/{MODEL}:generateContent"),
            post(gemini_handler),
        )
        .with_state(seen.clone());
    let base = spawn_test_server(app).await;

    let cfg = ContentGenResolvedConfig {
        api_url: base.join("v1beta").unwrap(),
        model: MODEL.to_string(),
        secrets: Vec::new(),
        default_secret: None,
        proxy: None,
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
        network_retry_times: 0,
    };
    let api = GeminiApi::new(reqwest::Client::new(), &cfg).expect("valid endpoint");
    let accountant = UsageAccountant::new(store.clone(), 50, Duration::hours(24));
    (RotatingClient::new(PlanCall::new(api), accountant, 1), seen)
}

#[tokio::test]
async fn gemini_quota_rotates_to_working_key() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("content-gen", "exhausted", 0, true);
    let good = store.insert("content-gen", "good", 3, true);
    let (planner, seen) = gemini_planner(&store).await;

    let inv = planner
        .invoke(&PlanRequest::new("Uber for dog walking"))
        .await
        .expect("plan served");

    assert!(!inv.degraded);
    assert_eq!(inv.key_id, Some(good.id));
    assert_eq!(inv.output.title, "Dog walking marketplace");
    assert_eq!(inv.output.budget.max, 12000);
    assert_eq!(seen.all(), vec!["exhausted".to_string(), "good".to_string()]);
}

#[tokio::test]
async fn gemini_overload_on_both_keys_serves_offline_plan() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("content-gen", "overloaded", 0, true);
    store.insert("content-gen", "exhausted", 0, true);
    let (planner, seen) = gemini_planner(&store).await;

    let inv = planner
        .invoke(&PlanRequest::new("Uber for dog walking"))
        .await
        .expect("fallback served");

    assert!(inv.degraded);
    assert_eq!(seen.all().len(), 2);
    assert!(inv.output.summary.contains("Uber for dog walking"));
    assert!(inv.output.is_complete());
    assert!(
        inv.attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::QuotaExceeded)
    );
}

#[tokio::test]
async fn gemini_bad_request_is_validation_error() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("content-gen", "invalid", 0, true);
    store.insert("content-gen", "good", 0, true);
    let (planner, seen) = gemini_planner(&store).await;

    let err = planner
        .invoke(&PlanRequest::new("idea"))
        .await
        .expect_err("400 must propagate");

    assert!(matches!(
        err,
        CallError::Validation {
            status: Some(400),
            ..
        }
    ));
    assert_eq!(seen.all(), vec!["invalid".to_string()]);
}

#[tokio::test]
async fn gemini_server_error_is_transient() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("content-gen", "broken", 0, true);
    let (planner, _seen) = gemini_planner(&store).await;

    let err = planner
        .invoke(&PlanRequest::new("idea"))
        .await
        .expect_err("500 must propagate");
    assert!(matches!(err, CallError::Transient(_)));
}

#[tokio::test]
async fn gemini_prose_instead_of_json_is_validation_error() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("content-gen", "chatty", 0, true);
    let (planner, _seen) = gemini_planner(&store).await;

    let err = planner
        .invoke(&PlanRequest::new("idea"))
        .await
        .expect_err("prose is not a plan");
    assert!(matches!(err, CallError::Validation { .. }));
}

async fn unsplash_handler(State(seen): State<SeenKeys>, headers: HeaderMap) -> Response {
    let key = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Client-ID "))
        .unwrap_or_default()
        .to_string();
    seen.push(&key);

    match key.as_str() {
        "limited" => (
            StatusCode::FORBIDDEN,
            Json(json!({"errors": ["Rate Limit Exceeded"]})),
        )
            .into_response(),
        "empty" => Json(json!({"total": 0, "results": []})).into_response(),
        _ => Json(json!({
            "total": 1,
            "results": [{
                "id": "abc",
                "alt_description": "laptop on a desk",
                "urls": {"regular": "https://images.test/abc.jpg"},
                "user": {"name": "Jane Doe"},
                "links": {"html": "https://unsplash.test/photos/abc"}
            }]
        }))
        .into_response(),
    }
}

async fn cover_finder(store: &Arc<MemoryKeyStore>) -> (CoverImageFinder, SeenKeys) {
    let seen = SeenKeys::default();
    let app = Router::new()
        .route("/search/photos", get(unsplash_handler))
        .with_state(seen.clone());
    let base = spawn_test_server(app).await;

    let cfg = ImageSearchResolvedConfig {
        api_url: base,
        secrets: Vec::new(),
        default_secret: None,
        cache_ttl_secs: 60,
        proxy: None,
        request_timeout_secs: 5,
        connect_timeout_secs: 5,
        network_retry_times: 0,
    };
    let api = UnsplashApi::new(reqwest::Client::new(), &cfg).expect("valid endpoint");
    let accountant = UsageAccountant::new(store.clone(), 50, Duration::hours(24));
    let client = RotatingClient::new(ImageSearchCall::new(api), accountant, 1);
    (
        CoverImageFinder::new(client, std::time::Duration::from_secs(60)),
        seen,
    )
}

#[tokio::test]
async fn unsplash_rate_limit_rotates_and_hits_are_cached() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("image-search", "limited", 0, true);
    store.insert("image-search", "good", 0, true);
    let (finder, seen) = cover_finder(&store).await;

    let first = finder.find("Remote work").await.expect("image");
    assert!(!first.degraded);
    assert_eq!(first.output.url, "https://images.test/abc.jpg");
    assert_eq!(first.output.credit, "Jane Doe on Unsplash");
    assert_eq!(seen.all(), vec!["limited".to_string(), "good".to_string()]);

    // Same query, different case: served from cache without another upstream call.
    let second = finder.find("remote work").await.expect("image");
    assert_eq!(second.output, first.output);
    assert!(second.attempts.is_empty());
    assert_eq!(seen.all().len(), 2);
}

#[tokio::test]
async fn unsplash_no_results_yields_degraded_placeholder() {
    let store = Arc::new(MemoryKeyStore::new());
    store.insert("image-search", "empty", 0, true);
    let (finder, seen) = cover_finder(&store).await;

    let inv = finder.find("nothing matches").await.expect("image");
    assert!(inv.degraded);
    assert_eq!(inv.output.credit, ideaforge::providers::image_search::fallback::PLACEHOLDER_CREDIT);

    // Placeholders are not cached.
    let _ = finder.find("nothing matches").await.expect("image");
    assert_eq!(seen.all().len(), 2);
}
