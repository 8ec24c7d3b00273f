use aeo_analyzer::api::{build_router, AppState};
use aeo_analyzer::error::ScoringError;
use aeo_analyzer::services::{ScoreRequest, ScoreResponse, ScoringBackend, StubScoringBackend};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // oneshot

struct DownBackend;

#[async_trait]
impl ScoringBackend for DownBackend {
    async fn score(&self, _request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        Err(ScoringError::EmptyLlmResponse {
            model: "gpt-4o-mini".to_string(),
        })
    }

    fn name(&self) -> &str {
        "down"
    }
}

fn stub_router() -> axum::Router {
    let backend = StubScoringBackend::with_seed(70, 90, 42).unwrap();
    build_router(AppState::new(Arc::new(backend)))
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = stub_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "stub");
}

#[tokio::test]
async fn test_analyze_returns_wire_response() {
    let response = stub_router()
        .oneshot(post_json(json!({
            "content": "What is answer engine optimization?",
            "contentType": "faq"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    for field in [
        "keywordRelevance",
        "readability",
        "snippetOptimization",
        "structuredData",
    ] {
        let value = body["scores"][field].as_u64().unwrap();
        assert!((70..=90).contains(&value), "{field} = {value}");
    }
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
    assert!(body.get("finalScore").is_none());
}

#[tokio::test]
async fn test_empty_content_is_bad_request() {
    let response = stub_router()
        .oneshot(post_json(json!({ "content": "   ", "contentType": "blog" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{\"content\": "))
        .unwrap();
    let response = stub_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(extract_json(response.into_body()).await["error"].is_string());
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway() {
    let router = build_router(AppState::new(Arc::new(DownBackend)));
    let response = router
        .oneshot(post_json(json!({ "content": "some text", "contentType": "news" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("gpt-4o-mini"));
}
