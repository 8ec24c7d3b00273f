use aeo_analyzer::error::ScoringError;
use aeo_analyzer::models::SubScores;
use aeo_analyzer::services::{HttpScoringBackend, ScoreRequest, ScoringBackend};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ScoreRequest {
    ScoreRequest {
        content: "https://example.com/blog/aeo".to_string(),
        content_type: "blog".to_string(),
    }
}

async fn backend_for(server: &MockServer) -> HttpScoringBackend {
    HttpScoringBackend::new(&format!("{}/api/analyze", server.uri()), 5).unwrap()
}

#[tokio::test]
async fn test_posts_wire_request_and_parses_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .and(body_json(json!({
            "content": "https://example.com/blog/aeo",
            "contentType": "blog"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scores": {
                "keywordRelevance": 82,
                "readability": 77,
                "snippetOptimization": 90,
                "structuredData": 64
            },
            "recommendations": ["Add structured data: mark up the FAQ section"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = assert_ok!(backend_for(&server).await.score(&request()).await);
    assert_eq!(response.scores, SubScores::new(82, 77, 90, 64));
    assert_eq!(response.recommendations.len(), 1);
}

#[tokio::test]
async fn test_error_body_becomes_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/analyze"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to analyze content" })),
        )
        .mount(&server)
        .await;

    let err = assert_err!(backend_for(&server).await.score(&request()).await);
    match err {
        ScoringError::BadStatus { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Failed to analyze content");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_scores_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recommendations": ["Improve readability: shorter sentences"]
        })))
        .mount(&server)
        .await;

    let err = assert_err!(backend_for(&server).await.score(&request()).await);
    assert!(matches!(err, ScoringError::MissingScores));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(backend_for(&server).await.score(&request()).await);
    assert!(matches!(err, ScoringError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() {
    let backend = HttpScoringBackend::new("http://127.0.0.1:9/api/analyze", 2).unwrap();
    let err = assert_err!(backend.score(&request()).await);
    assert!(matches!(err, ScoringError::RequestFailed { .. }));
}
