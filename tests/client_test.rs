//! Wiremock tests for ClassifierClient.
#![cfg(feature = "client")]

use tag_classifier::client::{ClassifierClient, DEFAULT_URL};
use tag_classifier::{ClassifierError, ClassifyRequest};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn health_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy",
            "model": "MoritzLaurer/deberta-v3-base-zeroshot-v2.0",
            "timestamp": "2024-05-01T12:00:00+00:00",
            "version": "0.1.0"
        })))
        .mount(&server)
        .await;

    let health = ClassifierClient::new(server.uri()).unwrap().health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "MoritzLaurer/deberta-v3-base-zeroshot-v2.0");
}

#[tokio::test]
async fn info_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Tag Classifier API",
            "version": "0.1.0",
            "model": "m",
            "endpoints": {"/": "Health check", "/classify": "classify"}
        })))
        .mount(&server)
        .await;

    let info = ClassifierClient::new(server.uri()).unwrap().info().await.unwrap();
    assert_eq!(info.name, "Tag Classifier API");
    assert_eq!(info.endpoints.len(), 2);
}

#[tokio::test]
async fn classify_posts_the_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .and(body_json(serde_json::json!({
            "tags": ["dog", "park"],
            "categories": ["animals", "landscape"],
            "multi_label": false,
            "return_scores": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "category": "animals",
            "score": 0.8,
            "all_scores": {"animals": 0.8, "landscape": 0.2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Trailing slash is tolerated.
    let client = ClassifierClient::new(format!("{}/", server.uri())).unwrap();
    let request = ClassifyRequest::new(["dog", "park"], ["animals", "landscape"]).return_scores(true);
    let result = client.classify(&request).await.unwrap();

    assert_eq!(result.category, "animals");
    let all = result.all_scores.unwrap();
    assert_eq!(all.categories().collect::<Vec<_>>(), vec!["animals", "landscape"]);
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": "INVALID_INPUT", "message": "invalid input: tags must not be empty"}
        })))
        .mount(&server)
        .await;

    let client = ClassifierClient::new(server.uri()).unwrap();
    let err = client
        .classify(&ClassifyRequest::new(Vec::<String>::new(), ["a", "b"]))
        .await
        .unwrap_err();

    match err {
        ClassifierError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid input: tags must not be empty");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = ClassifierClient::new(server.uri())
        .unwrap()
        .health()
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Api { status: 502, ref message } if message == "bad gateway"));
}

#[tokio::test]
async fn unreachable_server_is_an_http_error() {
    // Port 9 (discard) is not expected to run an HTTP server.
    let client = ClassifierClient::new("http://127.0.0.1:9").unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClassifierError::Http(_)));
}

#[cfg(feature = "server")]
#[test]
fn default_url_targets_default_server_port() {
    let config = tag_classifier::server::Config::default();
    let client = ClassifierClient::new(DEFAULT_URL).unwrap();
    assert!(
        client.base_url().ends_with(&format!(":{}", config.server.port)),
        "{} vs port {}",
        client.base_url(),
        config.server.port
    );
}
