use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lambda_llm::{
    handler::{InvocationResponse, CLIENT_ERROR_PREFIX},
    server,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

mod common;

use common::mocks::{create_echoed_completion, MockEngine};

fn create_test_app(engine: MockEngine) -> Router {
    server::router(Arc::new(engine))
}

fn invocation_request(uri: &str, event: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))
        .unwrap()
}

async fn read_invocation_response(response: axum::response::Response) -> InvocationResponse {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_invoke_endpoint_valid_event() {
    let engine =
        MockEngine::new().with_completions(vec![create_echoed_completion("Say hi", " Hello!")]);
    let app = create_test_app(engine);

    let event = json!({
        "body": json!({"prompt": "Say hi"}).to_string(),
        "isBase64Encoded": false
    });

    let response = app.oneshot(invocation_request("/", event)).await.unwrap();

    // The invoke API itself answers 200; the functional status is in the payload
    assert_eq!(response.status(), StatusCode::OK);

    let invocation = read_invocation_response(response).await;
    assert_eq!(invocation.status_code, 200);
    assert!(invocation.body.contains("Instruct: Say hi\\nOutput:"));
}

#[tokio::test]
async fn test_invoke_endpoint_rie_path() {
    let engine =
        MockEngine::new().with_completions(vec![create_echoed_completion("Say hi", " Hello!")]);
    let app = create_test_app(engine);

    let event = json!({
        "body": json!({"prompt": "Say hi"}).to_string()
    });

    let response = app
        .oneshot(invocation_request(
            "/2015-03-31/functions/function/invocations",
            event,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let invocation = read_invocation_response(response).await;
    assert_eq!(invocation.status_code, 200);
}

#[tokio::test]
async fn test_invoke_endpoint_client_error_payload() {
    let app = create_test_app(MockEngine::new());

    let event = json!({
        "body": "not json",
        "isBase64Encoded": false
    });

    let response = app.oneshot(invocation_request("/", event)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let invocation = read_invocation_response(response).await;
    assert_eq!(invocation.status_code, 400);
    assert!(invocation.body.starts_with(CLIENT_ERROR_PREFIX));
}

#[tokio::test]
async fn test_invoke_endpoint_engine_failure() {
    let app = create_test_app(MockEngine::new().with_error("out of memory".to_string()));

    let event = json!({
        "body": json!({"prompt": "Say hi"}).to_string()
    });

    let response = app.oneshot(invocation_request("/", event)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let invocation = read_invocation_response(response).await;
    assert_eq!(invocation.status_code, 500);
    assert!(invocation.body.starts_with("Internal error:"));
}

#[tokio::test]
async fn test_invoke_endpoint_malformed_outer_json() {
    let app = create_test_app(MockEngine::new());

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("invalid json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // Should return 400 Bad Request for invalid JSON
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invoke_endpoint_missing_body_field() {
    let app = create_test_app(MockEngine::new());

    let event = json!({
        "isBase64Encoded": false
        // Missing "body" field
    });

    let response = app.oneshot(invocation_request("/", event)).await.unwrap();

    // Should return 422 Unprocessable Entity for missing required field
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_wrong_http_method() {
    let app = create_test_app(MockEngine::new());

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // Should return 405 Method Not Allowed
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_wrong_path() {
    let app = create_test_app(MockEngine::new());

    let request = Request::builder()
        .method("POST")
        .uri("/wrong-path")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // Should return 404 Not Found
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_invocations() {
    let completions = (0..5)
        .map(|i| create_echoed_completion(&format!("Concurrent request {}", i), " ok"))
        .collect();
    let app = create_test_app(MockEngine::new().with_completions(completions));

    let mut handles = vec![];

    for i in 0..5 {
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            let event = json!({
                "body": json!({"prompt": format!("Concurrent request {}", i)}).to_string()
            });
            app_clone
                .oneshot(invocation_request("/", event))
                .await
                .unwrap()
        });
        handles.push(handle);
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let invocation = read_invocation_response(response).await;
        assert_eq!(invocation.status_code, 200);
    }
}
