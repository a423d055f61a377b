//! HTTP-level tests for the webhook router.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use super::{EVENT_HEADER, MAX_BODY_BYTES, SIGNATURE_HEADER, WebhookPipeline, router};
use crate::dispatch::mock::RecordingTransport;
use crate::dispatch::{ConnectionRegistry, Dispatcher};
use crate::registry::mock::MemoryStore;
use crate::registry::{SubscriberRegistry, Subscription};
use crate::signature::sign;

const SECRET: &str = "hook-secret";
const PATH: &str = "/github/webhook";

fn app(spy: Arc<RecordingTransport>) -> Router {
    let connections = ConnectionRegistry::new();
    connections.register_shared("onebot", spy);
    let store = MemoryStore::with([Subscription::new("10001", "onebot")]);
    let pipeline = WebhookPipeline::new(
        SECRET,
        SubscriberRegistry::new(store),
        Dispatcher::new(connections),
    );
    router(PATH, Arc::new(pipeline))
}

fn push_body() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "repository": {
            "full_name": "a/b",
            "stargazers_count": 3,
            "html_url": "https://github.com/a/b"
        },
        "pusher": { "name": "bob" },
        "commits": [{
            "id": "abc123",
            "message": "Fix build",
            "url": "https://github.com/a/b/commit/abc123"
        }],
        "compare": "https://github.com/a/b/compare/000...abc123"
    }))
    .unwrap()
}

fn webhook_request(event: &str, signature: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(PATH)
        .header("content-type", "application/json")
        .header(EVENT_HEADER, event);
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

mod webhook_route {
    use super::*;

    #[tokio::test]
    async fn signed_push_is_accepted_and_relayed() {
        let spy = Arc::new(RecordingTransport::new());
        let body = push_body();
        let signature = sign(SECRET, &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("push", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Webhook received");
        assert_eq!(spy.recipients(), vec!["10001"]);
        let (_, notification) = &spy.sent()[0];
        assert!(notification.text().contains("-- Fix build"));
    }

    #[tokio::test]
    async fn bad_signature_is_forbidden() {
        let spy = Arc::new(RecordingTransport::new());
        let body = push_body();
        let signature = sign("wrong-secret", &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("push", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "Forbidden");
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn unsigned_request_is_forbidden() {
        let spy = Arc::new(RecordingTransport::new());

        let response = app(spy.clone())
            .oneshot(webhook_request("push", None, push_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_event_still_answers_ok() {
        let spy = Arc::new(RecordingTransport::new());
        let body = br#"{"zen":"Keep it logically awesome."}"#.to_vec();
        let signature = sign(SECRET, &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("ping", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Webhook received");
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn failed_delivery_still_answers_ok() {
        let spy = Arc::new(RecordingTransport::failing_for(&["10001"]));
        let body = push_body();
        let signature = sign(SECRET, &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("push", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn large_signed_push_is_accepted() {
        let spy = Arc::new(RecordingTransport::new());
        let mut payload: serde_json::Value = serde_json::from_slice(&push_body()).unwrap();
        let message = format!("Vendor assets\n\n{}", "x".repeat(3 << 20));
        payload["commits"][0]["message"] = json!(message);
        let body = serde_json::to_vec(&payload).unwrap();
        assert!(body.len() > 2 * 1024 * 1024);
        let signature = sign(SECRET, &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("push", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(spy.calls(), 1);
        let (_, notification) = &spy.sent()[0];
        assert!(notification.text().contains("-- Vendor assets"));
    }

    #[tokio::test]
    async fn body_over_limit_is_refused() {
        let spy = Arc::new(RecordingTransport::new());
        let body = vec![b' '; MAX_BODY_BYTES + 1];
        let signature = sign(SECRET, &body);

        let response = app(spy.clone())
            .oneshot(webhook_request("push", Some(signature.as_str()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn get_on_webhook_path_is_not_allowed() {
        let spy = Arc::new(RecordingTransport::new());
        let request = Request::builder()
            .method(Method::GET)
            .uri(PATH)
            .body(Body::empty())
            .unwrap();

        let response = app(spy).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let spy = Arc::new(RecordingTransport::new());
        let body = push_body();
        let signature = sign(SECRET, &body);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/elsewhere")
            .header(EVENT_HEADER, "push")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap();

        let response = app(spy.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(spy.calls(), 0);
    }
}

mod health_route {
    use super::*;

    #[tokio::test]
    async fn health_answers_ok() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(Arc::new(RecordingTransport::new()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }
}
