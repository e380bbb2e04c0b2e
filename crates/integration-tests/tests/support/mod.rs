#![allow(dead_code)]

pub mod api_app;
pub mod upstream;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse { status, body }
}

pub fn request(method: Method, uri: &str, json_body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub async fn post_chat(app: &axum::Router, body: Value) -> JsonResponse {
    send_json(app, request(Method::POST, "/api/chat", Some(body))).await
}

pub async fn history_len(app: &axum::Router, conversation_id: &str) -> usize {
    let response = send_json(
        app,
        request(
            Method::GET,
            &format!("/api/history/{conversation_id}"),
            None,
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["messages"]
        .as_array()
        .map(Vec::len)
        .expect("history should list messages")
}
