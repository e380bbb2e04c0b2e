#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

pub const ARTICLE_PATH: &str = "/articles/rust";

const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Ownership in Rust</title></head>
  <body>
    <h1>Ownership</h1>
    <p>Every value has a single owner.</p>
    <ul><li>Moves transfer ownership</li><li>Borrows do not</li></ul>
  </body>
</html>"#;

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: Value,
}

impl MockReply {
    pub fn rate_limited() -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: json!({ "error": { "code": "429", "message": "rate limit exceeded" } }),
        }
    }

    pub fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: json!({ "error": { "code": "server_error", "message": "upstream exploded" } }),
        }
    }
}

#[derive(Clone, Default)]
struct ProviderScript {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<Value>>>,
}

#[derive(Clone, Default)]
struct UpstreamState {
    azure: ProviderScript,
    deepseek: ProviderScript,
}

/// One local server standing in for both the fetched web page and the two
/// chat completion providers. Unscripted provider calls answer with
/// `"<provider> reply <n>"`.
pub struct MockUpstream {
    pub base_url: String,
    state: UpstreamState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<tokio::task::JoinHandle<()>>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = UpstreamState::default();
        let app = Router::new()
            .route(ARTICLE_PATH, get(|| async { Html(ARTICLE_HTML) }))
            .route(
                "/blank",
                get(|| async { Html("<html><body><div></div></body></html>") }),
            )
            .route(
                "/openai/deployments/{deployment}/chat/completions",
                post(azure_handler),
            )
            .route("/v1/chat/completions", post(deepseek_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            server.await.expect("test server should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            state,
            shutdown_tx: Some(shutdown_tx),
            server_task: Some(server_task),
        }
    }

    pub fn article_url(&self) -> String {
        format!("{}{ARTICLE_PATH}", self.base_url)
    }

    pub async fn script_azure(&self, reply: MockReply) {
        self.state.azure.replies.lock().await.push_back(reply);
    }

    pub async fn script_deepseek(&self, reply: MockReply) {
        self.state.deepseek.replies.lock().await.push_back(reply);
    }

    pub async fn azure_calls(&self) -> Vec<Value> {
        self.state.azure.calls.lock().await.clone()
    }

    pub async fn deepseek_calls(&self) -> Vec<Value> {
        self.state.deepseek.calls.lock().await.clone()
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(server_task) = self.server_task.take() {
            server_task.await.expect("server task should join");
        }
    }
}

async fn azure_handler(
    State(state): State<UpstreamState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    respond(&state.azure, "azure", payload).await
}

async fn deepseek_handler(
    State(state): State<UpstreamState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    respond(&state.deepseek, "deepseek", payload).await
}

async fn respond(script: &ProviderScript, provider: &str, payload: Value) -> (StatusCode, Json<Value>) {
    let call_number = {
        let mut calls = script.calls.lock().await;
        calls.push(payload);
        calls.len()
    };

    match script.replies.lock().await.pop_front() {
        Some(reply) => (reply.status, Json(reply.body)),
        None => (
            StatusCode::OK,
            Json(json!({
                "choices": [
                    {
                        "message": {
                            "role": "assistant",
                            "content": format!("{provider} reply {call_number}")
                        }
                    }
                ]
            })),
        ),
    }
}
