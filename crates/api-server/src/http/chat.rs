use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ChatRequest, ChatResponse};
use tracing::warn;

use super::AppState;
use super::errors::{chat_error_response, json_rejection_response};

pub(super) async fn chat_turn(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };

    match state.orchestrator.handle_turn(request.into()).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::from(reply))).into_response(),
        Err(err) => {
            warn!("chat turn failed: {err}");
            chat_error_response(err)
        }
    }
}
