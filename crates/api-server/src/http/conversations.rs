use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ConversationListResponse, DeleteConversationResponse, HistoryResponse};

use super::AppState;
use super::errors::not_found_response;

pub(super) async fn list_conversations(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ConversationListResponse {
            success: true,
            conversation_ids: state.store.list_ids(),
        }),
    )
}

pub(super) async fn get_history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Response {
    let Some(messages) = state.store.history(&conversation_id) else {
        return not_found_response(&format!("conversation not found: {conversation_id}"));
    };

    (
        StatusCode::OK,
        Json(HistoryResponse {
            success: true,
            conversation_id,
            messages,
        }),
    )
        .into_response()
}

pub(super) async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Response {
    if !state.store.delete(&conversation_id) {
        return not_found_response(&format!("conversation not found: {conversation_id}"));
    }

    (
        StatusCode::OK,
        Json(DeleteConversationResponse {
            success: true,
            conversation_id,
        }),
    )
        .into_response()
}
