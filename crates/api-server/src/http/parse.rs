use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ParseRequest, ParseResponse};
use tracing::warn;

use super::AppState;
use super::errors::{fetch_error_response, json_rejection_response};

/// Fetches and extracts page text without touching any session.
pub(super) async fn parse_page(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };

    match state.fetcher.fetch(&request.url).await {
        Ok(page) => (StatusCode::OK, Json(ParseResponse::from(page))).into_response(),
        Err(err) => {
            warn!("page parse failed for {}: {err}", request.url);
            fetch_error_response(&err)
        }
    }
}
