use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::conversation::{ChatError, ErrorCategory};
use shared::fetch::FetchError;
use shared::models::ErrorResponse;
use tracing::warn;

pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub(super) fn bad_request_response(message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub(super) fn not_found_response(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, message)
}

pub(super) fn json_rejection_response(rejection: JsonRejection) -> Response {
    warn!("rejected request body: {rejection}");
    bad_request_response(&format!("invalid request body: {}", rejection.body_text()))
}

pub(super) fn fetch_error_response(err: &FetchError) -> Response {
    match err {
        FetchError::EmptyUrl | FetchError::InvalidUrl(_) => bad_request_response(&err.to_string()),
        _ => error_response(StatusCode::BAD_GATEWAY, &err.to_string()),
    }
}

pub(super) fn chat_error_response(err: ChatError) -> Response {
    match (&err, err.category()) {
        (ChatError::Fetch(fetch_err), _) => fetch_error_response(fetch_err),
        (_, ErrorCategory::Validation | ErrorCategory::Configuration) => {
            bad_request_response(&err.to_string())
        }
        (_, ErrorCategory::NotFound) => not_found_response(&err.to_string()),
        (_, ErrorCategory::Fetch | ErrorCategory::Provider) => {
            error_response(StatusCode::BAD_GATEWAY, &err.to_string())
        }
    }
}
