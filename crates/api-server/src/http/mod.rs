use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use shared::conversation::{ConversationOrchestrator, SessionStore};
use shared::fetch::ContentFetcher;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod chat;
mod conversations;
mod errors;
mod health;
mod parse;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: ConversationOrchestrator,
    pub store: SessionStore,
    pub fetcher: Arc<dyn ContentFetcher>,
}

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/parse", post(parse::parse_page))
        .route("/chat", post(chat::chat_turn))
        .route("/conversations", get(conversations::list_conversations))
        .route(
            "/history/{conversation_id}",
            get(conversations::get_history).delete(conversations::delete_conversation),
        );

    Router::new()
        .route("/healthz", get(health::healthz))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
