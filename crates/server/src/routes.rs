use axum::{routing::get, Json, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

pub mod polls;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(polls::index))
        .route("/health", get(health))
        .route("/polls", get(polls::new_poll_form).post(polls::create_poll))
        .route("/polls/:id", get(polls::show_poll))
        .route("/vote/:id/:option", get(polls::vote))
        .route("/delete/:id", get(polls::delete_poll))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
