//! Route table for the membership API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/membership", post(handlers::submit_application))
        .route(
            "/api/membership/redirect-flow",
            post(handlers::start_redirect_flow),
        )
        .route(
            "/api/membership/redirect-flow/complete",
            get(handlers::complete_redirect_flow),
        )
        .route(
            "/supporter-approval/:session_token/:action",
            get(handlers::decide_application),
        )
        .route("/gocardless-webhook", post(handlers::gocardless_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
