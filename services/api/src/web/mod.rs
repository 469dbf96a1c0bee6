pub mod auth;
pub mod cookie;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use auth::{sign_in_handler, sign_out_handler, sign_up_handler};
pub use rest::health_handler;
pub use state::AppState;

/// Builds the router serving the account endpoints.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/sign-up", post(sign_up_handler))
        .route("/auth/sign-in", post(sign_in_handler))
        .route("/auth/sign-out", post(sign_out_handler))
        .with_state(state)
}
