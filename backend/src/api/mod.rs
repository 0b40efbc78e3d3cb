//! HTTP surface over the engine's read side.

pub mod handlers;
pub mod models;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let price_routes = Router::new()
        .route("/latest", get(handlers::latest))
        .route("/history", get(handlers::history))
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/price", price_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
