use crate::server::handlers;
use crate::NewsRag;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app: Arc<NewsRag>) -> Router {
    Router::new()
        .route("/retrieve", post(handlers::retrieve))
        .route("/collection", get(handlers::collection))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}
