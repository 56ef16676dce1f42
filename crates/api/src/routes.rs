use crate::handlers;
use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Every path and method lands on the same redirect handler.
pub fn create_redirect_routes(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::redirect)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
