use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use shorty_domain::RedirectDecision;
use tracing::error;

pub async fn redirect(State(state): State<AppState>, request: Request) -> Response {
    let host = request_host(&request).unwrap_or_default();

    match state.resolve_shortcut.execute(host) {
        RedirectDecision::Redirect { host, target } => match HeaderValue::from_str(&target) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                error!(
                    host = %host,
                    target = %target,
                    error = %e,
                    "Shortcut target is not a valid header value"
                );
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        RedirectDecision::NotFound { .. } => StatusCode::NOT_FOUND.into_response(),
    }
}

/// `Host` header as sent, or the authority of an absolute-form request URI.
fn request_host(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().host())
}
