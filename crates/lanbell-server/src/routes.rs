//! HTTP routes for the responder.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

use crate::notify::Notifier;
use crate::page::LANDING_PAGE;

/// Placeholder used when `/log` carries no usable message.
const NO_MESSAGE: &str = "No message received";

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    notifier: Arc<dyn Notifier>,
}

/// Create the router with all routes.
///
/// `GET /log` (exact, case-sensitive) acknowledges a message; every other
/// request, wrong-method `/log` included, receives the static landing page.
pub fn create_router(notifier: Arc<dyn Notifier>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/log", get(log_message))
        .fallback(landing_page)
        .method_not_allowed_fallback(landing_page)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { notifier })
}

/// `GET /log?message=<text>`: surface the message locally and acknowledge
/// in plain text.
async fn log_message(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let message = first_message_value(query.as_deref());
    debug!(message = %message, "Log request");
    state.notifier.display(&message);
    format!("Log received: {message}")
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// First `message` value in the query string. A key may repeat; the first
/// occurrence wins. Absent or empty values fall back to the placeholder.
fn first_message_value(query: Option<&str>) -> String {
    query
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "message")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| NO_MESSAGE.to_string())
}
