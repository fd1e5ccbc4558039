//! `POST /mcp`: one JSON-RPC message per request body.

use crate::protocol::{dispatch, parse_message};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Notifications are acknowledged with `202 Accepted` and no body. Bodies that
/// are not a JSON-RPC object get `400` with the JSON-RPC error attached.
pub async fn mcp_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let start_time = std::time::Instant::now();

    let request = match parse_message(&body) {
        Ok(request) => request,
        Err(error_response) => {
            tracing::warn!(bytes = body.len(), "Rejected malformed JSON-RPC body");
            metrics::counter!("mcp_requests_total", "method" => "invalid").increment(1);
            return (StatusCode::BAD_REQUEST, Json(error_response)).into_response();
        }
    };

    let method = method_label(&request.method);
    let response = dispatch(state, request).await;

    let elapsed = start_time.elapsed();
    metrics::histogram!("mcp_request_duration_seconds").record(elapsed.as_secs_f64());
    metrics::counter!("mcp_requests_total", "method" => method).increment(1);

    tracing::debug!(
        method,
        latency_ms = elapsed.as_millis() as u64,
        "MCP request handled"
    );

    match response {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Metric label for a JSON-RPC method. Anything outside the served set shares
/// one label so clients cannot grow the series count.
fn method_label(method: &str) -> &'static str {
    match method {
        "initialize" => "initialize",
        "ping" => "ping",
        "tools/list" => "tools/list",
        "tools/call" => "tools/call",
        "resources/list" => "resources/list",
        "resources/templates/list" => "resources/templates/list",
        "resources/read" => "resources/read",
        m if m.starts_with("notifications/") => "notification",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_labels_are_bounded() {
        assert_eq!(method_label("tools/call"), "tools/call");
        assert_eq!(method_label("notifications/initialized"), "notification");
        assert_eq!(method_label("notifications/cancelled"), "notification");
        assert_eq!(method_label("made/up/1"), "unknown");
        assert_eq!(method_label("made/up/2"), "unknown");
        assert_eq!(method_label(""), "unknown");
    }
}
