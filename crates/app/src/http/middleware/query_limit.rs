use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::debug;

/// Longest raw query string `/posts` accepts, in bytes.
pub const MAX_QUERY_STRING_BYTES: usize = 1024;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn enforce_query_length(req: Request, next: Next) -> Response {
    let length = req.uri().query().map_or(0, str::len);
    if exceeds_limit(length) {
        debug!(length, "rejecting oversized query string");
        let body = ErrorBody {
            error: format!("query string too long (max {MAX_QUERY_STRING_BYTES} bytes)"),
        };
        return (StatusCode::URI_TOO_LONG, Json(body)).into_response();
    }
    next.run(req).await
}

fn exceeds_limit(length: usize) -> bool {
    length > MAX_QUERY_STRING_BYTES
}
