use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::http::middleware::query_limit;
use crate::http::routes::{health, posts};
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let cors = build_cors(&state.config.cors_allow_origins);
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route(
            "/posts",
            get(posts::get_posts).layer(middleware::from_fn(query_limit::enforce_query_length)),
        )
        .with_state(state);
    if let Some(cors) = cors {
        router = router.layer(cors);
    }
    router
}

fn build_cors(allowed: &[String]) -> Option<CorsLayer> {
    let (allow_any, origins) = parse_origins(allowed);
    if !allow_any && origins.is_empty() {
        return None;
    }
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);
    if allow_any {
        Some(cors.allow_origin(Any).allow_headers(Any))
    } else {
        Some(
            cors.allow_origin(AllowOrigin::list(origins))
                .allow_headers([CONTENT_TYPE]),
        )
    }
}

/// Splits configured origins into a wildcard flag and concrete header values.
/// Unparseable entries are dropped with a warning.
fn parse_origins(allowed: &[String]) -> (bool, Vec<HeaderValue>) {
    let mut origins = Vec::new();
    for origin in allowed {
        let origin = origin.trim();
        if origin == "*" {
            return (true, Vec::new());
        }
        match HeaderValue::from_str(origin) {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!(origin = %origin, "invalid CORS origin ignored"),
        }
    }
    (false, origins)
}
