use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;
use housing_infra::db::count_posts;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub database: DatabaseStatus,
    pub keyword: KeywordStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct KeywordStatus {
    pub threshold: f64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "ok";
    let posts = match state.db.as_ref() {
        None => None,
        Some(pool) => match count_posts(pool).await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(error = %err, "health check could not count posts");
                status = "degraded";
                None
            }
        },
    };

    Json(HealthResponse {
        status,
        modules: HealthModules {
            database: DatabaseStatus {
                configured: state.db.is_some(),
                posts,
            },
            keyword: KeywordStatus {
                threshold: state.matcher.threshold(),
            },
        },
    })
}
