use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::AppState;
use housing_core::domain::filter::{FilterCriteria, FilterParams};
use housing_core::domain::pagination::{PageCursor, PageRequest, PageResponse};
use housing_core::error::CoreError;
use housing_infra::db::PostsRepoError;
use housing_infra::feed::fetch_page;

const MAX_KEYWORD_LEN: usize = 256;

#[derive(Debug, Default, Deserialize)]
pub struct PostsParams {
    pub page: Option<String>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

#[derive(Debug, Error)]
pub enum PostsApiError {
    #[error("{0}")]
    InvalidParams(#[from] CoreError),
    #[error("keyword too long (max {0} chars)")]
    KeywordTooLong(usize),
    #[error("post store not configured")]
    DbUnavailable,
    #[error("post store failure: {0}")]
    Store(#[from] PostsRepoError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn get_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> Result<Json<PageResponse>, PostsApiError> {
    let request = parse_request(&params)?;
    let pool = state.db.as_ref().ok_or(PostsApiError::DbUnavailable)?;
    debug!(
        offset = request.cursor.offset(),
        criteria = ?request.criteria,
        "serving posts page"
    );
    let page = fetch_page(pool, &request, state.config.date_window, &state.matcher).await?;
    Ok(Json(PageResponse::from(page)))
}

fn parse_request(params: &PostsParams) -> Result<PageRequest, PostsApiError> {
    let keyword_len = params
        .filters
        .keyword
        .as_deref()
        .map_or(0, |keyword| keyword.chars().count());
    if keyword_len > MAX_KEYWORD_LEN {
        return Err(PostsApiError::KeywordTooLong(MAX_KEYWORD_LEN));
    }
    let cursor = PageCursor::parse(params.page.as_deref().unwrap_or_default())?;
    let criteria = FilterCriteria::try_from(&params.filters)?;
    Ok(PageRequest { cursor, criteria })
}

impl IntoResponse for PostsApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            PostsApiError::InvalidParams(_) | PostsApiError::KeywordTooLong(_) => {
                StatusCode::BAD_REQUEST
            }
            PostsApiError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            PostsApiError::Store(err) => {
                warn!(error = %err, "posts page scan failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
