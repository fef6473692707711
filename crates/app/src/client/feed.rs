use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use housing_core::domain::pagination::{PageRequest, PageResponse};
use housing_core::domain::session::FeedSession;
use housing_core::error::CoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid page from server: {0}")]
    Page(#[from] CoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { added: usize },
    /// Another load was in flight or the feed is exhausted.
    Skipped,
}

/// Talks to `GET /posts` on a running server.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/posts", self.base_url))
            .query(&request.to_query_pairs())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.json::<PageResponse>().await?)
    }

    /// Fetches the next page into `session`. The session lock is not held
    /// across the request, so a concurrent caller sees the in-flight flag and
    /// gets [`LoadOutcome::Skipped`].
    pub async fn load_more(&self, session: &Mutex<FeedSession>) -> Result<LoadOutcome, ClientError> {
        let Some(request) = session.lock().await.begin_load() else {
            debug!("load skipped");
            return Ok(LoadOutcome::Skipped);
        };
        match self.fetch_page(&request).await {
            Ok(page) => {
                let added = session.lock().await.complete_load(page)?;
                Ok(LoadOutcome::Loaded { added })
            }
            Err(err) => {
                warn!(error = %err, offset = request.cursor.offset(), "page load failed");
                session.lock().await.abort_load();
                Err(err)
            }
        }
    }
}
