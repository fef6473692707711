use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;
use housing_core::domain::keyword::KeywordMatcher;
use housing_infra::db::{connect_lazy, DbPoolError};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("database pool error: {0}")]
    Db(#[from] DbPoolError),
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let db = config
        .pool_settings()
        .map(|settings| connect_lazy(&settings))
        .transpose()?;
    if db.is_none() {
        info!("no database configured; /posts will answer 503");
    }
    let matcher = KeywordMatcher::new(config.keyword_threshold);
    Ok(AppState {
        config: Arc::new(config),
        db,
        matcher: Arc::new(matcher),
    })
}

pub fn build_http_client(config: &AppConfig) -> Result<Client, WiringError> {
    Ok(Client::builder().timeout(config.request_timeout).build()?)
}
