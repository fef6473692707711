pub mod browse;
pub mod import;

use thiserror::Error;

use crate::client::ClientError;
use crate::wiring::WiringError;
use housing_core::error::CoreError;
use housing_infra::db::{DbPoolError, PostsRepoError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("HOUSING_DATABASE_URL is not set")]
    DatabaseRequired,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid posts file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid filter: {0}")]
    Filter(#[from] CoreError),
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("post store error: {0}")]
    Store(#[from] PostsRepoError),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("feed client error: {0}")]
    Client(#[from] ClientError),
}
