use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid page number: {0}")]
    InvalidPage(String),
    #[error("invalid price: {0}")]
    InvalidPrice(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid search type: {0}")]
    InvalidSearchType(String),
    #[error("invalid gender: {0}")]
    InvalidGender(String),
    #[error("invalid post type: {0}")]
    InvalidPostType(String),
}
