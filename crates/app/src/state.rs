use std::sync::Arc;

use crate::config::AppConfig;
use housing_core::domain::keyword::KeywordMatcher;
use housing_infra::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Option<DbPool>,
    pub matcher: Arc<KeywordMatcher>,
}
