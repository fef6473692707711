use std::path::Path;

use tracing::info;

use crate::commands::CommandError;
use crate::config::AppConfig;
use housing_core::domain::post::Post;
use housing_infra::db::{connect_lazy, insert_posts, run_migrations};

pub async fn run(config: &AppConfig, path: &Path) -> Result<(), CommandError> {
    let settings = config.pool_settings().ok_or(CommandError::DatabaseRequired)?;
    let raw = tokio::fs::read_to_string(path).await?;
    let posts = parse_posts(&raw)?;

    let pool = connect_lazy(&settings)?;
    run_migrations(&pool).await?;
    let inserted = insert_posts(&pool, &posts).await?;
    info!(
        path = %path.display(),
        total = posts.len(),
        inserted,
        skipped = posts.len() as u64 - inserted,
        "posts imported"
    );
    Ok(())
}

fn parse_posts(raw: &str) -> Result<Vec<Post>, CommandError> {
    Ok(serde_json::from_str(raw)?)
}
