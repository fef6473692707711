use std::io::Write;

use tokio::sync::Mutex;
use tracing::info;

use crate::cli::BrowseArgs;
use crate::client::{FeedClient, LoadOutcome};
use crate::commands::CommandError;
use crate::config::AppConfig;
use crate::wiring::build_http_client;
use housing_core::domain::chips::{active_chips, FilterChip};
use housing_core::domain::filter::FilterCriteria;
use housing_core::domain::keyword::{KeywordMatcher, MatchSpan};
use housing_core::domain::post::Post;
use housing_core::domain::session::FeedSession;

pub async fn run(config: &AppConfig, args: &BrowseArgs) -> Result<(), CommandError> {
    let criteria = FilterCriteria::try_from(&args.filter_params())?;
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.api_base_url.clone());
    let client = FeedClient::new(build_http_client(config)?, base_url);
    let session = Mutex::new(FeedSession::new(
        criteria,
        config.date_window,
        KeywordMatcher::new(config.keyword_threshold),
    ));

    for _ in 0..args.pages {
        match client.load_more(&session).await? {
            LoadOutcome::Loaded { added } => info!(added, "page loaded"),
            LoadOutcome::Skipped => break,
        }
    }

    let session = session.into_inner();
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", render_chips(&active_chips(session.criteria())))?;
    let visible = session.visible();
    for post in &visible {
        writeln!(out, "{}", render_post(post, session.match_span(&post.id)))?;
    }
    writeln!(
        out,
        "{} shown of {} loaded{}",
        visible.len(),
        session.posts().len(),
        if session.is_exhausted() { ", no more posts" } else { "" }
    )?;
    Ok(())
}

fn render_chips(chips: &[FilterChip]) -> String {
    let rendered: Vec<String> = chips
        .iter()
        .map(|chip| format!("[{}: {}]", chip.label, chip.value))
        .collect();
    if rendered.is_empty() {
        "no filters".to_string()
    } else {
        rendered.join(" ")
    }
}

fn render_post(post: &Post, span: Option<MatchSpan>) -> String {
    let message = match span {
        Some(span) => highlight(&post.message, span),
        None => post.message.clone(),
    };
    format!(
        "{} {} ({}): {}",
        post.created_at.format("%Y-%m-%d"),
        post.author.name,
        post.post_type.as_str(),
        message
    )
}

/// Brackets the characters covered by `span`. Spans count chars, not bytes.
fn highlight(text: &str, span: MatchSpan) -> String {
    let mut output = String::with_capacity(text.len() + 2);
    for (index, ch) in text.chars().enumerate() {
        if index == span.start {
            output.push('[');
        }
        output.push(ch);
        if index + 1 == span.end {
            output.push(']');
        }
    }
    output
}
