mod cli;
mod client;
mod commands;
mod config;
mod http;
mod state;
mod wiring;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::CommandError;
use crate::config::{AppConfig, ConfigError};
use crate::http::HttpError;
use crate::wiring::WiringError;
use housing_infra::db::{run_migrations, DbPoolError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("wiring error: {0}")]
    Wiring(#[from] WiringError),
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("http error: {0}")]
    Http(#[from] HttpError),
    #[error("command failed: {0}")]
    Command(#[from] CommandError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    config::load_dotenv()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Import { path } => Ok(commands::import::run(&config, &path).await?),
        Command::Browse(args) => Ok(commands::browse::run(&config, &args).await?),
    }
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    let state = wiring::build_state(config)?;
    if let Some(pool) = state.db.as_ref() {
        run_migrations(pool).await?;
    }
    let addr = state.config.http_addr;
    info!(
        %addr,
        date_window_days = state.config.date_window.days(),
        keyword_threshold = state.config.keyword_threshold,
        "http server starting"
    );
    http::serve(addr, state, shutdown_signal()).await?;
    info!("http server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler");
    }
    info!("shutdown signal received");
}
