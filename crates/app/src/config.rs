use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use housing_core::domain::keyword::DEFAULT_KEYWORD_THRESHOLD;
use housing_core::types::move_date::DateWindow;
use housing_infra::db::PoolSettings;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub date_window: DateWindow,
    pub keyword_threshold: f64,
    pub request_timeout: Duration,
    pub cors_allow_origins: Vec<String>,
    pub api_base_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let http_addr_raw = env.string("HOUSING_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let keyword_threshold =
            env.number("HOUSING_KEYWORD_THRESHOLD", DEFAULT_KEYWORD_THRESHOLD)?;
        if !(keyword_threshold > 0.0 && keyword_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue(
                "HOUSING_KEYWORD_THRESHOLD",
                keyword_threshold.to_string(),
            ));
        }
        let api_base_url = env.string("HOUSING_API_BASE_URL", "http://127.0.0.1:8080");
        if api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("HOUSING_API_BASE_URL", api_base_url));
        }

        Ok(Self {
            http_addr,
            database_url: env.optional("HOUSING_DATABASE_URL"),
            db_max_connections: env.number("HOUSING_DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(
                env.number("HOUSING_DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            ),
            date_window: DateWindow::new(env.number("HOUSING_DATE_WINDOW_DAYS", 1)?),
            keyword_threshold,
            request_timeout: Duration::from_secs(env.number("HOUSING_REQUEST_TIMEOUT_SECS", 15)?),
            cors_allow_origins: env.list("HOUSING_CORS_ALLOW_ORIGINS"),
            api_base_url,
        })
    }

    pub fn pool_settings(&self) -> Option<PoolSettings> {
        self.database_url.as_ref().map(|database_url| PoolSettings {
            database_url: database_url.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &'static str, default: &'static str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    fn optional(&self, key: &'static str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn number<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber(key, raw)),
        }
    }

    fn list(&self, key: &'static str) -> Vec<String> {
        self.optional(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Loads `KEY=value` pairs from `./.env`. Variables already present in the
/// environment win. Must run before any other thread exists.
pub fn load_dotenv() -> Result<usize, std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(0);
    }
    let contents = std::fs::read_to_string(path)?;
    let pending = pending_assignments(&contents, |key| std::env::var_os(key).is_some());
    let applied = pending.len();
    for (key, value) in pending {
        // Safety: called from `main` before the tokio runtime is built, while
        // the process is still single-threaded.
        unsafe {
            std::env::set_var(key, value);
        }
    }
    Ok(applied)
}

fn pending_assignments<F>(contents: &str, is_set: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> bool,
{
    contents
        .lines()
        .filter_map(parse_dotenv_line)
        .filter(|(key, _)| !is_set(key))
        .collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = match (value.chars().next(), value.chars().last()) {
        (Some('"'), Some('"')) if value.len() >= 2 => unescape(&value[1..value.len() - 1]),
        (Some('\''), Some('\'')) if value.len() >= 2 => value[1..value.len() - 1].to_string(),
        _ => value.to_string(),
    };
    Some((key.to_string(), value))
}

fn unescape(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some(escaped @ ('\\' | '"')) => output.push(escaped),
            Some(other) => {
                output.push('\\');
                output.push(other);
            }
            None => output.push('\\'),
        }
    }
    output
}
