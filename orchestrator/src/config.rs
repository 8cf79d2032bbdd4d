use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_PORT_RETRY_ATTEMPTS: u16 = 10;
pub const DEFAULT_PINECONE_INDEX: &str = "aace-index";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 3072;
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub port_retry_attempts: u16,
    pub pinecone_api_key: String,
    pub pinecone_host: String,
    pub pinecone_index: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chat_model: String,
    pub chat_temperature: f32,
    pub top_k: usize,
    pub embed_timeout: Duration,
    pub retrieval_timeout: Duration,
    pub synthesis_timeout: Duration,
    pub max_context_chars: Option<usize>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let entry = |key: &'static str| get(key).map(|value| (key, value));

        Ok(Config {
            port: parse_or(entry("PORT"), DEFAULT_PORT)?,
            port_retry_attempts: parse_or(
                entry("PORT_RETRY_ATTEMPTS"),
                DEFAULT_PORT_RETRY_ATTEMPTS,
            )?,
            pinecone_api_key: required("PINECONE_API_KEY")?,
            pinecone_host: required("PINECONE_HOST")?,
            pinecone_index: get("PINECONE_INDEX")
                .unwrap_or_else(|| DEFAULT_PINECONE_INDEX.to_string()),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimensions: parse_positive(
                entry("EMBEDDING_DIMENSIONS"),
                DEFAULT_EMBEDDING_DIMENSIONS,
            )?,
            chat_model: get("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            chat_temperature: parse_or(entry("CHAT_TEMPERATURE"), DEFAULT_CHAT_TEMPERATURE)?,
            top_k: parse_positive(entry("TOP_K"), DEFAULT_TOP_K)?,
            embed_timeout: secs(parse_positive(entry("EMBED_TIMEOUT_SECS"), 30)?),
            retrieval_timeout: secs(parse_positive(entry("RETRIEVAL_TIMEOUT_SECS"), 10)?),
            synthesis_timeout: secs(parse_positive(entry("SYNTHESIS_TIMEOUT_SECS"), 60)?),
            max_context_chars: match entry("MAX_CONTEXT_CHARS") {
                Some(kv) => Some(parse_positive(Some(kv), 0)?),
                None => None,
            },
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

type KeyValue = (&'static str, String);

fn parse_or<T: FromStr>(entry: Option<KeyValue>, default: T) -> Result<T, ConfigError> {
    match entry {
        Some((key, value)) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_positive(entry: Option<KeyValue>, default: usize) -> Result<usize, ConfigError> {
    let invalid = entry.clone();
    match parse_or(entry, default)? {
        0 => match invalid {
            Some((key, value)) => Err(ConfigError::Invalid { key, value }),
            None => Ok(default),
        },
        n => Ok(n),
    }
}

fn secs(value: usize) -> Duration {
    Duration::from_secs(value as u64)
}
