use thiserror::Error;

use crate::db::models::{League, Provider};

/// Errors raised by the fetch-normalize-cache-persist pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url}: gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedded document not found in {0}")]
    Extract(String),

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: Provider,
        operation: &'static str,
    },

    #[error("no agents registered for {provider} / {league}")]
    MissingAgent { league: League, provider: Provider },

    #[error("{provider} payload: {message}")]
    Normalize { provider: Provider, message: String },

    #[error("cache I/O error on {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    Poisoned,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schedule config: {0}")]
    Schedule(String),

    #[error("{entity} processor needs {capability}")]
    Capability {
        entity: &'static str,
        capability: &'static str,
    },
}

impl IngestError {
    pub fn normalize(provider: Provider, message: impl Into<String>) -> Self {
        IngestError::Normalize {
            provider,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
