// src/infra/errors.rs — Error types for weekcoach

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    // Content errors (fatal at startup)
    #[error("Content for week {week} missing: {}", path.display())]
    ContentLoad {
        week: u8,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Backend errors (recoverable, per call)
    #[error("Backend '{backend}' error: {message}")]
    Backend { backend: String, message: String },

    #[error("Rate limited by '{backend}'")]
    RateLimited { backend: String },

    // User errors
    #[error("Week {0} is not part of this program")]
    UnknownWeek(u8),

    #[error("No week selected. Pick one with `/week <n>`.")]
    NoWeekSelected,

    #[error("No API key configured. Set OPENAI_API_KEY or switch [model] backend to \"ollama\".")]
    NoApiKey,

    // Infra
    #[error("Log sink '{sink}' failed: {message}")]
    Sink { sink: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoachError {
    /// Backend failures are surfaced to the user as a notice, never fatal.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            CoachError::Backend { .. } | CoachError::RateLimited { .. }
        )
    }

    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        CoachError::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        CoachError::Sink {
            sink: sink.into(),
            message: message.into(),
        }
    }
}
