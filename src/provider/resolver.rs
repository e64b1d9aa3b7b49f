// src/provider/resolver.rs — Backend selection from config

use std::sync::Arc;

use super::ollama::OllamaBackend;
use super::openai::OpenAIBackend;
use super::ChatBackend;
use crate::infra::config::{BackendKind, ModelConfig};
use crate::infra::errors::CoachError;
use crate::infra::paths;

/// Build the configured backend. OpenAI needs a key from `OPENAI_API_KEY`
/// or `~/.weekcoach/credentials/openai.key`.
pub async fn build_backend(config: &ModelConfig) -> Result<Arc<dyn ChatBackend>, CoachError> {
    let key = match config.backend {
        BackendKind::OpenAI => resolve_key("OPENAI_API_KEY", "openai").await,
        BackendKind::Ollama => None,
    };
    backend_from_parts(config, key)
}

pub(crate) fn backend_from_parts(
    config: &ModelConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn ChatBackend>, CoachError> {
    let backend: Arc<dyn ChatBackend> = match config.backend {
        BackendKind::OpenAI => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(CoachError::NoApiKey)?;
            match &config.base_url {
                Some(url) => Arc::new(OpenAIBackend::with_base_url(key, url.clone())),
                None => Arc::new(OpenAIBackend::new(key)),
            }
        }
        BackendKind::Ollama => Arc::new(OllamaBackend::new(config.base_url.clone())),
    };
    tracing::info!("Chat backend: {}/{}", backend.id(), config.model);
    Ok(backend)
}

/// Env var first, then the saved credential file.
async fn resolve_key(env_var: &str, backend_id: &str) -> Option<String> {
    if let Ok(key) = std::env::var(env_var) {
        return Some(key);
    }
    let path = paths::config_dir()
        .join("credentials")
        .join(format!("{backend_id}.key"));
    tokio::fs::read_to_string(&path)
        .await
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}
