// src/provider/ollama.rs — Ollama local model backend

use async_trait::async_trait;

use super::{wire_messages, ChatBackend, ChatRequest, ChatResponse, TokenUsage};
use crate::infra::errors::CoachError;

pub struct OllamaBackend {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| "http://localhost:11434".into())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub(crate) fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": wire_messages(&request.messages),
            "stream": false,
        });

        let mut options = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            options.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.max_tokens {
            options.insert("num_predict".into(), serde_json::json!(max_tokens));
        }
        if !options.is_empty() {
            body["options"] = serde_json::Value::Object(options);
        }

        // Ollama takes the raw JSON schema in `format`.
        if let Some(schema) = &request.response_schema {
            body["format"] = schema.schema.clone();
        }
        body
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn id(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        let body = Self::request_body(&request);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::backend("ollama", format!("Cannot reach Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CoachError::backend(
                "ollama",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            CoachError::backend("ollama", format!("Invalid Ollama response: {}", e))
        })?;

        let content = resp["message"]["content"]
            .as_str()
            .ok_or_else(|| CoachError::backend("ollama", "Response has no message content"))?
            .to_string();

        let usage = TokenUsage {
            input_tokens: resp["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["eval_count"].as_u64().unwrap_or(0) as u32,
        };

        Ok(ChatResponse { content, usage })
    }
}
