// src/provider/openai.rs — OpenAI Chat Completions backend

use async_trait::async_trait;

use super::{wire_messages, ChatBackend, ChatRequest, ChatResponse, TokenUsage};
use crate::infra::errors::CoachError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIBackend {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIBackend {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.into())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the JSON body for `/chat/completions`.
    pub(crate) fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": wire_messages(&request.messages),
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        if let Some(schema) = &request.response_schema {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "strict": true,
                    "schema": schema.schema,
                }
            });
        }
        body
    }
}

#[async_trait]
impl ChatBackend for OpenAIBackend {
    fn id(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        let body = Self::request_body(&request);
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            structured = request.response_schema.is_some(),
            "openai chat request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::backend("openai", e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CoachError::RateLimited {
                backend: "openai".into(),
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CoachError::backend(
                "openai",
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            CoachError::backend("openai", format!("Failed to parse response: {}", e))
        })?;

        parse_response(&resp)
    }
}

fn parse_response(resp: &serde_json::Value) -> Result<ChatResponse, CoachError> {
    let message = &resp["choices"][0]["message"];

    // Structured mode reports schema refusals out of band.
    if let Some(refusal) = message["refusal"].as_str() {
        return Err(CoachError::backend(
            "openai",
            format!("Model refused: {}", refusal),
        ));
    }

    let content = message["content"]
        .as_str()
        .ok_or_else(|| CoachError::backend("openai", "Response has no message content"))?
        .to_string();

    let usage = TokenUsage {
        input_tokens: resp["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: resp["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(ChatResponse { content, usage })
}
