use super::{build_prompt, http_client, ModelBackend};
use crate::config::ModelConfig;
use async_trait::async_trait;
use rage_core::{RageError, RageResult};
use tracing::debug;

/// Groq backend over the OpenAI-compatible chat completions API.
pub struct GroqBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl GroqBackend {
    pub fn new(config: ModelConfig) -> RageResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RageError::Config("Groq API key is missing".to_string()));
        }
        let http = http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn build_body(&self, prompt: &str, context: &[String], temperature: f32) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model_id,
            "max_tokens": self.config.max_tokens,
            "temperature": temperature,
            "messages": [{
                "role": "user",
                "content": build_prompt(prompt, context),
            }],
        })
    }
}

#[async_trait]
impl ModelBackend for GroqBackend {
    async fn generate(
        &self,
        prompt: &str,
        context: &[String],
        temperature: f32,
    ) -> RageResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = self.build_body(prompt, context, temperature);
        debug!(url = %url, model = %self.config.model_id, context = context.len(), "Groq request");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RageError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RageError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(RageError::Http(format!(
                "Groq API error {}: {}",
                status, text
            )));
        }

        let resp_body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| RageError::Http(e.to_string()))?;
        parse_chat_response(&resp_body)
    }

    fn name(&self) -> &str {
        "groq"
    }
}

/// Extract `choices[0].message.content` from a chat completions response.
pub fn parse_chat_response(body: &serde_json::Value) -> RageResult<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RageError::Http(format!("Groq response has no message content: {}", body)))
}
