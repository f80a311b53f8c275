use super::{build_prompt, http_client, ModelBackend};
use crate::config::ModelConfig;
use async_trait::async_trait;
use rage_core::{RageError, RageResult};
use tracing::debug;

/// Local Ollama server backend (`/api/generate`, non-streaming).
pub struct OllamaBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(config: ModelConfig) -> RageResult<Self> {
        let http = http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    fn build_body(&self, prompt: &str, context: &[String], temperature: f32) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model_id,
            "prompt": build_prompt(prompt, context),
            "stream": false,
            "options": { "temperature": temperature },
        })
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn generate(
        &self,
        prompt: &str,
        context: &[String],
        temperature: f32,
    ) -> RageResult<String> {
        let url = format!("{}/api/generate", self.config.base_url());
        let body = self.build_body(prompt, context, temperature);
        debug!(url = %url, model = %self.config.model_id, context = context.len(), "Ollama request");

        let resp = self
            .http
            .post(&url)
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
                "Ollama API error {}: {}",
                status, text
            )));
        }

        let resp_body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| RageError::Http(e.to_string()))?;
        resp_body["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RageError::Http(format!("Ollama response has no text: {}", resp_body)))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
