pub mod groq;
pub mod ollama;

use async_trait::async_trait;
use rage_core::RageResult;

/// Trait for model provider backends.
///
/// Each provider (Groq, Ollama) implements this trait to handle API
/// communication. To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `ModelBackend` for your struct
/// 3. Add the variant to `LlmProvider` in `config.rs`
/// 4. Wire it up in `ModelClient::new()` in `llm.rs`
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generate a completion for `prompt`, grounded on `context` when it is
    /// non-empty.
    async fn generate(
        &self,
        prompt: &str,
        context: &[String],
        temperature: f32,
    ) -> RageResult<String>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Frame the user prompt with retrieved context.
///
/// Without context the prompt is passed through unchanged.
pub fn build_prompt(prompt: &str, context: &[String]) -> String {
    if context.is_empty() {
        return prompt.to_string();
    }
    format!(
        "Context: {}\n\nQuestion: {}\n\nAnswer:",
        context.join("\n\n"),
        prompt
    )
}

pub(crate) fn http_client(timeout_secs: u64) -> RageResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| rage_core::RageError::Http(e.to_string()))
}
