use crate::backends::groq::GroqBackend;
use crate::backends::ollama::OllamaBackend;
use crate::backends::ModelBackend;
use crate::config::{LlmProvider, ModelConfig};
use rage_core::RageResult;

/// Model client that dispatches to the correct provider backend.
pub struct ModelClient {
    backend: Box<dyn ModelBackend>,
}

impl ModelClient {
    pub fn new(config: ModelConfig) -> RageResult<Self> {
        let backend: Box<dyn ModelBackend> = match config.provider {
            LlmProvider::Groq => Box::new(GroqBackend::new(config)?),
            LlmProvider::Ollama => Box::new(OllamaBackend::new(config)?),
        };
        Ok(Self { backend })
    }

    /// Create from a pre-built backend (for custom/external providers).
    pub fn from_backend(backend: Box<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub fn name(&self) -> &str {
        self.backend.name()
    }

    pub async fn generate(
        &self,
        prompt: &str,
        context: &[String],
        temperature: f32,
    ) -> RageResult<String> {
        self.backend.generate(prompt, context, temperature).await
    }
}
