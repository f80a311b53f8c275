use serde::{Deserialize, Serialize};

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Groq cloud inference over an OpenAI-compatible API, bearer key required.
    Groq,
    /// Local Ollama server, no key.
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::Ollama => "ollama",
        }
    }

    pub fn default_model_id(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "mixtral-8x7b-32768",
            LlmProvider::Ollama => "llama3",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, LlmProvider::Groq)
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: LlmProvider,
    pub model_id: String,
    #[serde(default)]
    pub api_key: String,
    pub api_base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    120
}

impl ModelConfig {
    /// Defaults for `provider`; the key is only used by providers that need one.
    pub fn new(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: provider.default_model_id().to_string(),
            api_key: api_key.into(),
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::Groq => "https://api.groq.com/openai",
                LlmProvider::Ollama => "http://localhost:11434",
            }
        }
    }
}
