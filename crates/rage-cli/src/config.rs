use rage_agent::{LlmProvider, ModelConfig, DEFAULT_TEMPERATURE};
use rage_memory::DEFAULT_TOP_K;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of `rage.toml`. Every field is optional.
#[derive(Debug, Deserialize)]
pub struct RageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub groq: ProviderSection,
    #[serde(default)]
    pub ollama: ProviderSection,
}

/// Per-provider overrides (`[groq]` / `[ollama]`).
#[derive(Debug, Default, Deserialize)]
pub struct ProviderSection {
    pub model_id: Option<String>,
    pub api_base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for RageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            top_k: default_top_k(),
            temperature: default_temperature(),
            groq: ProviderSection::default(),
            ollama: ProviderSection::default(),
        }
    }
}

impl RageConfig {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path`, falling back to defaults when the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Self::parse(&text).map_err(|e| {
                anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            )),
        }
    }

    pub fn section(&self, provider: LlmProvider) -> &ProviderSection {
        match provider {
            LlmProvider::Groq => &self.groq,
            LlmProvider::Ollama => &self.ollama,
        }
    }

    /// Model settings for `provider` with the section overrides applied.
    pub fn model_config(&self, provider: LlmProvider, api_key: String) -> ModelConfig {
        let mut config = ModelConfig::new(provider, api_key);
        config.temperature = self.temperature;
        let section = self.section(provider);
        if let Some(model_id) = &section.model_id {
            config.model_id = model_id.clone();
        }
        if let Some(url) = &section.api_base_url {
            config.api_base_url = Some(url.clone());
        }
        if let Some(max_tokens) = section.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(timeout_secs) = section.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config
    }
}
