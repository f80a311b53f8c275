mod config;

use clap::{Parser, ValueEnum};
use config::RageConfig;
use rage_agent::{LlmProvider, ModelClient, RagPipeline};
use rage_core::RageError;
use rage_memory::{EmbeddingProvider, LocalEmbedding, MemoryLayout, MemoryManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rage", about = "Rage: retrieval-augmented answers over local memory")]
struct Cli {
    /// Path to config file (optional)
    #[arg(short, long, default_value = "rage.toml")]
    config: PathBuf,

    /// Data directory (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Number of context documents to retrieve (overrides config)
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Sampling temperature (overrides config)
    #[arg(long)]
    temperature: Option<f32>,

    /// Text file to store as a document before answering (repeatable)
    #[arg(long, value_name = "FILE")]
    ingest: Vec<PathBuf>,

    /// Model backend
    #[arg(value_enum)]
    model: ModelArg,

    /// Question to answer
    query: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Groq,
    Ollama,
}

impl From<ModelArg> for LlmProvider {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Groq => LlmProvider::Groq,
            ModelArg::Ollama => LlmProvider::Ollama,
        }
    }
}

/// Key for `provider` from the environment. Groq also accepts `OPENAI_API_KEY`.
fn api_key_for(provider: LlmProvider) -> anyhow::Result<String> {
    api_key_from(provider, |name| std::env::var(name).ok())
}

/// First non-blank key among the names `provider` accepts.
fn api_key_from(
    provider: LlmProvider,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<String> {
    if !provider.requires_api_key() {
        return Ok(String::new());
    }
    ["GROQ_API_KEY", "OPENAI_API_KEY"]
        .into_iter()
        .filter_map(&lookup)
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("GROQ_API_KEY is not set; add it to the environment or .env"))
}

/// Store each file's text as a document and keep a copy in the upload area.
///
/// A file is only copied once it has been embedded and stored.
async fn ingest(
    memory: &MemoryManager,
    embedder: &dyn EmbeddingProvider,
    files: &[PathBuf],
) -> anyhow::Result<()> {
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name '{}'", path.display()))?;
        memory.uploads().check_name(name)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", path.display(), e))?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| anyhow::anyhow!("'{}' is not UTF-8 text: {}", path.display(), e))?;

        let embedding = embedder.embed(text).await?;
        memory.store_document(text, embedding).await?;
        let saved = memory.uploads().save(name, &bytes).await?;
        info!(file = %saved.display(), "Ingested document");
    }
    Ok(())
}

/// Message shown when answering fails.
fn answer_failure(e: &RageError) -> anyhow::Error {
    if e.is_http() {
        anyhow::anyhow!("Model request failed: {}", e)
    } else {
        anyhow::anyhow!("Could not answer: {}", e)
    }
}

fn data_dir(cli: &Cli, config: &RageConfig) -> PathBuf {
    cli.data_dir
        .clone()
        .unwrap_or_else(|| config.data_dir.clone())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env");
        }
    }

    let cli = Cli::parse();

    let config = RageConfig::load(&cli.config).await?;

    let provider = LlmProvider::from(cli.model);
    let api_key = api_key_for(provider)?;
    let mut model_config = config.model_config(provider, api_key);
    if let Some(temperature) = cli.temperature {
        model_config.temperature = temperature;
    }
    let top_k = cli.top_k.unwrap_or(config.top_k);
    let temperature = model_config.temperature;

    let memory = MemoryManager::shared(MemoryLayout::new(data_dir(&cli, &config))).await?;
    let embedder = LocalEmbedding::default();

    if !cli.ingest.is_empty() {
        ingest(&memory, &embedder, &cli.ingest).await?;
    }

    let client = ModelClient::new(model_config)?;
    let pipeline = RagPipeline::new(Arc::clone(&memory), client)
        .with_top_k(top_k)
        .with_temperature(temperature);

    let query_embedding = embedder.embed(&cli.query).await?;
    let outcome = pipeline
        .answer(&cli.query, &query_embedding)
        .await
        .map_err(|e| answer_failure(&e))?;

    println!("AI Response: {}", outcome.response);
    if !outcome.persisted {
        warn!("Response was not saved to the conversation log");
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_positionals_and_flags() {
        let cli = Cli::try_parse_from([
            "rage",
            "-k",
            "5",
            "--temperature",
            "0.2",
            "ollama",
            "what is rust?",
        ])
        .unwrap();
        assert!(matches!(cli.model, ModelArg::Ollama));
        assert_eq!(cli.query, "what is rust?");
        assert_eq!(cli.top_k, Some(5));
        assert!(cli.ingest.is_empty());
    }

    #[test]
    fn test_cli_rejects_unknown_model() {
        assert!(Cli::try_parse_from(["rage", "gpt", "hello"]).is_err());
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["rage", "groq"]).is_err());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        assert_eq!(api_key_for(LlmProvider::Ollama).unwrap(), "");
    }

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_groq_key_preferred_over_openai_key() {
        let env = env_of(&[("GROQ_API_KEY", "gsk-1"), ("OPENAI_API_KEY", "sk-2")]);
        assert_eq!(api_key_from(LlmProvider::Groq, env).unwrap(), "gsk-1");
    }

    #[test]
    fn test_blank_groq_key_falls_back_to_openai_key() {
        let env = env_of(&[("GROQ_API_KEY", ""), ("OPENAI_API_KEY", "sk-2")]);
        assert_eq!(api_key_from(LlmProvider::Groq, env).unwrap(), "sk-2");
        let env = env_of(&[("GROQ_API_KEY", "  "), ("OPENAI_API_KEY", "sk-3")]);
        assert_eq!(api_key_from(LlmProvider::Groq, env).unwrap(), "sk-3");
    }

    #[test]
    fn test_missing_groq_key_is_an_error() {
        let err = api_key_from(LlmProvider::Groq, env_of(&[("GROQ_API_KEY", "")])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
        assert!(api_key_from(LlmProvider::Groq, env_of(&[])).is_err());
    }

    #[test]
    fn test_answer_failure_names_model_errors() {
        let http = answer_failure(&RageError::Http("503".to_string()));
        assert_eq!(http.to_string(), "Model request failed: HTTP error: 503");
        let other = answer_failure(&RageError::Config("no key".to_string()));
        assert!(other.to_string().starts_with("Could not answer:"));
    }

    #[test]
    fn test_data_dir_flag_overrides_config() {
        let cli = Cli::try_parse_from(["rage", "--data-dir", "/tmp/x", "groq", "q"]).unwrap();
        assert_eq!(data_dir(&cli, &RageConfig::default()), PathBuf::from("/tmp/x"));
        let cli = Cli::try_parse_from(["rage", "groq", "q"]).unwrap();
        assert_eq!(data_dir(&cli, &RageConfig::default()), PathBuf::from("./data"));
    }

    #[tokio::test]
    async fn test_ingest_stores_and_uploads() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("notes.md");
        std::fs::write(&source, "rust ownership and borrowing").unwrap();

        let memory = MemoryManager::open(MemoryLayout::new(tmp.path().join("data")))
            .await
            .unwrap();
        let embedder = LocalEmbedding::new(16);
        ingest(&memory, &embedder, &[source]).await.unwrap();

        assert_eq!(memory.document_count().await, 1);
        assert_eq!(memory.dimension().await, Some(16));
        let uploads = memory.uploads().list().await.unwrap();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].ends_with("notes.md"));
    }

    #[tokio::test]
    async fn test_ingest_rejects_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("binary.exe");
        std::fs::write(&source, "MZ").unwrap();

        let memory = MemoryManager::open(MemoryLayout::new(tmp.path().join("data")))
            .await
            .unwrap();
        let result = ingest(&memory, &LocalEmbedding::new(8), &[source]).await;
        assert!(result.is_err());
        assert_eq!(memory.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_ingest_blank_file_leaves_no_upload() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("blank.txt");
        std::fs::write(&source, "  \n\t ").unwrap();

        let memory = MemoryManager::open(MemoryLayout::new(tmp.path().join("data")))
            .await
            .unwrap();
        let result = ingest(&memory, &LocalEmbedding::new(8), &[source]).await;
        assert!(result.is_err());
        assert_eq!(memory.document_count().await, 0);
        assert!(memory.uploads().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_non_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("latin1.txt");
        std::fs::write(&source, [b'c', b'a', b'f', 0xE9]).unwrap();

        let memory = MemoryManager::open(MemoryLayout::new(tmp.path().join("data")))
            .await
            .unwrap();
        let err = ingest(&memory, &LocalEmbedding::new(8), &[source])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
        assert_eq!(memory.document_count().await, 0);
        assert!(memory.uploads().list().await.unwrap().is_empty());
    }
}
