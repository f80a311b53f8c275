//! One retrieval-augmented exchange: retrieve, generate, record.

use crate::config::DEFAULT_TEMPERATURE;
use crate::llm::ModelClient;
use rage_core::RageResult;
use rage_memory::{MemoryManager, DEFAULT_TOP_K};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of [`RagPipeline::answer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RagOutcome {
    pub response: String,
    /// Retrieved documents, closest first.
    pub context: Vec<String>,
    /// Whether the exchange reached the conversation log.
    pub persisted: bool,
}

pub struct RagPipeline {
    memory: Arc<MemoryManager>,
    client: ModelClient,
    top_k: usize,
    temperature: f32,
}

impl RagPipeline {
    pub fn new(memory: Arc<MemoryManager>, client: ModelClient) -> Self {
        Self {
            memory,
            client,
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }

    /// Answer `query` grounded on the documents nearest `query_embedding`.
    ///
    /// Retrieval failures degrade to an ungrounded answer. A model failure is
    /// returned and nothing is recorded. A failure to record is logged and
    /// reported through [`RagOutcome::persisted`].
    pub async fn answer(&self, query: &str, query_embedding: &[f32]) -> RageResult<RagOutcome> {
        let context = match self
            .memory
            .retrieve_context(query_embedding, self.top_k)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Context retrieval failed, answering without context");
                Vec::new()
            }
        };

        info!(
            backend = self.client.name(),
            context = context.len(),
            "Generating response"
        );
        let response = self
            .client
            .generate(query, &context, self.temperature)
            .await?;

        let persisted = self
            .memory
            .store_conversation(query, response.as_str())
            .await
            .is_ok();

        Ok(RagOutcome {
            response,
            context,
            persisted,
        })
    }
}
