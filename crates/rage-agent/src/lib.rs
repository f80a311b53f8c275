//! Model backends and the retrieval-augmented answer pipeline.
//!
//! # Main types
//!
//! - [`ModelConfig`] / [`LlmProvider`]: Which backend to call and how.
//! - [`ModelBackend`]: Trait every provider implements.
//! - [`ModelClient`]: Dispatches to the configured backend.
//! - [`RagPipeline`]: Retrieve, generate, and record one exchange.

pub mod backends;
pub mod config;
pub mod llm;
pub mod pipeline;

pub use backends::{build_prompt, ModelBackend};
pub use config::{LlmProvider, ModelConfig, DEFAULT_TEMPERATURE};
pub use llm::ModelClient;
pub use pipeline::{RagOutcome, RagPipeline};
