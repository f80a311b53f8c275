//! Long-term and short-term memory for the RAGE assistant.
//!
//! Long-term memory is a flat L2 vector index kept position-aligned with a
//! JSON document catalog. Short-term memory is an append-only conversation
//! log. [`MemoryManager`] owns both and is the only type callers need.
//!
//! # Main types
//!
//! - [`MemoryManager`]: Façade over both memory tiers, shareable per process.
//! - [`MemoryLayout`]: On-disk paths under the base data directory.
//! - [`FlatL2Index`]: Exhaustive squared-Euclidean nearest-neighbour index.
//! - [`DocumentCatalog`]: Ordered document payloads, one per index vector.
//! - [`LongTermMemory`]: Index and catalog kept in lockstep.
//! - [`ConversationLog`]: Append-only query/response journal.
//! - [`ContextUploads`]: Raw storage for uploaded context files.
//! - [`EmbeddingProvider`] / [`LocalEmbedding`]: Text embedding for callers.

/// Document catalog and its JSON persistence.
pub mod catalog;
/// Conversation log (short-term memory).
pub mod conversation;
/// Embedding provider trait and local hashing implementation.
pub mod embedding;
/// Flat L2 vector index and its binary persistence.
pub mod index;
/// Storage directory layout.
pub mod layout;
/// Memory manager façade and process-wide sharing.
pub mod manager;
mod persist;
/// Long-term memory: index and catalog as one unit.
pub mod store;
/// Upload side channel for raw context files.
pub mod uploads;

pub use catalog::{DocumentCatalog, DocumentEntry};
pub use conversation::{ConversationDocument, ConversationEntry, ConversationLog};
pub use embedding::{EmbeddingProvider, LocalEmbedding};
pub use index::{FlatL2Index, Metric, Neighbor};
pub use layout::MemoryLayout;
pub use manager::{MemoryManager, DEFAULT_TOP_K};
pub use store::{LongTermMemory, SearchHit};
pub use uploads::ContextUploads;
