//! Memory manager: owns both memory tiers behind one handle.
//!
//! [`MemoryManager::open`] builds a private instance. [`MemoryManager::shared`]
//! is the process-wide accessor: every call for the same base directory
//! returns the same `Arc`, so a document stored by one caller is visible to
//! every other caller in the process.

use once_cell::sync::Lazy;
use rage_core::{RageError, RageResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::conversation::{ConversationEntry, ConversationLog};
use crate::layout::MemoryLayout;
use crate::store::{LongTermMemory, SearchHit};
use crate::uploads::ContextUploads;

/// Number of documents retrieved when the caller does not choose.
pub const DEFAULT_TOP_K: usize = 3;

static SHARED: Lazy<Mutex<HashMap<PathBuf, Arc<MemoryManager>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Unified memory manager.
pub struct MemoryManager {
    layout: MemoryLayout,
    long_term: RwLock<LongTermMemory>,
    conversations: ConversationLog,
    uploads: ContextUploads,
}

impl MemoryManager {
    /// Initialize storage under `layout` and load any persisted state.
    ///
    /// Fails only when the directories or the empty conversation log cannot
    /// be created. Unreadable long-term memory is discarded and logged.
    pub async fn open(layout: MemoryLayout) -> RageResult<Self> {
        for dir in [layout.knowledge_dir(), layout.conversations_dir()] {
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                RageError::Memory(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let conversation_path = layout.conversation_path();
        let conversations = ConversationLog::open(conversation_path.clone())
            .await
            .map_err(|e| {
                RageError::Memory(format!(
                    "Failed to initialize {}: {}",
                    conversation_path.display(),
                    e
                ))
            })?;

        let long_term = LongTermMemory::load(layout.index_path(), layout.catalog_path()).await;
        let uploads = ContextUploads::new(layout.context_dir());

        info!(
            base_dir = %layout.base_dir().display(),
            documents = long_term.len(),
            dimension = long_term.dimension(),
            "Memory system initialized"
        );

        Ok(Self {
            layout,
            long_term: RwLock::new(long_term),
            conversations,
            uploads,
        })
    }

    /// The process-wide instance for `layout`'s base directory.
    ///
    /// The first call opens the store; later calls return the same instance
    /// without touching the disk again.
    pub async fn shared(layout: MemoryLayout) -> RageResult<Arc<Self>> {
        let key = registry_key(layout.base_dir()).await?;

        let mut shared = SHARED.lock().await;
        if let Some(existing) = shared.get(&key) {
            return Ok(Arc::clone(existing));
        }

        let manager = Arc::new(Self::open(layout).await?);
        shared.insert(key, Arc::clone(&manager));
        Ok(manager)
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    pub fn uploads(&self) -> &ContextUploads {
        &self.uploads
    }

    /// Store a document in long-term memory.
    ///
    /// Dimension mismatches and empty input fail without changing anything.
    /// A write failure leaves the document in memory but maybe not on disk.
    pub async fn store_document(
        &self,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) -> RageResult<()> {
        let mut long_term = self.long_term.write().await;
        match long_term.store_document(content.into(), embedding).await {
            Ok(ordinal) => {
                info!(ordinal, documents = long_term.len(), "Stored document");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to store document");
                Err(e)
            }
        }
    }

    /// Contents of the `k` documents nearest to `query_embedding`, closest
    /// first. An empty store yields an empty list.
    pub async fn retrieve_context(
        &self,
        query_embedding: &[f32],
        k: usize,
    ) -> RageResult<Vec<String>> {
        self.long_term
            .read()
            .await
            .retrieve_context(query_embedding, k)
    }

    /// Like [`retrieve_context`](Self::retrieve_context) but keeps ordinals
    /// and distances.
    pub async fn search(&self, query_embedding: &[f32], k: usize) -> RageResult<Vec<SearchHit>> {
        self.long_term.read().await.search(query_embedding, k)
    }

    /// Append an exchange to the conversation log.
    pub async fn store_conversation(
        &self,
        query: impl Into<String>,
        response: impl Into<String>,
    ) -> RageResult<()> {
        match self.conversations.append(query, response).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    path = %self.conversations.path().display(),
                    error = %e,
                    "Failed to store conversation"
                );
                Err(e)
            }
        }
    }

    pub async fn conversation_history(&self) -> Vec<ConversationEntry> {
        self.conversations.entries().await
    }

    pub async fn document_count(&self) -> usize {
        self.long_term.read().await.len()
    }

    /// Embedding dimension, fixed by the first stored document.
    pub async fn dimension(&self) -> Option<usize> {
        self.long_term.read().await.dimension()
    }

    /// Run `f` against a consistent view of long-term memory.
    pub async fn with_long_term<R>(&self, f: impl FnOnce(&LongTermMemory) -> R) -> R {
        let long_term = self.long_term.read().await;
        f(&long_term)
    }
}

async fn registry_key(base_dir: &Path) -> RageResult<PathBuf> {
    tokio::fs::create_dir_all(base_dir).await.map_err(|e| {
        RageError::Memory(format!("Failed to create {}: {}", base_dir.display(), e))
    })?;
    Ok(tokio::fs::canonicalize(base_dir).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = MemoryLayout::new(tmp.path().join("data"));
        let manager = MemoryManager::open(layout.clone()).await.unwrap();

        assert!(layout.knowledge_dir().is_dir());
        assert!(layout.conversations_dir().is_dir());
        assert!(layout.conversation_path().is_file());
        assert_eq!(manager.document_count().await, 0);
        assert_eq!(manager.dimension().await, None);
    }

    #[tokio::test]
    async fn test_open_fails_when_base_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("data");
        tokio::fs::write(&base, b"not a directory").await.unwrap();

        let result = MemoryManager::open(MemoryLayout::new(base)).await;
        assert!(matches!(result, Err(RageError::Memory(_))));
    }

    #[tokio::test]
    async fn test_shared_returns_same_instance() {
        let tmp = tempfile::tempdir().unwrap();
        let a = MemoryManager::shared(MemoryLayout::new(tmp.path()))
            .await
            .unwrap();
        let b = MemoryManager::shared(MemoryLayout::new(tmp.path().join(".")))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_shared_distinguishes_base_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let a = MemoryManager::shared(MemoryLayout::new(tmp.path().join("a")))
            .await
            .unwrap();
        let b = MemoryManager::shared(MemoryLayout::new(tmp.path().join("b")))
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_failed_store_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let manager = MemoryManager::open(MemoryLayout::new(tmp.path()))
            .await
            .unwrap();
        manager.store_document("a", vec![1.0, 2.0]).await.unwrap();

        let err = manager.store_document("b", vec![1.0]).await.unwrap_err();
        assert!(matches!(err, RageError::DimensionMismatch { .. }));
        assert_eq!(manager.document_count().await, 1);
    }
}
