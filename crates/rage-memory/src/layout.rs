use std::path::{Path, PathBuf};

/// Long-term memory directory under the base data directory.
pub const KNOWLEDGE_DIR: &str = "knowledge";
/// Short-term memory directory under the base data directory.
pub const CONVERSATIONS_DIR: &str = "conversations";
/// Upload directory under [`CONVERSATIONS_DIR`].
pub const CONTEXT_DIR: &str = "context";
/// Binary vector index file name.
pub const INDEX_FILE: &str = "faiss_index.bin";
/// Document catalog file name.
pub const CATALOG_FILE: &str = "documents.json";
/// Conversation log file name.
pub const CONVERSATION_FILE: &str = "conversation.json";

/// Paths of every persisted memory file, derived from one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLayout {
    base_dir: PathBuf,
}

impl MemoryLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn knowledge_dir(&self) -> PathBuf {
        self.base_dir.join(KNOWLEDGE_DIR)
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.base_dir.join(CONVERSATIONS_DIR)
    }

    pub fn context_dir(&self) -> PathBuf {
        self.conversations_dir().join(CONTEXT_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.knowledge_dir().join(INDEX_FILE)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.knowledge_dir().join(CATALOG_FILE)
    }

    pub fn conversation_path(&self) -> PathBuf {
        self.conversations_dir().join(CONVERSATION_FILE)
    }
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self::new("./data")
    }
}
