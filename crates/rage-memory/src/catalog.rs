use rage_core::{RageError, RageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::persist::write_atomic;

/// A retrievable text unit and the embedding it was indexed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Ordered document payloads. Position `i` belongs to index vector `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentCatalog {
    entries: Vec<DocumentEntry>,
}

impl DocumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from persisted entries, rejecting empty content and
    /// mixed embedding dimensions.
    pub fn from_entries(entries: Vec<DocumentEntry>) -> RageResult<Self> {
        let dimension = entries.first().map(|e| e.embedding.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.content.is_empty() {
                return Err(RageError::Memory(format!(
                    "Catalog entry {} has empty content",
                    i
                )));
            }
            if Some(entry.embedding.len()) != dimension || entry.embedding.is_empty() {
                return Err(RageError::Memory(format!(
                    "Catalog entry {} has dimension {}, expected {}",
                    i,
                    entry.embedding.len(),
                    dimension.unwrap_or_default()
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension of the stored entries, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }

    pub fn get(&self, position: usize) -> Option<&DocumentEntry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[DocumentEntry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: DocumentEntry) {
        self.entries.push(entry);
    }

    pub async fn save(&self, path: &Path) -> RageResult<()> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        write_atomic(path, &json).await
    }

    pub async fn load(path: &Path) -> RageResult<Self> {
        let data = tokio::fs::read(path).await?;
        let entries: Vec<DocumentEntry> = serde_json::from_slice(&data)?;
        Self::from_entries(entries)
    }
}
