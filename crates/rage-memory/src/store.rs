use rage_core::{RageError, RageResult};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::{DocumentCatalog, DocumentEntry};
use crate::index::FlatL2Index;

/// A retrieved document with its ordinal and squared L2 distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub ordinal: usize,
    pub distance: f32,
    pub content: String,
}

/// Vector index and document catalog kept as one consistent unit.
///
/// The index is `None` until the first document fixes the dimension.
/// For every ordinal `i`, `catalog[i].embedding` equals index vector `i`.
pub struct LongTermMemory {
    index_path: PathBuf,
    catalog_path: PathBuf,
    index: Option<FlatL2Index>,
    catalog: DocumentCatalog,
}

impl LongTermMemory {
    /// An empty store that will persist to the given pair of files.
    pub fn empty(index_path: PathBuf, catalog_path: PathBuf) -> Self {
        Self {
            index_path,
            catalog_path,
            index: None,
            catalog: DocumentCatalog::new(),
        }
    }

    /// Restore from disk. Never fails: when the pair is missing, incomplete,
    /// or unreadable the store starts empty and the reason is logged.
    pub async fn load(index_path: PathBuf, catalog_path: PathBuf) -> Self {
        let index_present = index_path.exists();
        let catalog_present = catalog_path.exists();

        match (index_present, catalog_present) {
            (false, false) => {
                debug!(path = %catalog_path.display(), "No persisted long-term memory");
                Self::empty(index_path, catalog_path)
            }
            (true, true) => {
                let loaded = load_pair(&index_path, &catalog_path).await;
                match loaded {
                    Ok((index, catalog)) => Self {
                        index_path,
                        catalog_path,
                        index,
                        catalog,
                    },
                    Err(e) => {
                        warn!(
                            index = %index_path.display(),
                            catalog = %catalog_path.display(),
                            error = %e,
                            "Discarding unreadable long-term memory, starting empty"
                        );
                        Self::empty(index_path, catalog_path)
                    }
                }
            }
            _ => {
                warn!(
                    index_present,
                    catalog_present,
                    "Long-term memory pair is incomplete, starting empty"
                );
                Self::empty(index_path, catalog_path)
            }
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Dimension fixed by the first stored document.
    pub fn dimension(&self) -> Option<usize> {
        self.index.as_ref().map(FlatL2Index::dimension)
    }

    pub fn index(&self) -> Option<&FlatL2Index> {
        self.index.as_ref()
    }

    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    /// Check a candidate document without touching any state.
    pub fn validate(&self, content: &str, embedding: &[f32]) -> RageResult<()> {
        if content.is_empty() {
            return Err(RageError::InvalidInput(
                "Document content must not be empty".to_string(),
            ));
        }
        if embedding.is_empty() {
            return Err(RageError::InvalidInput(
                "Document embedding must not be empty".to_string(),
            ));
        }
        if let Some(expected) = self.dimension() {
            if embedding.len() != expected {
                return Err(RageError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(RageError::InvalidInput(
                "Document embedding contains NaN or infinite components".to_string(),
            ));
        }
        Ok(())
    }

    /// Append a document and persist index then catalog.
    ///
    /// Invalid input is rejected before any mutation. A write failure is
    /// returned after the in-memory state already holds the new document.
    pub async fn store_document(
        &mut self,
        content: String,
        embedding: Vec<f32>,
    ) -> RageResult<usize> {
        self.validate(&content, &embedding)?;

        let ordinal = match self.index.as_mut() {
            Some(index) => index.add(&embedding)?,
            None => {
                let mut index = FlatL2Index::new(embedding.len())?;
                let ordinal = index.add(&embedding)?;
                self.index = Some(index);
                ordinal
            }
        };
        self.catalog.push(DocumentEntry { content, embedding });

        self.persist().await?;
        Ok(ordinal)
    }

    /// Nearest documents to `query`, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> RageResult<Vec<SearchHit>> {
        let Some(index) = self.index.as_ref() else {
            return Ok(Vec::new());
        };
        if self.catalog.is_empty() {
            return Ok(Vec::new());
        }

        let hits = index
            .search(query, k)?
            .into_iter()
            .filter_map(|n| {
                self.catalog.get(n.ordinal).map(|doc| SearchHit {
                    ordinal: n.ordinal,
                    distance: n.distance,
                    content: doc.content.clone(),
                })
            })
            .collect();
        Ok(hits)
    }

    /// Contents of the `k` nearest documents, closest first.
    pub fn retrieve_context(&self, query: &[f32], k: usize) -> RageResult<Vec<String>> {
        Ok(self
            .search(query, k)?
            .into_iter()
            .map(|hit| hit.content)
            .collect())
    }

    async fn persist(&self) -> RageResult<()> {
        if let Some(index) = &self.index {
            index.save(&self.index_path).await?;
        }
        self.catalog.save(&self.catalog_path).await
    }
}

/// Load both files, keeping the catalog as the reference. A stale or
/// mismatched index is rebuilt from the catalog embeddings.
async fn load_pair(
    index_path: &Path,
    catalog_path: &Path,
) -> RageResult<(Option<FlatL2Index>, DocumentCatalog)> {
    let index = FlatL2Index::load(index_path).await?;
    let catalog = DocumentCatalog::load(catalog_path).await?;

    let Some(dimension) = catalog.dimension() else {
        if !index.is_empty() {
            warn!(
                vectors = index.len(),
                "Index has vectors but catalog is empty, dropping index"
            );
        }
        return Ok((None, catalog));
    };

    let aligned = index.dimension() == dimension
        && index.len() == catalog.len()
        && index
            .vectors()
            .zip(catalog.entries())
            .all(|(v, doc)| v == doc.embedding.as_slice());

    let index = if aligned {
        index
    } else {
        warn!(
            index_vectors = index.len(),
            index_dimension = index.dimension(),
            catalog_documents = catalog.len(),
            catalog_dimension = dimension,
            "Index disagrees with catalog, rebuilding index from catalog"
        );
        FlatL2Index::from_vectors(
            dimension,
            catalog.entries().iter().map(|doc| doc.embedding.as_slice()),
        )?
    };

    debug!(documents = catalog.len(), dimension, "Loaded long-term memory");
    Ok((Some(index), catalog))
}
