//! Flat (exhaustive) nearest-neighbour index over fixed-dimension vectors.
//!
//! Vectors live in one contiguous buffer; ordinal `i` occupies
//! `data[i * dimension..(i + 1) * dimension]`. Search scans every vector, so
//! results are exact.

use rage_core::{RageError, RageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::persist::write_atomic;

const INDEX_MAGIC: [u8; 4] = *b"RAGX";
const INDEX_VERSION: u32 = 1;

/// Distance metric of an index. Only squared Euclidean is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    L2,
}

/// One search hit: the vector's ordinal and its squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    pub distance: f32,
}

/// Exhaustive squared-L2 index.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

/// On-disk form of the index.
#[derive(Serialize, Deserialize)]
struct IndexFile {
    magic: [u8; 4],
    version: u32,
    metric: Metric,
    dimension: u64,
    count: u64,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimension: usize) -> RageResult<Self> {
        if dimension == 0 {
            return Err(RageError::InvalidInput(
                "Index dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Build an index from vectors in ordinal order.
    pub fn from_vectors<'a, I>(dimension: usize, vectors: I) -> RageResult<Self>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut index = Self::new(dimension)?;
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        Metric::L2
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a vector, returning its ordinal.
    pub fn add(&mut self, vector: &[f32]) -> RageResult<usize> {
        self.check_query(vector)?;
        let ordinal = self.len();
        self.data.extend_from_slice(vector);
        Ok(ordinal)
    }

    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    /// The `k` nearest vectors to `query`, closest first. Equal distances
    /// keep ordinal order.
    pub fn search(&self, query: &[f32], k: usize) -> RageResult<Vec<Neighbor>> {
        self.check_query(query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .vectors()
            .enumerate()
            .map(|(ordinal, v)| Neighbor {
                ordinal,
                distance: squared_l2(query, v),
            })
            .collect();

        // Stable sort keeps lower ordinals first among ties.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn check_query(&self, vector: &[f32]) -> RageResult<()> {
        if vector.len() != self.dimension {
            return Err(RageError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(RageError::InvalidInput(
                "Vector contains NaN or infinite components".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> RageResult<Vec<u8>> {
        let file = IndexFile {
            magic: INDEX_MAGIC,
            version: INDEX_VERSION,
            metric: Metric::L2,
            dimension: self.dimension as u64,
            count: self.len() as u64,
            data: self.data.clone(),
        };
        bincode::serialize(&file)
            .map_err(|e| RageError::Memory(format!("Failed to encode index: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> RageResult<Self> {
        let file: IndexFile = bincode::deserialize(bytes)
            .map_err(|e| RageError::Memory(format!("Failed to decode index: {}", e)))?;

        if file.magic != INDEX_MAGIC {
            return Err(RageError::Memory("Not a vector index file".to_string()));
        }
        if file.version != INDEX_VERSION {
            return Err(RageError::Memory(format!(
                "Unsupported index version {}",
                file.version
            )));
        }
        let dimension = usize::try_from(file.dimension)
            .map_err(|_| RageError::Memory("Index dimension out of range".to_string()))?;
        let count = usize::try_from(file.count)
            .map_err(|_| RageError::Memory("Index count out of range".to_string()))?;
        if dimension == 0 || dimension.checked_mul(count) != Some(file.data.len()) {
            return Err(RageError::Memory(format!(
                "Index header ({} x {}) does not match {} stored values",
                count,
                dimension,
                file.data.len()
            )));
        }

        Ok(Self {
            dimension,
            data: file.data,
        })
    }

    pub async fn save(&self, path: &Path) -> RageResult<()> {
        let bytes = self.to_bytes()?;
        write_atomic(path, &bytes).await
    }

    pub async fn load(path: &Path) -> RageResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(&bytes)
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
