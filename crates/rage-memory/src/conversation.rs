use chrono::{DateTime, Utc};
use rage_core::RageResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

use crate::persist::write_atomic;

// ---------------------------------------------------------------------------
// ConversationEntry
// ---------------------------------------------------------------------------

/// One query/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// The whole log as persisted: `{"entries": [...]}` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationDocument {
    #[serde(default)]
    pub entries: Vec<ConversationEntry>,
}

// ---------------------------------------------------------------------------
// ConversationLog
// ---------------------------------------------------------------------------

/// Append-only conversation journal backed by a single JSON file.
///
/// Appends are serialized so concurrent callers never lose each other's
/// entries.
pub struct ConversationLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConversationLog {
    /// Open the log, creating an empty one if the file does not exist.
    pub async fn open(path: PathBuf) -> RageResult<Self> {
        if !path.exists() {
            let json = serde_json::to_vec_pretty(&ConversationDocument::default())?;
            write_atomic(&path, &json).await?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one exchange and rewrite the file.
    ///
    /// An unreadable log is replaced by a fresh one holding only this entry.
    pub async fn append(
        &self,
        query: impl Into<String>,
        response: impl Into<String>,
    ) -> RageResult<ConversationEntry> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.read_document().await;
        let now = Utc::now();
        // Keep file order and timestamp order in agreement if the clock steps back.
        let timestamp = doc
            .entries
            .last()
            .map_or(now, |last| now.max(last.timestamp));

        let entry = ConversationEntry {
            query: query.into(),
            response: response.into(),
            timestamp,
        };
        doc.entries.push(entry.clone());

        let json = serde_json::to_vec_pretty(&doc)?;
        write_atomic(&self.path, &json).await?;
        Ok(entry)
    }

    /// All entries in insertion order. Missing or corrupt logs read as empty.
    pub async fn entries(&self) -> Vec<ConversationEntry> {
        self.read_document().await.entries
    }

    async fn read_document(&self) -> ConversationDocument {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Conversation log unreadable, using empty log");
                return ConversationDocument::default();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Conversation log corrupt, using empty log");
                ConversationDocument::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
