use thiserror::Error;

/// A convenience `Result` alias using [`RageError`].
pub type RageResult<T> = Result<T, RageError>;

/// Top-level error type for RAGE.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Error, Debug)]
pub enum RageError {
    /// Storage initialization or persisted-state consistency failure.
    #[error("Memory error: {0}")]
    Memory(String),

    /// An embedding whose length differs from the store's fixed dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension fixed by the first stored document.
        expected: usize,
        /// Length of the rejected embedding.
        actual: usize,
    },

    /// Caller-supplied input that can never be accepted (empty content, bad file name).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An error from an outbound HTTP request (model backend call).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RageError {
    /// Whether this error came from the model/network boundary.
    pub fn is_http(&self) -> bool {
        matches!(self, RageError::Http(_))
    }
}
