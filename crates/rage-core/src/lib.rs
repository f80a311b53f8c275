//! Core error definitions for the RAGE workspace.
//!
//! Every crate in the workspace reports failures through [`RageError`], so a
//! caller can match on one enum regardless of which subsystem failed.
//!
//! # Main types
//!
//! - [`RageError`]: Unified error enum for memory, model, and config failures.
//! - [`RageResult`]: Convenience alias for `Result<T, RageError>`.

/// Error enum and result alias.
pub mod error;

pub use error::{RageError, RageResult};
