//! Error types for report normalization
//!
//! Payload shape problems are never errors here: unrecognized shapes shrink
//! the output instead. These variants cover caller input and bundled data.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unknown change filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown report kind: {0}")]
    UnknownKind(String),

    #[error("Placeholder fixture is not valid JSON: {0}")]
    Fixture(#[from] serde_json::Error),
}
