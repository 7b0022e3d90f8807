//! Error types for the analysis service client

use std::path::PathBuf;

use thiserror::Error;

use crate::upload::FieldErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Unexpected response body")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid upload {name}: {reason}")]
    InvalidFile { name: String, reason: String },

    #[error("Missing input: {0}")]
    MissingInput(FieldErrors),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
