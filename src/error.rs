use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a `tokenizer.json` artifact.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read tokenizer file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tokenizer JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed tokenizer artifact: {0}")]
    Malformed(String),
}

impl LoadError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        LoadError::Malformed(msg.into())
    }
}
