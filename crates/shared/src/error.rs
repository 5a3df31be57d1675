use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start recognition program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("recognition engine i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("recognition engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("recognition engine returned no text")]
    EmptyOutput,
    #[error("recognition request failed: {0}")]
    Http(String),
    #[error("invalid recognition response: {0}")]
    InvalidResponse(String),
    #[error("unsupported engine configuration: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("system clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read clipboard: {0}")]
    Read(String),
    #[error("failed to write clipboard: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read image '{}': {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("failed to stage clipboard image: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to encode clipboard image as png: {0}")]
    ImageEncode(String),
}
