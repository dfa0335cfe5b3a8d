//! Error types shared by the reader, the translators and the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or parsing a subtitle file.
#[derive(Error, Debug)]
pub enum SrtError {
    #[error("subtitle file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid {encoding}")]
    Encoding { path: PathBuf, encoding: &'static str },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Failure of a single translation call. Never fatal for a run.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Response(String),

    #[error("text length {0} is not below the 5000 character limit")]
    InvalidLength(usize),

    #[error("model error: {0}")]
    Model(String),
}

/// Fatal errors of a whole translation run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Srt(#[from] SrtError),

    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
