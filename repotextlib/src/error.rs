//! Error types for repotextlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while flattening a repository
#[derive(Error, Debug)]
pub enum RepotextError {
    /// Failed to read a located ignore file
    #[error("failed to read ignore file '{path}': {source}")]
    IgnoreFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read the preamble file
    #[error("failed to read preamble file '{path}': {source}")]
    PreambleRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a repository file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory traversal failed
    #[error("failed to walk repository: {0}")]
    Walk(#[from] walkdir::Error),

    /// Failed to create the output file
    #[error("failed to create output file '{path}': {source}")]
    OutputCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write to the output sink
    #[error("failed to write output: {0}")]
    OutputWrite(#[source] std::io::Error),

    /// Could not determine where the running executable lives
    #[error("failed to resolve executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),
}
