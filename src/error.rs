//! Error types for ifc-scene.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single load. Everything inside the parse pipeline
/// degrades per record instead of failing, so only the transport boundaries
/// can produce these.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A pre-structured payload could not be decoded.
    #[error("invalid scene payload: {source}")]
    Payload {
        #[from]
        source: serde_json::Error,
    },
}

/// Errors that can occur when exporting a scene.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to flush written output.
    #[error("failed to flush output: {source}")]
    Flush {
        #[from]
        source: std::io::Error,
    },

    /// Failed to serialize the scene to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV rows.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
