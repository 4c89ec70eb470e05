//! Domain error types
//!
//! This module defines the error hierarchy for Healthport. Load failures are fatal to the
//! category being exported, field extraction failures are scoped to a single clinical
//! observation, and write failures surface from the tabular writer.
//! None of these types expose the XML or CSV crates' error types.

use std::path::PathBuf;
use thiserror::Error;

/// Main Healthport error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum HealthportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input document could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Output table could not be written
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Document loading errors
///
/// Fatal to the category that requested the document. Nothing is written for that category.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file does not exist
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Input file exists but could not be read
    #[error("Failed to read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// Input file is not well-formed markup
    #[error("Malformed document {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    /// Path of the document that failed to load
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound(path) => path,
            LoadError::Unreadable { path, .. } | LoadError::Malformed { path, .. } => path,
        }
    }
}

/// Tabular writer errors
#[derive(Debug, Error)]
pub enum WriteError {
    /// Output file could not be created, written or moved into place
    #[error("Failed to write {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// CSV encoding failed
    #[error("CSV encoding failed for {}: {reason}", path.display())]
    Encoding { path: PathBuf, reason: String },

    /// A record does not have the same columns as the header
    #[error("Record {index} has columns {found:?}, expected {expected:?}")]
    ColumnMismatch {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Failure while extracting the fields of one clinical observation
///
/// Recoverable: the observation is skipped and extraction continues with the next component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observation #{ordinal} field '{field}': {reason}")]
pub struct FieldExtractionError {
    /// 1-based position of the component in document order
    pub ordinal: usize,

    /// Output field that could not be computed
    pub field: String,

    /// Short cause
    pub reason: String,
}

impl FieldExtractionError {
    /// Creates a new field extraction error
    pub fn new(ordinal: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ordinal,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HealthportError {
    fn from(err: std::io::Error) -> Self {
        HealthportError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HealthportError {
    fn from(err: toml::de::Error) -> Self {
        HealthportError::Configuration(format!("TOML parse error: {err}"))
    }
}
