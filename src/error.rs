//! # Error Types
//!
//! This module defines error types used throughout the pozform library.
//!
//! Most engine paths degrade silently by design (a missing optional
//! section simply never binds); errors here cover the cases where an
//! operation must abort without mutating state, plus the I/O edge of
//! the CLI.

use thiserror::Error;

/// Main error type for pozform operations
#[derive(Debug, Error)]
pub enum PozformError {
    /// No row group registered under this prefix
    #[error("Unknown row group: {0}")]
    UnknownGroup(String),

    /// Row template absent for a group that was asked to add a row
    #[error("No row template for group: {0}")]
    TemplateMissing(String),

    /// Row template instantiation yielded no row element
    #[error("Row template for group {0} produced no row")]
    TemplateEmpty(String),

    /// A node id is already taken in the document
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// An expected node is absent from the document
    #[error("Missing node: {0}")]
    MissingNode(String),

    /// Document failed structural validation
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
