//! Core error types.
//!
//! Decode and grading failures are typed so callers can tell corrupted
//! input (`InvalidDocument`) apart from recognized-but-unsupported formats
//! (`UnsupportedFormat`) and from contract violations (`ResourceMisuse`)
//! without string matching. Binary errors carry the file path and byte
//! offset; addendum errors carry the offending line.

use thiserror::Error;

/// Result alias used across the decode and grading paths.
pub type Result<T> = std::result::Result<T, GabError>;

/// Errors from Gab decoding, addendum application, and grading.
#[derive(Debug, Error)]
pub enum GabError {
    /// The input is a recognized older or foreign format that this reader
    /// deliberately does not parse (legacy magic, legacy student separator,
    /// unknown format tag).
    #[error("{path}:{offset:#x}: unsupported format: {reason}")]
    UnsupportedFormat {
        path: String,
        offset: u64,
        reason: String,
    },

    /// A structural or invariant violation in the binary document. Always
    /// fatal for the whole document; there is no partial acceptance.
    #[error("{path}:{offset:#x}: invalid document: {reason}")]
    InvalidDocument {
        path: String,
        offset: u64,
        reason: String,
    },

    /// A malformed addendum directive. Fatal for that addendum application.
    #[error("addendum line {line_no} ({line:?}): {reason}")]
    InvalidAddendum {
        line_no: usize,
        line: String,
        reason: String,
    },

    /// A programming-contract violation: reading from a closed source,
    /// re-reading the header, grading with mismatched lengths.
    #[error("resource misuse: {0}")]
    ResourceMisuse(String),

    /// No named test carries this student name.
    #[error("student not found in the answer-key document: {0}")]
    StudentNotFound(String),

    /// More than one named test carries this student name.
    #[error("more than one test for student: {0}")]
    AmbiguousStudent(String),

    /// An underlying I/O failure that is not a format problem.
    #[error("{path}: i/o error: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GabError {
    /// Returns `true` for errors that mean the document itself is corrupt,
    /// as opposed to unsupported, misused, or unreadable.
    pub fn is_invalid_document(&self) -> bool {
        matches!(self, GabError::InvalidDocument { .. })
    }
}
