//! Dictionary error types
//!
//! Every dictionary error is fatal: a dictionary that fails to load aborts
//! model construction entirely.
//!
//! Error codes:
//! - IDF_DICTIONARY_IO
//! - IDF_UNKNOWN_DIRECTIVE
//! - IDF_MALFORMED_NUMBER
//! - IDF_MALFORMED_FIELD
//! - IDF_DIRECTIVE_OUTSIDE_OBJECT
//! - IDF_DIRECTIVE_OUTSIDE_FIELD
//! - IDF_DUPLICATE_FIELD
//! - IDF_INVALID_DEFAULT
//! - IDF_UNKNOWN_VERSION
//! - IDF_UNKNOWN_RECORD_TYPE

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for dictionary operations
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Errors raised while loading or querying a dictionary
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown directive '{directive}' at line {line} of '{source_name}'")]
    UnknownDirective {
        directive: String,
        line: usize,
        source_name: String,
    },

    #[error("Malformed number '{text}' for '{directive}' at line {line} of '{source_name}'")]
    MalformedNumber {
        directive: String,
        text: String,
        line: usize,
        source_name: String,
    },

    #[error("Malformed field definition at line {line} of '{source_name}': {reason}")]
    MalformedField {
        reason: String,
        line: usize,
        source_name: String,
    },

    #[error("Directive '{directive}' appears before any record type at line {line} of '{source_name}'")]
    DirectiveOutsideObject {
        directive: String,
        line: usize,
        source_name: String,
    },

    #[error("Field directive '{directive}' appears before any field at line {line} of '{source_name}'")]
    DirectiveOutsideField {
        directive: String,
        line: usize,
        source_name: String,
    },

    #[error("Field '{field}' is declared twice in '{record_type}'")]
    DuplicateField { record_type: String, field: String },

    #[error("Default '{default}' of field '{field}' in '{record_type}' is invalid: {reason}")]
    InvalidDefault {
        record_type: String,
        field: String,
        default: String,
        reason: String,
    },

    #[error("No dictionary available for version '{version}' (looked for '{path}')")]
    UnknownVersion { version: String, path: PathBuf },

    #[error("No such record type '{0}'")]
    UnknownRecordType(String),
}

impl DictionaryError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            DictionaryError::Io { .. } => "IDF_DICTIONARY_IO",
            DictionaryError::UnknownDirective { .. } => "IDF_UNKNOWN_DIRECTIVE",
            DictionaryError::MalformedNumber { .. } => "IDF_MALFORMED_NUMBER",
            DictionaryError::MalformedField { .. } => "IDF_MALFORMED_FIELD",
            DictionaryError::DirectiveOutsideObject { .. } => "IDF_DIRECTIVE_OUTSIDE_OBJECT",
            DictionaryError::DirectiveOutsideField { .. } => "IDF_DIRECTIVE_OUTSIDE_FIELD",
            DictionaryError::DuplicateField { .. } => "IDF_DUPLICATE_FIELD",
            DictionaryError::InvalidDefault { .. } => "IDF_INVALID_DEFAULT",
            DictionaryError::UnknownVersion { .. } => "IDF_UNKNOWN_VERSION",
            DictionaryError::UnknownRecordType(_) => "IDF_UNKNOWN_RECORD_TYPE",
        }
    }

    /// Lookup misses are reported to the caller; everything else aborts the load.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DictionaryError::UnknownRecordType(_))
    }
}
