//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::io;

use thiserror::Error;

use crate::idf::IdfError;
use crate::model::ModelError;
use crate::schema::DictionaryError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Malformed JSON input line
    InputError,
    /// Dictionary could not be loaded
    DictionaryError,
    /// A record was rejected
    ModelError,
    /// Named record not present
    NotFound,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "IDF_CLI_CONFIG_ERROR",
            Self::IoError => "IDF_CLI_IO_ERROR",
            Self::InputError => "IDF_CLI_INPUT_ERROR",
            Self::DictionaryError => "IDF_CLI_DICTIONARY_ERROR",
            Self::ModelError => "IDF_CLI_MODEL_ERROR",
            Self::NotFound => "IDF_CLI_NOT_FOUND",
        }
    }
}

/// CLI error
#[derive(Debug, Error)]
#[error("{}: {message}", .code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Bad input line
    pub fn input_error(line: usize, msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, format!("line {}: {}", line, msg.into()))
    }

    /// Record not found
    pub fn not_found(name: &str) -> Self {
        Self::new(CliErrorCode::NotFound, format!("No record named '{}'", name))
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DictionaryError> for CliError {
    fn from(e: DictionaryError) -> Self {
        Self::new(CliErrorCode::DictionaryError, format!("{} [{}]", e, e.code()))
    }
}

impl From<ModelError> for CliError {
    fn from(e: ModelError) -> Self {
        Self::new(CliErrorCode::ModelError, format!("{} [{}]", e, e.code()))
    }
}

impl From<IdfError> for CliError {
    fn from(e: IdfError) -> Self {
        match e {
            IdfError::Dictionary(inner) => inner.into(),
            IdfError::Model(inner) => inner.into(),
            IdfError::Io { .. } | IdfError::Write(_) => Self::io_error(e.to_string()),
            IdfError::Record { .. } => {
                Self::new(CliErrorCode::ModelError, format!("{} [{}]", e, e.code()))
            }
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
