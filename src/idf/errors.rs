//! IDF text I/O errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;
use crate::schema::DictionaryError;

/// Result type for IDF reading and writing
pub type IdfResult<T> = Result<T, IdfError>;

#[derive(Debug, Error)]
pub enum IdfError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write IDF output: {0}")]
    Write(#[from] io::Error),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// A record of a bulk import failed; the import stopped there.
    #[error("Record #{ordinal} ('{record_type}'): {source}")]
    Record {
        ordinal: usize,
        record_type: String,
        #[source]
        source: ModelError,
    },
}

impl IdfError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IdfError::Io { .. } => "IDF_IO",
            IdfError::Write(_) => "IDF_WRITE",
            IdfError::Dictionary(e) => e.code(),
            IdfError::Model(e) => e.code(),
            IdfError::Record { source, .. } => source.code(),
        }
    }

    /// The model error behind this failure, if any.
    pub fn model_error(&self) -> Option<&ModelError> {
        match self {
            IdfError::Model(e) => Some(e),
            IdfError::Record { source, .. } => Some(source),
            _ => None,
        }
    }
}
