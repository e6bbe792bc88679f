//! Model error types
//!
//! Every error is raised before the store is touched: a failed `add` leaves
//! the store exactly as it was.
//!
//! Error codes:
//! - IDF_UNKNOWN_RECORD_TYPE
//! - IDF_UNKNOWN_FIELD
//! - IDF_MISSING_REQUIRED_FIELD
//! - IDF_TYPE_MISMATCH
//! - IDF_OUT_OF_RANGE
//! - IDF_INVALID_CHOICE
//! - IDF_INVALID_TEXT
//! - IDF_DUPLICATE_UNIQUE_RECORD
//! - IDF_DUPLICATE_NAME
//! - IDF_NOT_UNIQUE_TYPE
//! - IDF_RECORD_NOT_FOUND
//! - IDF_TOO_MANY_VALUES
//! - IDF_FOREIGN_SCHEMA
//! - IDF_MISSING_VALUE_AT_RENDER (internal invariant)

use thiserror::Error;

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while instantiating, storing or rendering records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("No such record type '{0}'")]
    UnknownRecordType(String),

    #[error("Record type '{record_type}' has no field '{field}'")]
    UnknownField { record_type: String, field: String },

    #[error("Required field '{field}' not found when creating '{record_type}'")]
    MissingRequiredField { record_type: String, field: String },

    #[error("Expected a {expected} value for '{field}' in '{record_type}', but got {actual}")]
    TypeMismatch {
        record_type: String,
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Value {value} for '{field}' in '{record_type}' is out of range {range}")]
    OutOfRange {
        record_type: String,
        field: String,
        value: f64,
        range: String,
    },

    #[error("Value '{value}' for choice field '{field}' in '{record_type}' is not one of [{}]", .choices.join(", "))]
    InvalidChoice {
        record_type: String,
        field: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Text '{value}' for '{field}' in '{record_type}' is empty or contains a field delimiter (',', ';', '!' or a line break)")]
    InvalidText {
        record_type: String,
        field: String,
        value: String,
    },

    #[error("Record type '{record_type}' is unique and already present")]
    DuplicateUniqueRecord { record_type: String },

    #[error("A '{record_type}' called '{name}' already exists")]
    DuplicateName { record_type: String, name: String },

    #[error("Record type '{record_type}' is not unique")]
    NotUniqueType { record_type: String },

    #[error("No '{record_type}' called '{name}'")]
    RecordNotFound { record_type: String, name: String },

    #[error("'{record_type}' takes at most {max} values, got {count}")]
    TooManyValues {
        record_type: String,
        count: usize,
        max: usize,
    },

    #[error("Record of type '{record_type}' was built from a different dictionary")]
    ForeignSchema { record_type: String },

    #[error("No value and no default for required field '{field}' of '{record_type}'")]
    MissingValueAtRender { record_type: String, field: String },
}

impl ModelError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnknownRecordType(_) => "IDF_UNKNOWN_RECORD_TYPE",
            ModelError::UnknownField { .. } => "IDF_UNKNOWN_FIELD",
            ModelError::MissingRequiredField { .. } => "IDF_MISSING_REQUIRED_FIELD",
            ModelError::TypeMismatch { .. } => "IDF_TYPE_MISMATCH",
            ModelError::OutOfRange { .. } => "IDF_OUT_OF_RANGE",
            ModelError::InvalidChoice { .. } => "IDF_INVALID_CHOICE",
            ModelError::InvalidText { .. } => "IDF_INVALID_TEXT",
            ModelError::DuplicateUniqueRecord { .. } => "IDF_DUPLICATE_UNIQUE_RECORD",
            ModelError::DuplicateName { .. } => "IDF_DUPLICATE_NAME",
            ModelError::NotUniqueType { .. } => "IDF_NOT_UNIQUE_TYPE",
            ModelError::RecordNotFound { .. } => "IDF_RECORD_NOT_FOUND",
            ModelError::TooManyValues { .. } => "IDF_TOO_MANY_VALUES",
            ModelError::ForeignSchema { .. } => "IDF_FOREIGN_SCHEMA",
            ModelError::MissingValueAtRender { .. } => "IDF_MISSING_VALUE_AT_RENDER",
        }
    }

    /// Only a broken internal invariant is fatal; everything else rejects
    /// the single operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModelError::MissingValueAtRender { .. })
    }
}

/// Formats optional bounds as an interval, e.g. `[0, 10000]` or `[1, ∞)`.
pub(crate) fn format_range(minimum: Option<f64>, maximum: Option<f64>) -> String {
    let low = match minimum {
        Some(min) => format!("[{}", min),
        None => "(-∞".to_string(),
    };
    let high = match maximum {
        Some(max) => format!("{}]", max),
        None => "∞)".to_string(),
    };
    format!("{}, {}", low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(Some(0.0), Some(10000.0)), "[0, 10000]");
        assert_eq!(format_range(Some(1.0), None), "[1, ∞)");
        assert_eq!(format_range(None, Some(2.5)), "(-∞, 2.5]");
    }

    #[test]
    fn test_invalid_choice_lists_keys() {
        let err = ModelError::InvalidChoice {
            record_type: "Material".into(),
            field: "Roughness".into(),
            value: "Bumpy".into(),
            choices: vec!["Rough".into(), "Smooth".into()],
        };
        let display = err.to_string();
        assert!(display.contains("Bumpy"));
        assert!(display.contains("[Rough, Smooth]"));
        assert_eq!(err.code(), "IDF_INVALID_CHOICE");
    }

    #[test]
    fn test_only_render_invariant_is_fatal() {
        let render = ModelError::MissingValueAtRender {
            record_type: "Zone".into(),
            field: "Name".into(),
        };
        assert!(render.is_fatal());

        let duplicate = ModelError::DuplicateName {
            record_type: "Zone".into(),
            name: "Zone 1".into(),
        };
        assert!(!duplicate.is_fatal());
        assert_eq!(duplicate.to_string(), "A 'Zone' called 'Zone 1' already exists");
    }
}
