//! Observability events for idfkit
//!
//! Events are explicit and typed. Each maps to a stable upper-snake name
//! and a log level.

use std::fmt;

use tracing::Level;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// Dictionary parsed
    DictionaryLoaded,

    // Store operations
    /// Record validated and inserted
    RecordAdded,
    /// Record failed validation or a uniqueness check
    RecordRejected,
    /// Record removed
    RecordDeleted,
    /// Unique record overwritten
    RecordReplaced,
    /// Field value changed through the store
    FieldUpdated,
    /// Input key that matches no field of the record type
    InputIgnored,

    // Text I/O
    /// IDF text imported into a store
    ModelImported,
    /// Store written as IDF text
    ModelWritten,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DictionaryLoaded => "DICTIONARY_LOADED",
            Event::RecordAdded => "RECORD_ADDED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordReplaced => "RECORD_REPLACED",
            Event::FieldUpdated => "FIELD_UPDATED",
            Event::InputIgnored => "INPUT_IGNORED",
            Event::ModelImported => "MODEL_IMPORTED",
            Event::ModelWritten => "MODEL_WRITTEN",
        }
    }

    /// Per-record events are DEBUG, rejections WARN, lifecycle INFO.
    pub fn level(&self) -> Level {
        match self {
            Event::RecordRejected => Level::WARN,
            Event::RecordAdded
            | Event::RecordDeleted
            | Event::RecordReplaced
            | Event::FieldUpdated
            | Event::InputIgnored => Level::DEBUG,
            Event::ConfigLoaded
            | Event::DictionaryLoaded
            | Event::ModelImported
            | Event::ModelWritten => Level::INFO,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::DictionaryLoaded.as_str(), "DICTIONARY_LOADED");
        assert_eq!(Event::RecordRejected.to_string(), "RECORD_REJECTED");
    }

    #[test]
    fn test_event_levels() {
        assert_eq!(Event::RecordRejected.level(), Level::WARN);
        assert_eq!(Event::RecordAdded.level(), Level::DEBUG);
        assert_eq!(Event::ModelWritten.level(), Level::INFO);
    }
}
