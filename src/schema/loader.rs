//! Dictionary registry and loader
//!
//! Dictionaries are stored one file per version:
//! `<dictionary_dir>/<major>.<minor>.<patch>.idd`. A missing file is fatal.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::{DictionaryError, DictionaryResult};
use super::names::TypeName;
use super::parser::parse_dictionary;
use super::types::RecordSchema;
use crate::observability::{log_event_with_fields, Event};

/// All record types of one dictionary version, keyed case-insensitively.
///
/// Schemas are shared with the records instantiated from them and are never
/// mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    schemas: HashMap<TypeName, Arc<RecordSchema>>,
    /// Declaration order
    order: Vec<TypeName>,
}

impl Dictionary {
    /// Builds a dictionary from already parsed schemas. A later definition of
    /// the same type replaces the earlier one.
    pub fn from_schemas(schemas: impl IntoIterator<Item = RecordSchema>) -> Self {
        let mut dict = Dictionary::default();
        for schema in schemas {
            let name = schema.name.clone();
            if dict.schemas.insert(name.clone(), Arc::new(schema)).is_none() {
                dict.order.push(name);
            } else {
                tracing::warn!(record_type = %name, "record type defined twice; keeping the last definition");
            }
        }
        dict
    }

    /// Gets a schema by type name, ignoring case.
    pub fn get(&self, type_name: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(type_name.trim().to_lowercase().as_str())
    }

    /// Like [`Dictionary::get`], but a miss is an error.
    pub fn require(&self, type_name: &str) -> DictionaryResult<&Arc<RecordSchema>> {
        self.get(type_name)
            .ok_or_else(|| DictionaryError::UnknownRecordType(type_name.trim().to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    /// Type names in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.order.iter()
    }

    /// Schemas in declaration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<RecordSchema>> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    /// Type names containing `query`, ignoring case.
    pub fn find(&self, query: &str) -> Vec<&TypeName> {
        let query = query.trim().to_lowercase();
        self.order.iter().filter(|name| name.key().contains(&query)).collect()
    }

    /// Types of which every model needs at least one instance.
    pub fn required_types(&self) -> Vec<&TypeName> {
        self.schemas().filter(|s| s.required).map(|s| &s.name).collect()
    }

    /// Help text for one type.
    pub fn describe(&self, type_name: &str) -> DictionaryResult<Vec<String>> {
        Ok(self.require(type_name)?.help_lines())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Reads and parses a single dictionary file.
pub fn load_dictionary(path: &Path) -> DictionaryResult<Dictionary> {
    let text = fs::read_to_string(path).map_err(|e| DictionaryError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let source_name = path.display().to_string();
    let dict = parse_dictionary(&text, &source_name)?;

    log_event_with_fields(
        Event::DictionaryLoaded,
        &[
            ("path", source_name.as_str()),
            ("record_types", dict.len().to_string().as_str()),
        ],
    );
    Ok(dict)
}

/// Normalizes a version identifier to `major.minor.patch` (`8.6` becomes `8.6.0`).
pub fn normalize_version(version: &str) -> String {
    let version = version.trim();
    if version.split('.').count() == 2 {
        format!("{}.0", version)
    } else {
        version.to_string()
    }
}

/// Resolves dictionary versions to files in a directory.
pub struct DictionaryLoader {
    dictionary_dir: PathBuf,
}

impl DictionaryLoader {
    pub fn new(dictionary_dir: impl Into<PathBuf>) -> Self {
        Self {
            dictionary_dir: dictionary_dir.into(),
        }
    }

    pub fn dictionary_dir(&self) -> &Path {
        &self.dictionary_dir
    }

    /// Path of the dictionary file for a version.
    pub fn path_for(&self, version: &str) -> PathBuf {
        self.dictionary_dir
            .join(format!("{}.idd", normalize_version(version)))
    }

    /// Loads the dictionary for a version.
    pub fn load_version(&self, version: &str) -> DictionaryResult<Dictionary> {
        let path = self.path_for(version);
        if !path.is_file() {
            return Err(DictionaryError::UnknownVersion {
                version: version.trim().to_string(),
                path,
            });
        }
        load_dictionary(&path)
    }

    /// Versions with a dictionary file present, sorted.
    pub fn available_versions(&self) -> DictionaryResult<Vec<String>> {
        let entries = fs::read_dir(&self.dictionary_dir).map_err(|e| DictionaryError::Io {
            path: self.dictionary_dir.clone(),
            source: e,
        })?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DictionaryError::Io {
                path: self.dictionary_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "idd") {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                versions.push(stem.to_string_lossy().into_owned());
            }
        }
        versions.sort();
        Ok(versions)
    }
}
