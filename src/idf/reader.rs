//! IDF text reader and bulk import
//!
//! Input text is reduced to raw records before any validation: comment
//! lines and trailing `!` comments are dropped, the remaining lines are
//! joined, and the result is split on `;` (records) then `,` (slots).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::errors::{IdfError, IdfResult};
use crate::model::{ModelError, ModelResult, Store};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{normalize_version, DictionaryLoader, RecordSchema};
use crate::value::{InputValue, Inputs, Sentinel};

/// An unvalidated record: type name plus positional slot texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub type_name: String,
    pub values: Vec<String>,
}

/// Controls which records `Store::import` takes from the text.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Import only these types (case-insensitive). `None` imports all.
    pub types: Option<Vec<String>>,
    /// With a type filter, still import the dictionary's required types.
    pub force_required: bool,
}

impl ImportOptions {
    fn wants(&self, schema: &RecordSchema) -> bool {
        match &self.types {
            None => true,
            Some(types) => {
                (self.force_required && schema.required)
                    || types.iter().any(|t| schema.name.matches(t))
            }
        }
    }
}

/// Splits IDF text into raw records.
pub fn split_records(text: &str) -> Vec<RawRecord> {
    let mut joined = String::with_capacity(text.len());
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('!') {
            continue;
        }
        let content = match line.find('!') {
            Some(index) => &line[..index],
            None => line,
        };
        joined.push_str(content.trim());
    }

    joined
        .split(';')
        .filter_map(|chunk| {
            let mut parts = chunk.split(',').map(|part| part.trim().to_string());
            let type_name = parts.next()?;
            if type_name.is_empty() {
                return None;
            }
            Some(RawRecord {
                type_name,
                values: parts.collect(),
            })
        })
        .collect()
}

/// The version identifier declared by the text's `Version` record, normalized
/// to `major.minor.patch`.
pub fn read_version(text: &str) -> Option<String> {
    split_records(text)
        .into_iter()
        .find(|raw| raw.type_name.eq_ignore_ascii_case("version"))
        .and_then(|raw| raw.values.into_iter().next())
        .filter(|version| !version.is_empty())
        .map(|version| normalize_version(&version))
}

/// Maps raw slot texts onto a schema as named inputs.
///
/// Empty slots stay unset. Numeric slots are parsed as numbers unless they
/// are sentinels; unparseable text is passed through so validation reports
/// the mismatch.
pub fn raw_inputs(schema: &RecordSchema, raw: &RawRecord) -> ModelResult<Inputs> {
    if raw.values.len() > schema.fields.len() {
        return Err(ModelError::TooManyValues {
            record_type: schema.name.to_string(),
            count: raw.values.len(),
            max: schema.fields.len(),
        });
    }

    let mut inputs = Inputs::new();
    for (field, text) in schema.fields.iter().zip(raw.values.iter()) {
        if text.is_empty() {
            continue;
        }
        let value = if field.is_numeric() && Sentinel::parse(text).is_none() {
            match text.parse::<f64>() {
                Ok(number) => InputValue::Number(number),
                Err(_) => InputValue::Text(text.clone()),
            }
        } else {
            InputValue::Text(text.clone())
        };
        inputs.insert(field.name.clone(), value);
    }
    Ok(inputs)
}

impl Store {
    /// Adds every record of an IDF text to the store.
    ///
    /// The `Version` record is skipped; the store carries its own. Stops at
    /// the first failing record; records before it stay imported. Returns
    /// the number of records added.
    pub fn import(&mut self, text: &str, options: &ImportOptions) -> IdfResult<usize> {
        let mut added = 0usize;
        for (index, raw) in split_records(text).iter().enumerate() {
            if raw.type_name.eq_ignore_ascii_case("version") {
                continue;
            }
            let context = |source: ModelError| IdfError::Record {
                ordinal: index + 1,
                record_type: raw.type_name.clone(),
                source,
            };

            let schema = Arc::clone(self.schema(&raw.type_name).map_err(context)?);
            if !options.wants(&schema) {
                continue;
            }
            let inputs = raw_inputs(&schema, raw).map_err(context)?;
            self.add(schema.name.as_str(), &inputs).map_err(context)?;
            added += 1;
        }

        log_event_with_fields(Event::ModelImported, &[("records", added.to_string().as_str())]);
        Ok(added)
    }
}

/// Reads an IDF file into a new store, using the dictionary for the version
/// the file declares, or `default_version` when it declares none.
pub fn read_model(loader: &DictionaryLoader, path: &Path, default_version: &str) -> IdfResult<Store> {
    read_model_with(loader, path, default_version, &ImportOptions::default())
}

/// `read_model` with an import filter.
pub fn read_model_with(
    loader: &DictionaryLoader,
    path: &Path,
    default_version: &str,
    options: &ImportOptions,
) -> IdfResult<Store> {
    let text = fs::read_to_string(path).map_err(|e| IdfError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let version = match read_version(&text) {
        Some(version) => version,
        None => {
            tracing::debug!(path = %path.display(), default_version, "no Version record, using default");
            normalize_version(default_version)
        }
    };

    let dictionary = loader.load_version(&version)?;
    let mut store = Store::with_version(Arc::new(dictionary), &version)?;
    store.import(&text, options)?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Dictionary, FieldSchema};
    use crate::value::Value;

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::from_schemas(vec![
            RecordSchema {
                unique: true,
                ..RecordSchema::new("Version").with_field(FieldSchema::required_alpha("Version Identifier"))
            },
            RecordSchema {
                required: true,
                ..RecordSchema::new("Building").with_field(FieldSchema::required_alpha("Name"))
            },
            RecordSchema::new("Zone")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::numeric("Multiplier").with_default(Value::Numeric(1.0)))
                .with_field(FieldSchema {
                    autosizable: true,
                    ..FieldSchema::numeric("Ceiling Height")
                }),
            RecordSchema::new("Material").with_field(FieldSchema::required_alpha("Name")),
        ]))
    }

    const TEXT: &str = "\
! A small model
Version,8.6;

Building,
    HQ;                      !- Name

Zone,
    Zone 1,                  !- Name
    ,                        !- Multiplier
    autosize;                !- Ceiling Height

Zone, Zone 2, 3;
Material, Concrete;
";

    #[test]
    fn test_split_records() {
        let records = split_records(TEXT);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].type_name, "Version");
        assert_eq!(records[0].values, vec!["8.6"]);
        assert_eq!(records[2].values, vec!["Zone 1", "", "autosize"]);
        assert_eq!(records[3].values, vec!["Zone 2", "3"]);
    }

    #[test]
    fn test_split_records_ignores_trailing_text() {
        assert!(split_records("   \n! only comments\n").is_empty());
        assert_eq!(split_records("Zone,A;  ").len(), 1);
    }

    #[test]
    fn test_read_version() {
        assert_eq!(read_version(TEXT), Some("8.6.0".to_string()));
        assert_eq!(read_version("Zone,A;"), None);
    }

    #[test]
    fn test_import_converts_slots() {
        let mut store = Store::with_version(dictionary(), "8.6.0").unwrap();
        let added = store.import(TEXT, &ImportOptions::default()).unwrap();
        assert_eq!(added, 4);

        let zone = store.find("zone", "zone 1").unwrap();
        assert_eq!(zone.get("multiplier").unwrap(), None);
        assert_eq!(
            zone.get("ceiling height").unwrap(),
            Some(&Value::Sentinel(Sentinel::Autosize))
        );
        let zone = store.find("zone", "Zone 2").unwrap();
        assert_eq!(zone.get("multiplier").unwrap(), Some(&Value::Numeric(3.0)));
        // The store's own Version record is kept
        assert_eq!(store.get("version").len(), 1);
    }

    #[test]
    fn test_import_type_filter() {
        let mut store = Store::new(dictionary());
        let only_zones = ImportOptions {
            types: Some(vec!["ZONE".into()]),
            force_required: false,
        };
        assert_eq!(store.import(TEXT, &only_zones).unwrap(), 2);
        assert!(store.get("building").is_empty());

        let mut store = Store::new(dictionary());
        let with_required = ImportOptions {
            force_required: true,
            ..only_zones
        };
        assert_eq!(store.import(TEXT, &with_required).unwrap(), 3);
        assert_eq!(store.get("building").len(), 1);
    }

    #[test]
    fn test_import_stops_at_first_failure() {
        let mut store = Store::new(dictionary());
        let err = store
            .import("Zone,A;Zone,B,many;Zone,C;", &ImportOptions::default())
            .unwrap_err();
        match &err {
            IdfError::Record { ordinal, record_type, source } => {
                assert_eq!(*ordinal, 2);
                assert_eq!(record_type, "Zone");
                assert_eq!(source.code(), "IDF_TYPE_MISMATCH");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.get("zone").len(), 1);
    }

    #[test]
    fn test_too_many_values() {
        let mut store = Store::new(dictionary());
        let err = store
            .import("Material,Concrete,extra;", &ImportOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "IDF_TOO_MANY_VALUES");
    }

    #[test]
    fn test_unknown_type_in_text() {
        let mut store = Store::new(dictionary());
        let err = store.import("Zonee,A;", &ImportOptions::default()).unwrap_err();
        assert_eq!(err.code(), "IDF_UNKNOWN_RECORD_TYPE");
    }
}
