//! Record store
//!
//! Records grouped by type, in insertion order. Invariants:
//! - A unique type holds at most one record
//! - Within a non-unique type, no two records share a name (ignoring case)
//! - A failed operation leaves the store unchanged
//!
//! The store is plain single-owner state. Share it across threads only
//! behind a single writer lock: `add` checks uniqueness and inserts as one
//! step.

use std::slice;
use std::sync::Arc;

use super::errors::{ModelError, ModelResult};
use super::record::Record;
use super::validator::instantiate;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Dictionary, RecordSchema, TypeName};
use crate::value::{InputValue, Inputs};

#[derive(Debug, Clone)]
enum Entry {
    Unique(Record),
    Many(Vec<Record>),
}

impl Entry {
    fn records(&self) -> &[Record] {
        match self {
            Entry::Unique(record) => slice::from_ref(record),
            Entry::Many(records) => records,
        }
    }
}

#[derive(Debug, Clone)]
struct Collection {
    type_name: TypeName,
    entry: Entry,
}

/// Typed collection of records backed by a dictionary.
#[derive(Debug, Clone)]
pub struct Store {
    dictionary: Arc<Dictionary>,
    collections: Vec<Collection>,
}

impl Store {
    /// Creates an empty store.
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            collections: Vec::new(),
        }
    }

    /// Creates a store holding a `Version` record, when the dictionary
    /// defines that type.
    pub fn with_version(dictionary: Arc<Dictionary>, version: &str) -> ModelResult<Self> {
        let mut store = Store::new(dictionary);
        if store.dictionary.contains("version") {
            store.add(
                "Version",
                &Inputs::new().with("Version Identifier", version.trim()),
            )?;
        }
        Ok(store)
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Looks up a record type; a miss is an error.
    pub fn schema(&self, type_name: &str) -> ModelResult<&Arc<RecordSchema>> {
        self.dictionary
            .get(type_name)
            .ok_or_else(|| ModelError::UnknownRecordType(type_name.trim().to_string()))
    }

    /// Validates inputs into a detached record without inserting it.
    pub fn instantiate(&self, type_name: &str, inputs: &Inputs) -> ModelResult<Record> {
        let schema = self.schema(type_name)?;
        instantiate(schema, inputs)
    }

    /// Validates and inserts a record.
    pub fn add(&mut self, type_name: &str, inputs: &Inputs) -> ModelResult<&Record> {
        let record = match self.instantiate(type_name, inputs) {
            Ok(record) => record,
            Err(e) => {
                reject(type_name, &e);
                return Err(e);
            }
        };
        self.insert(record)
    }

    /// Inserts an already validated record, enforcing uniqueness.
    ///
    /// The record's schema must be the one this store's dictionary defines
    /// for its type.
    pub fn insert(&mut self, record: Record) -> ModelResult<&Record> {
        let type_name = record.type_name().clone();
        if let Err(e) = self.check_schema(&record).and_then(|_| self.check_insert(&record)) {
            reject(type_name.as_str(), &e);
            return Err(e);
        }

        log_event_with_fields(
            Event::RecordAdded,
            &[
                ("record_type", type_name.as_str()),
                ("name", record.name().unwrap_or("")),
            ],
        );

        let unique = record.schema().unique;
        match self.position(type_name.as_str()) {
            Some(position) => match &mut self.collections[position].entry {
                Entry::Many(records) => {
                    records.push(record);
                    Ok(&records[records.len() - 1])
                }
                // check_insert already refused a second instance
                Entry::Unique(_) => Err(ModelError::DuplicateUniqueRecord {
                    record_type: type_name.to_string(),
                }),
            },
            None => {
                let entry = if unique {
                    Entry::Unique(record)
                } else {
                    Entry::Many(vec![record])
                };
                self.collections.push(Collection { type_name, entry });
                let last = self.collections.len() - 1;
                Ok(&self.collections[last].entry.records()[0])
            }
        }
    }

    /// Overwrites the single instance of a unique type, or adds it if absent.
    pub fn replace_unique(&mut self, type_name: &str, inputs: &Inputs) -> ModelResult<&Record> {
        let schema = self.schema(type_name)?;
        if !schema.unique {
            return Err(ModelError::NotUniqueType {
                record_type: schema.name.to_string(),
            });
        }
        let record = instantiate(schema, inputs)?;

        match self.position(type_name) {
            Some(position) => {
                log_event_with_fields(
                    Event::RecordReplaced,
                    &[("record_type", record.type_name().as_str())],
                );
                let collection = &mut self.collections[position];
                collection.entry = Entry::Unique(record);
                Ok(&collection.entry.records()[0])
            }
            None => self.insert(record),
        }
    }

    /// All records of a type, in insertion order. Empty if there are none.
    pub fn get(&self, type_name: &str) -> &[Record] {
        match self.position(type_name) {
            Some(position) => self.collections[position].entry.records(),
            None => &[],
        }
    }

    /// The single instance of a unique type.
    pub fn get_unique(&self, type_name: &str) -> Option<&Record> {
        let position = self.position(type_name)?;
        match &self.collections[position].entry {
            Entry::Unique(record) => Some(record),
            Entry::Many(_) => None,
        }
    }

    /// Finds a record by name across all non-unique types, in store order.
    ///
    /// A miss is not an error.
    pub fn get_by_name(&self, name: &str) -> Option<&Record> {
        self.collections
            .iter()
            .filter_map(|c| match &c.entry {
                Entry::Many(records) => Some(records),
                Entry::Unique(_) => None,
            })
            .flat_map(|records| records.iter())
            .find(|record| record.is_named(name))
    }

    /// Finds a record of a given type by name.
    pub fn find(&self, type_name: &str, name: &str) -> Option<&Record> {
        self.get(type_name).iter().find(|record| record.is_named(name))
    }

    pub fn exists(&self, type_name: &str, name: &str) -> bool {
        self.find(type_name, name).is_some()
    }

    /// True if no record of this type is already called `name`.
    pub fn unique_name(&self, type_name: &str, name: &str) -> bool {
        !self.get(type_name).iter().any(|record| record.is_named(name))
    }

    /// Removes a record by name, or the whole instance of a unique type.
    ///
    /// Returns whether anything was removed.
    pub fn delete(&mut self, type_name: &str, name: &str) -> bool {
        let position = match self.position(type_name) {
            Some(position) => position,
            None => return false,
        };

        let removed = match &mut self.collections[position].entry {
            Entry::Unique(_) => true,
            Entry::Many(records) => {
                let before = records.len();
                records.retain(|record| !record.is_named(name));
                records.len() != before
            }
        };
        if self.collections[position].entry.records().is_empty()
            || matches!(self.collections[position].entry, Entry::Unique(_))
        {
            self.collections.remove(position);
        }

        if removed {
            log_event_with_fields(
                Event::RecordDeleted,
                &[("record_type", type_name.trim()), ("name", name)],
            );
        }
        removed
    }

    /// Validates and assigns one field of a stored record.
    ///
    /// For a unique type `name` is ignored. Renaming a record to a name
    /// already taken within its type is rejected.
    pub fn set_field(
        &mut self,
        type_name: &str,
        name: &str,
        field: &str,
        value: impl Into<InputValue>,
    ) -> ModelResult<()> {
        let not_found = || ModelError::RecordNotFound {
            record_type: type_name.trim().to_string(),
            name: name.to_string(),
        };
        let position = self.position(type_name).ok_or_else(not_found)?;
        let value = value.into();

        let collection = &mut self.collections[position];
        let (target, siblings): (&mut Record, Vec<&Record>) = match &mut collection.entry {
            Entry::Unique(record) => (record, Vec::new()),
            Entry::Many(records) => {
                let index = records
                    .iter()
                    .position(|record| record.is_named(name))
                    .ok_or_else(not_found)?;
                let (before, rest) = records.split_at_mut(index);
                let (target, after) = rest.split_at_mut(1);
                let siblings = before.iter().chain(after.iter()).collect();
                (&mut target[0], siblings)
            }
        };

        // Validate on a copy so a rejected rename leaves the record untouched.
        let mut updated = target.clone();
        updated.set(field, value)?;
        if let Some(new_name) = updated.name() {
            if siblings.iter().any(|sibling| sibling.is_named(new_name)) {
                return Err(ModelError::DuplicateName {
                    record_type: collection.type_name.to_string(),
                    name: new_name.to_string(),
                });
            }
        }
        *target = updated;

        log_event_with_fields(
            Event::FieldUpdated,
            &[("record_type", type_name.trim()), ("name", name), ("field", field)],
        );
        Ok(())
    }

    /// Every record, grouped by type in the order types were first added.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.collections.iter().flat_map(|c| c.entry.records().iter())
    }

    /// Type names present in the store, in insertion order.
    pub fn type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.collections.iter().map(|c| &c.type_name)
    }

    /// Required types of the dictionary with no instance in the store.
    pub fn missing_required_types(&self) -> Vec<&TypeName> {
        self.dictionary
            .required_types()
            .into_iter()
            .filter(|name| self.position(name.as_str()).is_none())
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.collections.iter().map(|c| c.entry.records().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    fn check_schema(&self, record: &Record) -> ModelResult<()> {
        match self.dictionary.get(record.type_name().as_str()) {
            Some(schema) if **schema == *record.schema() => Ok(()),
            Some(_) => Err(ModelError::ForeignSchema {
                record_type: record.type_name().to_string(),
            }),
            None => Err(ModelError::UnknownRecordType(record.type_name().to_string())),
        }
    }

    fn check_insert(&self, record: &Record) -> ModelResult<()> {
        let type_name = record.type_name();
        let existing = self.get(type_name.as_str());
        if existing.is_empty() {
            return Ok(());
        }
        if record.schema().unique {
            return Err(ModelError::DuplicateUniqueRecord {
                record_type: type_name.to_string(),
            });
        }
        if let Some(name) = record.name() {
            if existing.iter().any(|other| other.is_named(name)) {
                return Err(ModelError::DuplicateName {
                    record_type: type_name.to_string(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn position(&self, type_name: &str) -> Option<usize> {
        self.collections
            .iter()
            .position(|c| c.type_name.matches(type_name))
    }
}

fn reject(type_name: &str, error: &ModelError) {
    log_event_with_fields(
        Event::RecordRejected,
        &[
            ("record_type", type_name.trim()),
            ("code", error.code()),
            ("reason", error.to_string().as_str()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, RecordSchema};
    use crate::value::Value;

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::from_schemas(vec![
            RecordSchema {
                unique: true,
                ..RecordSchema::new("Version").with_field(FieldSchema::required_alpha("Version Identifier"))
            },
            RecordSchema {
                unique: true,
                ..RecordSchema::new("Building")
                    .with_field(FieldSchema::required_alpha("Name"))
                    .with_field(FieldSchema::numeric("North Axis"))
            },
            RecordSchema::new("Zone")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::numeric("Multiplier").with_default(Value::Numeric(1.0))),
            RecordSchema::new("Material")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::numeric("Thickness").with_range(Some(0.0), Some(3.0))),
            RecordSchema {
                required: true,
                ..RecordSchema::new("SimulationControl")
                    .with_field(FieldSchema::optional_alpha("Do Zone Sizing Calculation"))
            },
            RecordSchema::new("Output:Variable").with_field(FieldSchema::required_alpha("Variable Name")),
        ]))
    }

    fn zone(name: &str) -> Inputs {
        Inputs::new().with("name", name)
    }

    #[test]
    fn test_add_and_get() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        store.add("ZONE", &zone("Zone 2")).unwrap();

        let zones = store.get("Zone");
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name(), Some("Zone 1"));
        assert_eq!(zones[1].name(), Some("Zone 2"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_type() {
        let mut store = Store::new(dictionary());
        let err = store.add("Zonee", &zone("Z")).unwrap_err();
        assert_eq!(err, ModelError::UnknownRecordType("Zonee".into()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_name_ignores_case() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        let err = store.add("zone", &zone("ZONE 1")).unwrap_err();
        assert_eq!(err.code(), "IDF_DUPLICATE_NAME");
        assert_eq!(store.get("zone").len(), 1);
    }

    #[test]
    fn test_same_name_in_different_types() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Thing")).unwrap();
        store.add("material", &zone("Thing")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_unique_record() {
        let mut store = Store::new(dictionary());
        store.add("building", &zone("HQ")).unwrap();
        let err = store.add("building", &zone("Annex")).unwrap_err();
        assert_eq!(err.code(), "IDF_DUPLICATE_UNIQUE_RECORD");
        assert_eq!(store.get_unique("building").unwrap().name(), Some("HQ"));
    }

    #[test]
    fn test_failed_validation_leaves_store_unchanged() {
        let mut store = Store::new(dictionary());
        store.add("material", &zone("Concrete")).unwrap();
        let bad = Inputs::new().with("name", "Glass").with("thickness", -1);
        assert_eq!(store.add("material", &bad).unwrap_err().code(), "IDF_OUT_OF_RANGE");
        assert_eq!(store.len(), 1);
        assert!(store.unique_name("material", "Glass"));
    }

    #[test]
    fn test_records_without_identity_do_not_collide() {
        let mut store = Store::new(dictionary());
        let variable = Inputs::new().with("variable name", "Zone Mean Air Temperature");
        store.add("output:variable", &variable).unwrap();
        store.add("output:variable", &variable).unwrap();
        assert_eq!(store.get("output:variable").len(), 2);
    }

    #[test]
    fn test_get_by_name_scans_non_unique_types() {
        let mut store = Store::new(dictionary());
        store.add("building", &zone("HQ")).unwrap();
        store.add("zone", &zone("Zone 1")).unwrap();
        store.add("material", &zone("Concrete")).unwrap();

        let found = store.get_by_name("concrete").unwrap();
        assert!(found.verify("material"));
        assert!(store.get_by_name("HQ").is_none());
        assert!(store.get_by_name("nothing").is_none());
    }

    #[test]
    fn test_get_by_name_returns_first_in_store_order() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Shared")).unwrap();
        store.add("material", &zone("Shared")).unwrap();
        assert!(store.get_by_name("shared").unwrap().verify("zone"));
    }

    #[test]
    fn test_unique_name() {
        let mut store = Store::new(dictionary());
        assert!(store.unique_name("zone", "Zone 1"));
        store.add("zone", &zone("Zone 1")).unwrap();
        assert!(!store.unique_name("zone", "zone 1"));
        assert!(store.unique_name("zone", "Zone 2"));
    }

    #[test]
    fn test_delete_by_name() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        store.add("zone", &zone("Zone 2")).unwrap();

        assert!(store.delete("zone", "ZONE 1"));
        assert!(!store.delete("zone", "Zone 1"));
        assert_eq!(store.get("zone").len(), 1);

        assert!(store.delete("zone", "Zone 2"));
        assert!(store.get("zone").is_empty());
        assert_eq!(store.type_names().count(), 0);
        assert!(!store.delete("material", "anything"));
    }

    #[test]
    fn test_delete_unique_removes_instance() {
        let mut store = Store::new(dictionary());
        store.add("building", &zone("HQ")).unwrap();
        assert!(store.delete("building", "whatever"));
        assert!(store.get_unique("building").is_none());
        store.add("building", &zone("Annex")).unwrap();
    }

    #[test]
    fn test_replace_unique() {
        let mut store = Store::new(dictionary());
        store.add("building", &zone("HQ")).unwrap();
        store.replace_unique("building", &zone("Annex")).unwrap();
        assert_eq!(store.get_unique("building").unwrap().name(), Some("Annex"));
        assert_eq!(store.len(), 1);

        let err = store.replace_unique("zone", &zone("Zone 1")).unwrap_err();
        assert_eq!(err.code(), "IDF_NOT_UNIQUE_TYPE");
    }

    #[test]
    fn test_set_field() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        store.set_field("zone", "zone 1", "multiplier", 4).unwrap();
        assert_eq!(
            store.find("zone", "Zone 1").unwrap().get("multiplier").unwrap(),
            Some(&Value::Numeric(4.0))
        );

        let err = store.set_field("zone", "Zone 9", "multiplier", 4).unwrap_err();
        assert_eq!(err.code(), "IDF_RECORD_NOT_FOUND");
    }

    #[test]
    fn test_set_field_rename_checks_uniqueness() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        store.add("zone", &zone("Zone 2")).unwrap();

        let err = store.set_field("zone", "Zone 2", "name", "zone 1").unwrap_err();
        assert_eq!(err.code(), "IDF_DUPLICATE_NAME");
        assert!(store.exists("zone", "Zone 2"));

        store.set_field("zone", "Zone 2", "name", "Zone 3").unwrap();
        assert!(store.exists("zone", "zone 3"));
        assert!(!store.exists("zone", "Zone 2"));
    }

    #[test]
    fn test_with_version_and_required_types() {
        let store = Store::with_version(dictionary(), "8.6").unwrap();
        let version = store.get_unique("version").unwrap();
        assert_eq!(
            version.get("version identifier").unwrap(),
            Some(&Value::Text("8.6".into()))
        );
        let missing: Vec<_> = store.missing_required_types().iter().map(|n| n.to_string()).collect();
        assert_eq!(missing, vec!["SimulationControl"]);
    }

    #[test]
    fn test_insert_rejects_record_from_other_dictionary() {
        let mut store = Store::new(dictionary());
        let other = Store::new(Arc::new(Dictionary::from_schemas(vec![RecordSchema::new("Zone")
            .with_field(FieldSchema::required_alpha("Name"))
            .with_field(FieldSchema::numeric("Volume"))])));

        let foreign = other.instantiate("zone", &zone("Zone 1")).unwrap();
        let err = store.insert(foreign).unwrap_err();
        assert_eq!(err.code(), "IDF_FOREIGN_SCHEMA");
        assert!(store.is_empty());

        let native = store.instantiate("zone", &zone("Zone 1")).unwrap();
        store.insert(native).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_by_name_ignores_surrounding_whitespace() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        assert!(store.get_by_name(" Zone 1").is_some());
        assert!(store.exists("zone", "zone 1 "));
        assert!(!store.unique_name("zone", "  ZONE 1"));
    }

    #[test]
    fn test_records_in_insertion_order() {
        let mut store = Store::new(dictionary());
        store.add("zone", &zone("Zone 1")).unwrap();
        store.add("material", &zone("Concrete")).unwrap();
        store.add("zone", &zone("Zone 2")).unwrap();

        let names: Vec<_> = store.records().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["Zone 1", "Zone 2", "Concrete"]);
    }
}
