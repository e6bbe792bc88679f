//! Records: validated, value-bearing instances of a record type

use std::sync::Arc;

use serde_json::json;

use super::errors::{ModelError, ModelResult};
use super::validator::validate_value;
use crate::schema::{FieldSchema, RecordSchema, TypeName};
use crate::value::{InputValue, Value};

/// One instance of a record type.
///
/// Holds one slot per schema field. An unset slot falls back to the field
/// default when rendered. Two records are equal when their schemas and
/// slots are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<Option<Value>>,
}

impl Record {
    /// `values` must hold exactly one slot per schema field.
    pub(crate) fn from_parts(schema: Arc<RecordSchema>, values: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(schema.fields.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn type_name(&self) -> &TypeName {
        &self.schema.name
    }

    /// Case-insensitive type check.
    pub fn verify(&self, type_name: &str) -> bool {
        self.schema.name.matches(type_name)
    }

    /// The record's identity: the value of its `Name` field, if the type has one
    /// and it is set.
    pub fn name(&self) -> Option<&str> {
        let index = self.schema.name_field_index()?;
        self.values[index].as_ref().and_then(Value::as_text)
    }

    /// Whether this record's identity equals `name`, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name().map_or(false, |own| same_identity(own, name))
    }

    /// The explicitly set value of a field.
    pub fn get(&self, field: &str) -> ModelResult<Option<&Value>> {
        let index = self.index_of(field)?;
        Ok(self.values[index].as_ref())
    }

    /// The set value of a field, or its default.
    pub fn effective(&self, field: &str) -> ModelResult<Option<&Value>> {
        let index = self.index_of(field)?;
        Ok(self.effective_at(index))
    }

    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub(crate) fn effective_at(&self, index: usize) -> Option<&Value> {
        self.value_at(index)
            .or_else(|| self.schema.fields.get(index).and_then(|f| f.default.as_ref()))
    }

    /// Validates and assigns a field value. Blank text clears the field.
    pub fn set(&mut self, field: &str, value: impl Into<InputValue>) -> ModelResult<()> {
        let value = value.into();
        if value.is_blank() {
            return self.clear(field);
        }
        let index = self.index_of(field)?;
        let value = validate_value(&self.schema.name, &self.schema.fields[index], value)?;
        self.values[index] = Some(value);
        Ok(())
    }

    /// Unsets a field so it falls back to its default. Required fields cannot
    /// be cleared.
    pub fn clear(&mut self, field: &str) -> ModelResult<()> {
        let index = self.index_of(field)?;
        let schema = &self.schema.fields[index];
        if schema.required {
            return Err(ModelError::MissingRequiredField {
                record_type: self.schema.name.to_string(),
                field: schema.name.to_string(),
            });
        }
        self.values[index] = None;
        Ok(())
    }

    /// Schema fields paired with their set values, in positional order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSchema, Option<&Value>)> {
        self.schema.fields.iter().zip(self.values.iter().map(Option::as_ref))
    }

    /// JSON view: `{"type": ..., "fields": {name: value}}` with set fields only.
    pub fn to_json(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for (field, value) in self.fields() {
            if let Some(value) = value {
                fields.insert(field.name.to_string(), json!(value));
            }
        }
        json!({
            "type": self.schema.name.as_str(),
            "fields": fields,
        })
    }

    fn index_of(&self, field: &str) -> ModelResult<usize> {
        self.schema
            .field_index(field)
            .ok_or_else(|| ModelError::UnknownField {
                record_type: self.schema.name.to_string(),
                field: field.trim().to_string(),
            })
    }
}

/// Identity comparison used for record names: case and surrounding
/// whitespace are ignored, as for type and field names.
pub(crate) fn same_identity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
