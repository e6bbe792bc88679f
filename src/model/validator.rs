//! Record instantiation and field validation
//!
//! Validation semantics, per field in schema order:
//! - A required field must be present; blank text counts as absent
//! - An absent optional field stays unset (rendered from its default)
//! - Numeric fields take numbers, or `autosize` / `autocalculate` when the
//!   field is flagged for it (sentinels skip the range check)
//! - Numeric values must lie within the inclusive `[minimum, maximum]`
//! - Alpha fields take trimmed text free of field delimiters; choice fields
//!   must match a key, ignoring case
//!
//! Validation is all-or-nothing: the first failure aborts instantiation.

use std::sync::Arc;

use super::errors::{format_range, ModelError, ModelResult};
use super::record::Record;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{FieldKind, FieldSchema, RecordSchema, TypeName};
use crate::value::{InputValue, Inputs, Sentinel, Value};

/// Characters that separate fields, records or comments in IDF text.
const DELIMITERS: &[char] = &[',', ';', '!', '\n', '\r'];

/// Validates one raw value against a field, producing the stored value.
pub fn validate_value(
    record_type: &TypeName,
    field: &FieldSchema,
    input: InputValue,
) -> ModelResult<Value> {
    match field.kind {
        FieldKind::Numeric => match input {
            InputValue::Number(n) => {
                if !n.is_finite() {
                    return Err(type_error(record_type, field, &input));
                }
                let below = field.minimum.map_or(false, |min| n < min);
                let above = field.maximum.map_or(false, |max| n > max);
                if below || above {
                    return Err(ModelError::OutOfRange {
                        record_type: record_type.to_string(),
                        field: field.name.to_string(),
                        value: n,
                        range: format_range(field.minimum, field.maximum),
                    });
                }
                Ok(Value::Numeric(n))
            }
            InputValue::Text(ref text) => match Sentinel::parse(text) {
                Some(sentinel) if field.accepts(sentinel) => Ok(Value::Sentinel(sentinel)),
                _ => Err(type_error(record_type, field, &input)),
            },
        },
        FieldKind::Alpha => match input {
            InputValue::Text(text) => {
                let text = text.trim().to_string();
                if text.is_empty() || text.contains(DELIMITERS) {
                    return Err(ModelError::InvalidText {
                        record_type: record_type.to_string(),
                        field: field.name.to_string(),
                        value: text,
                    });
                }
                if field.is_choice() && !field.has_key(&text) {
                    return Err(ModelError::InvalidChoice {
                        record_type: record_type.to_string(),
                        field: field.name.to_string(),
                        value: text,
                        choices: field.keys.clone(),
                    });
                }
                Ok(Value::Text(text))
            }
            InputValue::Number(_) => Err(type_error(record_type, field, &input)),
        },
    }
}

/// Creates a record from a schema and caller inputs.
///
/// The schema is shared, never modified. Input keys that match no field are
/// ignored.
pub fn instantiate(schema: &Arc<RecordSchema>, inputs: &Inputs) -> ModelResult<Record> {
    for (key, _) in inputs.iter() {
        if schema.field_index(key.as_str()).is_none() {
            log_event_with_fields(
                Event::InputIgnored,
                &[("record_type", schema.name.as_str()), ("field", key.as_str())],
            );
        }
    }

    let mut values = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        let value = match inputs.get(&field.name).filter(|input| !input.is_blank()) {
            Some(input) => Some(validate_value(&schema.name, field, input.clone())?),
            None if field.required => {
                return Err(ModelError::MissingRequiredField {
                    record_type: schema.name.to_string(),
                    field: field.name.to_string(),
                })
            }
            None => None,
        };
        values.push(value);
    }

    Ok(Record::from_parts(Arc::clone(schema), values))
}

fn type_error(record_type: &TypeName, field: &FieldSchema, input: &InputValue) -> ModelError {
    let actual = match input {
        InputValue::Number(n) => format!("Numeric {}", n),
        InputValue::Text(s) => format!("String '{}'", s),
    };
    ModelError::TypeMismatch {
        record_type: record_type.to_string(),
        field: field.name.to_string(),
        expected: field.kind.type_name(),
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_schema() -> Arc<RecordSchema> {
        let mut cooling = FieldSchema::numeric("Cooling Capacity");
        cooling.autosizable = true;

        Arc::new(
            RecordSchema::new("Space")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::numeric("Floor Area").with_range(Some(0.0), Some(10000.0)))
                .with_field(FieldSchema::choice("Kind", &["Office", "Storage"]))
                .with_field(cooling),
        )
    }

    #[test]
    fn test_instantiate_assigns_positionally() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("FLOOR AREA", 50);
        let record = instantiate(&schema, &inputs).unwrap();

        assert_eq!(record.value_at(0), Some(&Value::Text("S1".into())));
        assert_eq!(record.value_at(1), Some(&Value::Numeric(50.0)));
        assert_eq!(record.value_at(2), None);
        assert_eq!(record.value_at(3), None);
    }

    #[test]
    fn test_missing_required_field() {
        let schema = space_schema();
        let err = instantiate(&schema, &Inputs::new().with("Floor Area", 1)).unwrap_err();
        assert_eq!(err.code(), "IDF_MISSING_REQUIRED_FIELD");
    }

    #[test]
    fn test_range_is_inclusive() {
        let schema = space_schema();
        let ok = Inputs::new().with("name", "S1").with("floor area", 10000);
        assert!(instantiate(&schema, &ok).is_ok());
        let zero = Inputs::new().with("name", "S1").with("floor area", 0);
        assert!(instantiate(&schema, &zero).is_ok());

        let low = Inputs::new().with("name", "S1").with("floor area", -5);
        assert_eq!(instantiate(&schema, &low).unwrap_err().code(), "IDF_OUT_OF_RANGE");
        let high = Inputs::new().with("name", "S1").with("floor area", 10000.5);
        assert_eq!(instantiate(&schema, &high).unwrap_err().code(), "IDF_OUT_OF_RANGE");
    }

    #[test]
    fn test_numeric_field_rejects_text() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("floor area", "big");
        assert_eq!(instantiate(&schema, &inputs).unwrap_err().code(), "IDF_TYPE_MISMATCH");
    }

    #[test]
    fn test_alpha_field_rejects_number() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", 42);
        assert_eq!(instantiate(&schema, &inputs).unwrap_err().code(), "IDF_TYPE_MISMATCH");
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("floor area", f64::NAN);
        assert_eq!(instantiate(&schema, &inputs).unwrap_err().code(), "IDF_TYPE_MISMATCH");
    }

    #[test]
    fn test_choice_matches_ignoring_case_and_keeps_casing() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("kind", "oFFice");
        let record = instantiate(&schema, &inputs).unwrap();
        assert_eq!(record.value_at(2), Some(&Value::Text("oFFice".into())));

        let bad = Inputs::new().with("name", "S1").with("kind", "Garage");
        assert_eq!(instantiate(&schema, &bad).unwrap_err().code(), "IDF_INVALID_CHOICE");
    }

    #[test]
    fn test_autosize_sentinel() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("cooling capacity", "AUTOSIZE");
        let record = instantiate(&schema, &inputs).unwrap();
        assert_eq!(record.value_at(3), Some(&Value::Sentinel(Sentinel::Autosize)));

        // Not flagged autocalculatable
        let other = Inputs::new().with("name", "S1").with("cooling capacity", "autocalculate");
        assert_eq!(instantiate(&schema, &other).unwrap_err().code(), "IDF_TYPE_MISMATCH");

        // Not flagged at all
        let area = Inputs::new().with("name", "S1").with("floor area", "autosize");
        assert_eq!(instantiate(&schema, &area).unwrap_err().code(), "IDF_TYPE_MISMATCH");
    }

    #[test]
    fn test_unknown_inputs_ignored() {
        let schema = space_schema();
        let inputs = Inputs::new().with("name", "S1").with("colour", "red");
        let record = instantiate(&schema, &inputs).unwrap();
        assert_eq!(record.name(), Some("S1"));
    }

    #[test]
    fn test_blank_text_is_absent() {
        let schema = space_schema();
        let err = instantiate(&schema, &Inputs::new().with("name", "  ")).unwrap_err();
        assert_eq!(err.code(), "IDF_MISSING_REQUIRED_FIELD");

        let record = instantiate(&schema, &Inputs::new().with("name", "S1").with("kind", "")).unwrap();
        assert_eq!(record.value_at(2), None);
    }

    #[test]
    fn test_text_is_trimmed() {
        let schema = space_schema();
        let record = instantiate(&schema, &Inputs::new().with("name", "  S1 ")).unwrap();
        assert_eq!(record.name(), Some("S1"));
    }

    #[test]
    fn test_delimiters_rejected() {
        let schema = space_schema();
        for name in ["A, B", "A;B", "A ! note", "A\nB", "A\rB"] {
            let err = instantiate(&schema, &Inputs::new().with("name", name)).unwrap_err();
            assert_eq!(err.code(), "IDF_INVALID_TEXT", "accepted {:?}", name);
        }
    }

    #[test]
    fn test_schema_untouched() {
        let schema = space_schema();
        let before = (*schema).clone();
        let _ = instantiate(&schema, &Inputs::new().with("name", "S1").with("floor area", 3));
        assert_eq!(*schema, before);
    }
}
