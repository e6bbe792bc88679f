//! Dictionary (IDD) parser
//!
//! Single forward scan over the dictionary text with two cursors: the record
//! type being defined and its most recently opened field.
//!
//! ```text
//! \group Thermal Zones and Surfaces
//! Zone,
//!        \memo Defines a thermal zone of the building.
//!   A1 , \field Name
//!        \required-field
//!   N1 ; \field Multiplier
//!        \type integer
//!        \default 1
//!        \minimum 1
//! ```
//!
//! A line without a backslash opens a new record type. `\field` opens a new
//! field whose kind comes from the `A<n>` / `N<n>` prefix. Field directives
//! attach to the open field, object directives to the open record type. An
//! unknown directive aborts the whole load.

use super::errors::{DictionaryError, DictionaryResult};
use super::loader::Dictionary;
use super::names::FieldName;
use super::types::{FieldKind, FieldSchema, FieldType, RecordSchema};
use crate::model::validate_value;
use crate::value::{InputValue, Sentinel};

/// Offset applied to strict bounds (`\minimum>`, `\maximum<`) so they can be
/// checked as closed intervals.
pub const STRICT_BOUND_EPSILON: f64 = 1e-6;

/// Parses dictionary text. `source_name` is only used in error messages.
pub fn parse_dictionary(text: &str, source_name: &str) -> DictionaryResult<Dictionary> {
    let mut parser = DictionaryParser::new(source_name);
    for (index, line) in text.lines().enumerate() {
        parser.parse_line(line, index + 1)?;
    }
    parser.finish()
}

/// A `\default` kept as text until the record's bounds and keys are known.
struct PendingDefault {
    record: usize,
    field: usize,
    text: String,
    line: usize,
}

struct DictionaryParser<'a> {
    source_name: &'a str,
    group: Option<String>,
    records: Vec<RecordSchema>,
    defaults: Vec<PendingDefault>,
}

impl<'a> DictionaryParser<'a> {
    fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            group: None,
            records: Vec::new(),
            defaults: Vec::new(),
        }
    }

    fn parse_line(&mut self, raw: &str, line: usize) -> DictionaryResult<()> {
        let ln = raw.trim();
        if ln.is_empty() || ln.starts_with('!') {
            return Ok(());
        }
        if ln == "Lead Input;" || ln == "Simulation Data;" {
            return Ok(());
        }

        if let Some(group) = ln.strip_prefix("\\group") {
            self.group = Some(group.trim().to_string());
            return Ok(());
        }

        if !ln.contains('\\') {
            let name = ln.replace([',', ';'], "");
            let name = name.trim();
            if !name.is_empty() {
                let mut record = RecordSchema::new(name);
                record.group = self.group.clone();
                self.records.push(record);
            }
            return Ok(());
        }

        if let Some(pos) = ln.find("\\field") {
            return self.open_field(&ln[..pos], &ln[pos + "\\field".len()..], line);
        }

        let (flag, content) = match ln.split_once(char::is_whitespace) {
            Some((flag, content)) => (flag.to_lowercase(), content.trim()),
            None => (ln.to_lowercase(), ""),
        };

        if flag.starts_with("\\extensible:") {
            let count = flag.trim_start_matches("\\extensible:");
            let count = count.parse::<usize>().map_err(|_| self.malformed_number(&flag, count, line))?;
            self.record(&flag, line)?.extensible = count;
            return Ok(());
        }

        match flag.as_str() {
            "\\note" => {
                if content.starts_with("fields as indicated") || content.starts_with("For Week") {
                    self.record(&flag, line)?.fields_as_indicated = true;
                } else {
                    let record = self.record(&flag, line)?;
                    match record.fields.last_mut() {
                        Some(field) => append_text(&mut field.note, content),
                        None => append_text(&mut record.memo, content),
                    }
                }
            }

            // Object directives
            "\\memo" => append_text(&mut self.record(&flag, line)?.memo, content),
            "\\unique-object" => self.record(&flag, line)?.unique = true,
            "\\required-object" => self.record(&flag, line)?.required = true,
            "\\format" => self.record(&flag, line)?.format = Some(content.to_string()),
            "\\min-fields" => {
                let count = content
                    .parse::<usize>()
                    .map_err(|_| self.malformed_number(&flag, content, line))?;
                self.record(&flag, line)?.min_fields = count;
            }

            // Field directives
            "\\type" => {
                let field_type = FieldType::parse(content).ok_or_else(|| DictionaryError::MalformedField {
                    reason: format!("unknown \\type '{}'", content),
                    line,
                    source_name: self.source_name.to_string(),
                })?;
                self.field(&flag, line)?.field_type = Some(field_type);
            }
            "\\default" => {
                self.field(&flag, line)?;
                let record = self.records.len() - 1;
                let field = self.records[record].fields.len() - 1;
                self.defaults.push(PendingDefault {
                    record,
                    field,
                    text: content.to_string(),
                    line,
                });
            }
            "\\key" => self.field(&flag, line)?.keys.push(content.to_string()),
            "\\minimum" => {
                let bound = self.number(&flag, content, line)?;
                self.field(&flag, line)?.minimum = Some(bound);
            }
            "\\minimum>" => {
                let bound = self.number(&flag, content, line)?;
                self.field(&flag, line)?.minimum = Some(bound + STRICT_BOUND_EPSILON);
            }
            "\\maximum" => {
                let bound = self.number(&flag, content, line)?;
                self.field(&flag, line)?.maximum = Some(bound);
            }
            "\\maximum<" => {
                let bound = self.number(&flag, content, line)?;
                self.field(&flag, line)?.maximum = Some(bound - STRICT_BOUND_EPSILON);
            }
            "\\required-field" => self.field(&flag, line)?.required = true,
            "\\autosizable" => self.field(&flag, line)?.autosizable = true,
            "\\autocalculatable" => self.field(&flag, line)?.autocalculatable = true,
            "\\begin-extensible" => self.field(&flag, line)?.begin_extensible = true,
            "\\retaincase" => self.field(&flag, line)?.retaincase = true,
            "\\deprecated" => self.field(&flag, line)?.deprecated = true,
            "\\units" => self.field(&flag, line)?.units = Some(content.to_string()),
            "\\ip-units" => self.field(&flag, line)?.ip_units = Some(content.to_string()),
            "\\unitsbasedonfield" => {
                self.field(&flag, line)?.units_based_on_field = Some(content.to_string())
            }
            "\\object-list" => self.field(&flag, line)?.object_list.push(content.to_string()),
            "\\reference" | "\\reference-class-name" => {
                self.field(&flag, line)?.reference.push(content.to_string())
            }
            "\\external-list" => self.field(&flag, line)?.external_list = Some(content.to_string()),

            _ => {
                return Err(DictionaryError::UnknownDirective {
                    directive: flag,
                    line,
                    source_name: self.source_name.to_string(),
                })
            }
        }
        Ok(())
    }

    fn open_field(&mut self, prefix: &str, name: &str, line: usize) -> DictionaryResult<()> {
        let source_name = self.source_name.to_string();
        let slot = prefix.replace([',', ';'], "").trim().to_string();
        let kind = match slot.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('N') => FieldKind::Numeric,
            Some('A') => FieldKind::Alpha,
            _ => {
                return Err(DictionaryError::MalformedField {
                    reason: format!("slot '{}' is neither A<n> nor N<n>", slot),
                    line,
                    source_name,
                })
            }
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(DictionaryError::MalformedField {
                reason: format!("slot '{}' has no field name", slot),
                line,
                source_name,
            });
        }

        let record = self.record("\\field", line)?;
        let field_name = FieldName::new(name);
        if record.fields.iter().any(|f| f.name == field_name) {
            return Err(DictionaryError::DuplicateField {
                record_type: record.name.to_string(),
                field: name.to_string(),
            });
        }
        let mut field = FieldSchema::new(field_name, kind);
        field.slot = slot;
        record.fields.push(field);
        Ok(())
    }

    /// Resolves deferred defaults and builds the dictionary.
    fn finish(mut self) -> DictionaryResult<Dictionary> {
        let source_name = self.source_name;
        for pending in std::mem::take(&mut self.defaults) {
            let record = &mut self.records[pending.record];
            let field = &record.fields[pending.field];

            let input = if field.is_numeric() && Sentinel::parse(&pending.text).is_none() {
                let number = pending.text.trim().parse::<f64>().map_err(|_| DictionaryError::MalformedNumber {
                    directive: "\\default".into(),
                    text: pending.text.clone(),
                    line: pending.line,
                    source_name: source_name.to_string(),
                })?;
                InputValue::Number(number)
            } else {
                InputValue::Text(pending.text.clone())
            };

            let value = validate_value(&record.name, field, input).map_err(|e| DictionaryError::InvalidDefault {
                record_type: record.name.to_string(),
                field: field.name.to_string(),
                default: pending.text.clone(),
                reason: e.to_string(),
            })?;
            record.fields[pending.field].default = Some(value);
        }

        Ok(Dictionary::from_schemas(self.records))
    }

    fn record(&mut self, directive: &str, line: usize) -> DictionaryResult<&mut RecordSchema> {
        let source_name = self.source_name;
        self.records
            .last_mut()
            .ok_or_else(|| DictionaryError::DirectiveOutsideObject {
                directive: directive.to_string(),
                line,
                source_name: source_name.to_string(),
            })
    }

    fn field(&mut self, directive: &str, line: usize) -> DictionaryResult<&mut FieldSchema> {
        let source_name = self.source_name;
        self.record(directive, line)?
            .fields
            .last_mut()
            .ok_or_else(|| DictionaryError::DirectiveOutsideField {
                directive: directive.to_string(),
                line,
                source_name: source_name.to_string(),
            })
    }

    fn number(&self, directive: &str, content: &str, line: usize) -> DictionaryResult<f64> {
        content
            .parse::<f64>()
            .map_err(|_| self.malformed_number(directive, content, line))
    }

    fn malformed_number(&self, directive: &str, text: &str, line: usize) -> DictionaryError {
        DictionaryError::MalformedNumber {
            directive: directive.to_string(),
            text: text.to_string(),
            line,
            source_name: self.source_name.to_string(),
        }
    }
}

fn append_text(target: &mut String, content: &str) {
    if content.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(content);
}
