//! IDF serializer
//!
//! A record renders as its type name followed by one line per positional
//! slot:
//!
//! ```text
//! Zone,
//!     Zone 1,                  !- Name
//!     1;                       !- Multiplier
//! ```
//!
//! Slots are emitted up to the last one that is required or has a value or
//! default, and never fewer than the type's `\min-fields`. Gaps before that
//! point are written as empty placeholders; only the tail is trimmed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::errors::{IdfError, IdfResult};
use crate::model::{ModelError, ModelResult, Record, Store};
use crate::observability::{log_event_with_fields, Event};

/// Column at which `!-` annotations start.
const ANNOTATION_COLUMN: usize = 25;

/// Output formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Append `!- <field name>` to every value line
    pub annotate: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { annotate: true }
    }
}

/// Number of positional slots to emit for a record.
pub fn used_field_count(record: &Record) -> usize {
    let schema = record.schema();
    let used = schema
        .fields
        .iter()
        .enumerate()
        .rev()
        .find(|(index, field)| field.required || record.effective_at(*index).is_some())
        .map_or(0, |(index, _)| index + 1);
    used.max(schema.min_fields).min(schema.fields.len())
}

/// Renders the value lines of a record: `value,` for every slot but the last,
/// `value;` for the last.
pub fn render(record: &Record) -> ModelResult<Vec<String>> {
    let count = used_field_count(record);
    let schema = record.schema();
    let mut lines = Vec::with_capacity(count);

    for (index, field) in schema.fields.iter().take(count).enumerate() {
        let terminator = if index + 1 == count { ';' } else { ',' };
        let text = match record.effective_at(index) {
            Some(value) => value.to_string(),
            None if field.required => {
                return Err(ModelError::MissingValueAtRender {
                    record_type: schema.name.to_string(),
                    field: field.name.to_string(),
                })
            }
            None => String::new(),
        };
        lines.push(format!("{}{}", text, terminator));
    }
    Ok(lines)
}

/// Writes one record, header line included.
pub fn write_record<W: Write>(record: &Record, writer: &mut W, options: WriteOptions) -> IdfResult<()> {
    let lines = render(record)?;
    let schema = record.schema();

    if lines.is_empty() {
        writeln!(writer, "{};", schema.name)?;
        return Ok(());
    }

    writeln!(writer, "{},", schema.name)?;
    for (line, field) in lines.iter().zip(schema.fields.iter()) {
        if options.annotate {
            writeln!(writer, "    {:<width$} !- {}", line, field.name, width = ANNOTATION_COLUMN)?;
        } else {
            writeln!(writer, "    {}", line)?;
        }
    }
    Ok(())
}

/// Writes every record of the store, separated by blank lines.
pub fn write_store<W: Write>(store: &Store, writer: &mut W, options: WriteOptions) -> IdfResult<()> {
    let mut count = 0usize;
    for record in store.records() {
        write_record(record, writer, options)?;
        writeln!(writer)?;
        count += 1;
    }
    writer.flush()?;

    log_event_with_fields(Event::ModelWritten, &[("records", count.to_string().as_str())]);
    Ok(())
}

/// Renders the whole store to a string.
pub fn render_store(store: &Store, options: WriteOptions) -> IdfResult<String> {
    let mut buffer = Vec::new();
    write_store(store, &mut buffer, options)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the store to a file, replacing it.
pub fn save(store: &Store, path: &Path, options: WriteOptions) -> IdfResult<()> {
    let file = File::create(path).map_err(|e| IdfError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    write_store(store, &mut writer, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::instantiate;
    use crate::schema::{FieldSchema, RecordSchema};
    use crate::value::{Inputs, Value};
    use std::sync::Arc;

    fn zone_schema() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::new("Zone")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::numeric("Multiplier").with_default(Value::Numeric(1.0))),
        )
    }

    fn surface_schema() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::new("Shading:Site")
                .with_field(FieldSchema::required_alpha("Name"))
                .with_field(FieldSchema::optional_alpha("Transmittance Schedule Name"))
                .with_field(FieldSchema::numeric("Number of Vertices"))
                .with_field(FieldSchema::numeric("Vertex 1 X-coordinate"))
                .with_field(FieldSchema::numeric("Vertex 1 Y-coordinate")),
        )
    }

    #[test]
    fn test_render_uses_default() {
        let record = instantiate(&zone_schema(), &Inputs::new().with("name", "Zone 1")).unwrap();
        assert_eq!(render(&record).unwrap(), vec!["Zone 1,", "1;"]);
    }

    #[test]
    fn test_render_keeps_inner_gaps_trims_tail() {
        let schema = surface_schema();
        let record = instantiate(
            &schema,
            &Inputs::new().with("name", "Tree").with("vertex 1 x-coordinate", 2.5),
        )
        .unwrap();
        assert_eq!(render(&record).unwrap(), vec!["Tree,", ",", ",", "2.5;"]);

        let bare = instantiate(&schema, &Inputs::new().with("name", "Tree")).unwrap();
        assert_eq!(render(&bare).unwrap(), vec!["Tree;"]);
    }

    #[test]
    fn test_min_fields_floor() {
        let mut schema = (*surface_schema()).clone();
        schema.min_fields = 3;
        let record = instantiate(&Arc::new(schema), &Inputs::new().with("name", "Tree")).unwrap();
        assert_eq!(render(&record).unwrap(), vec!["Tree,", ",", ";"]);
    }

    #[test]
    fn test_required_field_forces_placeholders() {
        let schema = Arc::new(
            RecordSchema::new("Pair")
                .with_field(FieldSchema::optional_alpha("First"))
                .with_field(FieldSchema::required_alpha("Second")),
        );
        let record = instantiate(&schema, &Inputs::new().with("second", "b")).unwrap();
        assert_eq!(render(&record).unwrap(), vec![",", "b;"]);
    }

    #[test]
    fn test_write_record_annotated() {
        let record = instantiate(&zone_schema(), &Inputs::new().with("name", "Zone 1")).unwrap();
        let mut out = Vec::new();
        write_record(&record, &mut out, WriteOptions { annotate: true }).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Zone,");
        assert!(lines[1].starts_with("    Zone 1,"));
        assert!(lines[1].ends_with("!- Name"));
        assert!(lines[2].starts_with("    1;"));
        assert!(lines[2].ends_with("!- Multiplier"));
    }

    #[test]
    fn test_write_record_plain_and_empty() {
        let record = instantiate(&zone_schema(), &Inputs::new().with("name", "Zone 1")).unwrap();
        let mut out = Vec::new();
        write_record(&record, &mut out, WriteOptions { annotate: false }).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Zone,\n    Zone 1,\n    1;\n");

        let empty = Arc::new(RecordSchema::new("Output:Surfaces:List").with_field(FieldSchema::optional_alpha("Report Type")));
        let record = instantiate(&empty, &Inputs::new()).unwrap();
        let mut out = Vec::new();
        write_record(&record, &mut out, WriteOptions { annotate: false }).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Output:Surfaces:List;\n");
    }
}
