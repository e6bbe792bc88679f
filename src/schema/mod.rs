//! Dictionary subsystem
//!
//! Parses the IDD dictionary language into record type descriptors. A
//! `RecordSchema` is an immutable template: records are instantiated from
//! it, never written back into it.

mod errors;
mod loader;
mod names;
mod parser;
mod types;

pub use errors::{DictionaryError, DictionaryResult};
pub use loader::{load_dictionary, normalize_version, Dictionary, DictionaryLoader};
pub use names::{FieldName, TypeName};
pub use parser::{parse_dictionary, STRICT_BOUND_EPSILON};
pub use types::{FieldKind, FieldSchema, FieldType, RecordSchema};
