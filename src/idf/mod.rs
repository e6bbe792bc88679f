//! IDF text format
//!
//! Reading turns text into raw records and feeds them through the store's
//! validation; writing renders stored records positionally. Text written by
//! this module reads back into an equal store.

mod errors;
mod reader;
mod writer;

pub use errors::{IdfError, IdfResult};
pub use reader::{raw_inputs, read_model, read_model_with, read_version, split_records, ImportOptions, RawRecord};
pub use writer::{render, render_store, save, used_field_count, write_record, write_store, WriteOptions};
