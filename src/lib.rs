//! idfkit - EnergyPlus data dictionary (IDD) and input file (IDF) toolkit
//!
//! - `schema`: parses IDD text into record schemas
//! - `model`: validated records and the record store
//! - `idf`: reads and writes IDF text

pub mod cli;
pub mod idf;
pub mod model;
pub mod observability;
pub mod schema;
pub mod value;

pub use idf::{IdfError, IdfResult};
pub use model::{ModelError, ModelResult, Record, Store};
pub use schema::{Dictionary, DictionaryError, DictionaryLoader, RecordSchema};
pub use value::{InputValue, Inputs, Sentinel, Value};
