//! Record model for idfkit
//!
//! Records are instantiated from dictionary schemas and kept in a `Store`.
//!
//! # Design Principles
//!
//! - Validation happens once, when a raw input becomes a `Value`
//! - Schemas are templates; records own their values
//! - Uniqueness is enforced on insert; failures leave the store unchanged

mod errors;
mod record;
mod store;
mod validator;

pub use errors::{ModelError, ModelResult};
pub use record::Record;
pub use store::Store;
pub use validator::{instantiate, validate_value};
