//! Schema Module
//!
//! Derives structural shapes from sample values and validates values against them.

mod model;
mod validator;

pub use model::{Datatype, SchemaKind, SchemaModel};
pub use validator::{SchemaMismatch, ValidationMode, Validator};
