//! Schema model
//!
//! A schema is parsed once from its JSON text and is immutable afterwards.
//! Records, the codec and containers all share it through `Arc<Schema>`.
//!
//! # Design Principles
//!
//! - Field order is significant: the binary encoding has no field tags
//! - Field names are unique
//! - Defaults are literals of the declared field type
//! - Equality is structural

mod errors;
mod parser;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use types::{FieldSpec, FieldType, Schema};
