//! Dynamic records
//!
//! Records are built against a schema at runtime rather than generated as
//! typed structs. Access is by field name; values are the tagged `Value` union.

mod builder;
mod errors;
mod generic;
pub mod json;
mod value;

pub use builder::RecordBuilder;
pub use errors::{RecordError, RecordResult};
pub use generic::Record;
pub use value::Value;
