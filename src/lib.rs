//! aerorecord - schema-driven binary records with a self-describing container format
//!
//! Write path: `Schema` -> `RecordBuilder` -> `codec::encode` -> `ContainerWriter`.
//! Read path runs the same chain in reverse.

pub mod cli;
pub mod codec;
pub mod container;
pub mod record;
pub mod schema;

pub use codec::{decode, encode, CodecError};
pub use container::{ContainerConfig, ContainerError, ContainerReader, ContainerWriter};
pub use record::{Record, RecordBuilder, RecordError, Value};
pub use schema::{FieldSpec, FieldType, Schema, SchemaError};
