//! Self-describing record container files
//!
//! A container embeds its writer schema and free-form metadata in a header,
//! followed by checksummed record frames. Any reader can decode the file
//! without outside knowledge of the schema.
//!
//! # Lifecycle
//!
//! Writer: Created -> Writing -> Closed. Reader: Open -> Closed.
//! Operations on a closed handle fail with `ContainerError::Closed`.

mod config;
mod errors;
mod frame;
mod reader;
mod writer;

pub use config::ContainerConfig;
pub use errors::{ContainerError, ContainerResult};
pub use frame::{MAGIC, META_CREATED_AT, META_FILE_ID};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;
