//! Object-graph model and canonical (de)serialization for the legacy
//! `project.pbxproj` format.
//!
//! The format is a comment-annotated, non-JSON property list keyed by
//! opaque references. This crate decodes it into a typed [`GraphStore`]
//! of records, preserves every field it does not understand, and
//! re-encodes byte-stable canonical text with the historical layout:
//! deterministic key order, per-type sections, synthesized `/* ... */`
//! comments, and context-sensitive quoting.
//!
//! ```no_run
//! use pbxproj_core::GraphStore;
//!
//! # fn main() -> Result<(), pbxproj_core::DecodeError> {
//! let text = std::fs::read_to_string("project.pbxproj").unwrap();
//! let mut graph = GraphStore::decode(&text)?;
//! for record in graph.dangling_records() {
//!     println!("dangling: {} ({})", record.id, record.tag);
//! }
//! let canonical = graph.encode();
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod record;
pub mod reference;
pub mod tag;
pub mod value;

pub use encoder::Encoder;
pub use error::{DecodeError, ParseError, SchemaError};
pub use graph::{GraphStore, ReferenceStyle};
pub use record::{Payload, Record};
pub use reference::Reference;
pub use tag::{ObjectKind, TagRegistry, TypeTag};
pub use value::{Dict, Value};
