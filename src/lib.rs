//! # transit
//!
//! A reader and writer for the [Transit interchange
//! format](https://github.com/cognitect/transit-format), JSON variant.
//!
//! Transit layers a rich, extensible set of semantic types on top of
//! JSON: keywords, symbols, arbitrary-precision numbers, instants,
//! UUIDs, URIs, characters, binary data, sets, lists, maps with
//! composite keys, and user-defined tagged values. Frequently repeated
//! strings are compressed with cache codes, so payloads stay small
//! without losing self-description.
//!
//! ## Quick start
//!
//! ```rust
//! use transit::{from_str, to_string, transit, Value};
//!
//! let doc = transit!({
//!     "name" => "JW",
//!     "town" => "Enschede"
//! });
//!
//! let json = to_string(&doc).unwrap();
//! assert_eq!(json, r#"["^ ","name","JW","town","Enschede"]"#);
//!
//! let back = from_str(&json).unwrap();
//! assert_eq!(back, doc);
//! ```
//!
//! ## Rich scalars
//!
//! ```rust
//! use transit::{from_str, to_string, Value};
//! use uuid::Uuid;
//!
//! let id = Uuid::parse_str("dda5a83f-8f9d-4194-ae88-5745c8ca94a7").unwrap();
//! let json = to_string(&Value::Uuid(id)).unwrap();
//! assert_eq!(json, r#"["~#'","~udda5a83f-8f9d-4194-ae88-5745c8ca94a7"]"#);
//! assert_eq!(from_str(&json).unwrap(), Value::Uuid(id));
//! ```
//!
//! ## Sessions and extension
//!
//! [`Writer`] and [`Reader`] are the session types: one top-level form
//! per call, with handler registries merged at construction. Write
//! handlers are dispatched by value kind, or by `TypeId` for user types
//! wrapped in [`Value::Ext`]; read handlers are dispatched by tag.
//! Unknown tags survive round trips as [`TaggedValue`].
//!
//! ```rust
//! use transit::{from_str, Value};
//!
//! // No `point` handler registered: the value is preserved as-is.
//! let v = from_str(r#"["~#point",["^ ","x",1.5,"y",2.5]]"#).unwrap();
//! let tagged = match v {
//!     Value::Tagged(tv) => tv,
//!     other => panic!("expected tagged value, got {other:?}"),
//! };
//! assert_eq!(tagged.tag(), "point");
//! ```

pub mod builders;
pub mod constants;
pub mod decimal;
pub mod error;
pub mod macros;
pub mod map;
pub mod read_handlers;
pub mod reader;
pub mod spec;
pub mod value;
pub mod write_handlers;
pub mod writer;

mod cache;
mod emitter;
mod parser;

pub use decimal::BigDec;
pub use error::{Error, Result};
pub use map::TransitMap;
pub use read_handlers::{
    default_tag_handler, ArrayReadHandler, DefaultTagHandler, MapReadHandler, ReadHandler,
    ReadHandlerMap, TagHandler,
};
pub use reader::Reader;
pub use value::{ExtVal, Link, Render, Set, TaggedValue, Value, ValueKind};
pub use write_handlers::{TagProvider, WriteHandler, WriteHandlerMap};
pub use writer::{Writer, WriterOptions};

use std::io;

/// Writes one value as a Transit/JSON string.
///
/// # Examples
///
/// ```rust
/// use transit::{to_string, Value};
///
/// assert_eq!(to_string(&Value::Null).unwrap(), r#"["~#'",null]"#);
/// ```
///
/// # Errors
///
/// Returns an error when a value has no registered write handler or a
/// handler cannot produce a required representation.
pub fn to_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    Writer::new(&mut buf).write(value)?;
    String::from_utf8(buf).map_err(Error::custom)
}

/// Appends one value as a Transit/JSON form to an [`io::Write`] sink.
///
/// # Errors
///
/// Returns an error when emission fails or the sink reports a write
/// failure. The sink is not rewound on failure.
pub fn to_writer<W: io::Write>(writer: W, value: &Value) -> Result<()> {
    Writer::new(writer).write(value)
}

/// Reads one value from a Transit/JSON string.
///
/// # Examples
///
/// ```rust
/// use transit::{from_str, Value};
///
/// let v = from_str(r#"["~#'","~:status"]"#).unwrap();
/// assert_eq!(v, Value::keyword("status"));
/// ```
///
/// # Errors
///
/// Returns an error when the input is not valid JSON or a tag
/// representation cannot be decoded.
pub fn from_str(input: &str) -> Result<Value> {
    Reader::new().read(input)
}

/// Reads one value from an [`io::Read`] source.
///
/// # Errors
///
/// Returns an error when reading fails or the input cannot be decoded.
pub fn from_reader<R: io::Read>(reader: R) -> Result<Value> {
    Reader::new().read_from(reader)
}
