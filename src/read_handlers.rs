//! Read handlers: how tags and representations become values.
//!
//! The parser resolves every tag it meets through a [`ReadHandlerMap`].
//! Scalar tags decode through a [`ReadHandler`]'s from-rep function;
//! collection tags (`set`, `list`, `cmap`) carry a builder instead and
//! accumulate their elements as they stream by. Unknown tags fall
//! through to a configurable default that wraps the representation in a
//! [`TaggedValue`](crate::TaggedValue).
//!
//! ## Custom handlers
//!
//! ```rust
//! use transit::{ReadHandler, Reader, TagHandler, Value};
//!
//! let reader = Reader::new().with_handler(
//!     "point",
//!     TagHandler::Scalar(ReadHandler::new(|rep| {
//!         let map = rep.as_map().ok_or_else(|| {
//!             transit::Error::malformed_tag("point", "expected a map")
//!         })?;
//!         let x = map.get_str("x").and_then(|v| v.as_f64()).unwrap_or(0.0);
//!         let y = map.get_str("y").and_then(|v| v.as_f64()).unwrap_or(0.0);
//!         Ok(Value::Array(vec![Value::Float(x), Value::Float(y)]))
//!     })),
//! );
//! let v = reader.read(r#"["~#point",["^ ","x",1.0,"y",2.0]]"#).unwrap();
//! assert_eq!(v, Value::Array(vec![Value::Float(1.0), Value::Float(2.0)]));
//! ```

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use url::Url;
use uuid::Uuid;

use crate::builders::{ArrayBuilder, CmapBuilder, ListBuilder, MapBuilder, SetBuilder};
use crate::decimal::BigDec;
use crate::value::{Link, TaggedValue};
use crate::{Error, Result, Value};

/// Decodes a scalar tag's representation into a value.
pub struct ReadHandler {
    from_rep: Box<dyn Fn(Value) -> Result<Value> + Send + Sync>,
}

impl ReadHandler {
    pub fn new(from_rep: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        ReadHandler {
            from_rep: Box::new(from_rep),
        }
    }

    pub(crate) fn from_rep(&self, rep: Value) -> Result<Value> {
        (self.from_rep)(rep)
    }
}

/// A collection tag whose array representation accumulates through a
/// builder.
pub struct ArrayReadHandler {
    builder: Arc<dyn ArrayBuilder>,
}

impl ArrayReadHandler {
    pub fn new(builder: Arc<dyn ArrayBuilder>) -> Self {
        ArrayReadHandler { builder }
    }

    pub(crate) fn builder(&self) -> &dyn ArrayBuilder {
        self.builder.as_ref()
    }
}

/// A collection tag whose map representation accumulates through a
/// builder.
pub struct MapReadHandler {
    builder: Arc<dyn MapBuilder>,
}

impl MapReadHandler {
    pub fn new(builder: Arc<dyn MapBuilder>) -> Self {
        MapReadHandler { builder }
    }

    pub(crate) fn builder(&self) -> &dyn MapBuilder {
        self.builder.as_ref()
    }
}

/// A registry entry: how one tag is decoded.
pub enum TagHandler {
    Scalar(ReadHandler),
    Array(ArrayReadHandler),
    Map(MapReadHandler),
}

/// Fallback for tags with no registered handler.
pub type DefaultTagHandler = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// Wraps unknown tags in a [`TaggedValue`](crate::TaggedValue) so they
/// survive a round trip.
#[must_use]
pub fn default_tag_handler() -> DefaultTagHandler {
    Arc::new(|tag, rep| Ok(Value::Tagged(TaggedValue::new(tag, rep))))
}

/// The reader's tag registry. User-supplied entries override defaults.
pub struct ReadHandlerMap {
    handlers: HashMap<String, Arc<TagHandler>>,
}

impl ReadHandlerMap {
    /// The default handler set for every built-in tag.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut map = ReadHandlerMap {
            handlers: HashMap::new(),
        };
        map.insert("_", TagHandler::Scalar(ReadHandler::new(|_| Ok(Value::Null))));
        map.insert(
            "?",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                Ok(Value::Bool(rep.as_str() == Some("t")))
            })),
        );
        // `s` is the identity escape.
        map.insert("s", TagHandler::Scalar(ReadHandler::new(Ok)));
        map.insert("'", TagHandler::Scalar(ReadHandler::new(Ok)));
        map.insert(
            "i",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("i", &rep)?;
                let i = i64::from_str(s).map_err(|e| Error::malformed_tag("i", e))?;
                Ok(Value::Int(i))
            })),
        );
        map.insert(
            "d",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("d", &rep)?;
                let f = f64::from_str(s).map_err(|e| Error::malformed_tag("d", e))?;
                Ok(Value::Float(f))
            })),
        );
        map.insert(
            "z",
            TagHandler::Scalar(ReadHandler::new(|rep| match string_rep("z", &rep)? {
                "NaN" => Ok(Value::Float(f64::NAN)),
                "INF" => Ok(Value::Float(f64::INFINITY)),
                "-INF" => Ok(Value::Float(f64::NEG_INFINITY)),
                other => Err(Error::malformed_tag(
                    "z",
                    format!("unknown special number `{other}`"),
                )),
            })),
        );
        map.insert(
            "n",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("n", &rep)?;
                let i = BigInt::from_str(s).map_err(|e| Error::malformed_tag("n", e))?;
                Ok(Value::BigInt(i))
            })),
        );
        map.insert(
            "f",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("f", &rep)?;
                let d = BigDec::from_str(s).map_err(|e| Error::malformed_tag("f", e))?;
                Ok(Value::BigDec(d))
            })),
        );
        map.insert(
            "c",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("c", &rep)?;
                s.chars()
                    .next()
                    .map(Value::Char)
                    .ok_or_else(|| Error::malformed_tag("c", "empty representation"))
            })),
        );
        map.insert(
            "b",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("b", &rep)?;
                let bytes = BASE64.decode(s).map_err(|e| Error::malformed_tag("b", e))?;
                Ok(Value::Bytes(bytes))
            })),
        );
        map.insert("t", TagHandler::Scalar(ReadHandler::new(instant_from_rep)));
        map.insert("m", TagHandler::Scalar(ReadHandler::new(instant_from_rep)));
        map.insert(
            ":",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                Ok(Value::Keyword(string_rep(":", &rep)?.to_string()))
            })),
        );
        map.insert(
            "$",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                Ok(Value::Symbol(string_rep("$", &rep)?.to_string()))
            })),
        );
        map.insert(
            "u",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("u", &rep)?;
                let u = Uuid::parse_str(s).map_err(|e| Error::malformed_tag("u", e))?;
                Ok(Value::Uuid(u))
            })),
        );
        map.insert(
            "r",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let s = string_rep("r", &rep)?;
                let u = Url::parse(s).map_err(|e| Error::malformed_tag("r", e))?;
                Ok(Value::Uri(u))
            })),
        );
        map.insert(
            "ratio",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let parts = rep
                    .as_array()
                    .ok_or_else(|| Error::malformed_tag("ratio", "expected an array"))?;
                match parts {
                    [Value::Int(numer), Value::Int(denom)] => {
                        Ok(Value::Ratio(*numer, *denom))
                    }
                    _ => Err(Error::malformed_tag(
                        "ratio",
                        "expected a two-integer array",
                    )),
                }
            })),
        );
        map.insert(
            "link",
            TagHandler::Scalar(ReadHandler::new(|rep| {
                let m = rep
                    .as_map()
                    .ok_or_else(|| Error::malformed_tag("link", "expected a string map"))?;
                Ok(Value::Link(Link::from_map(m)?))
            })),
        );
        map.insert(
            "set",
            TagHandler::Array(ArrayReadHandler::new(Arc::new(SetBuilder))),
        );
        map.insert(
            "list",
            TagHandler::Array(ArrayReadHandler::new(Arc::new(ListBuilder))),
        );
        map.insert(
            "cmap",
            TagHandler::Array(ArrayReadHandler::new(Arc::new(CmapBuilder))),
        );
        map
    }

    /// Registers or overrides a tag handler.
    pub fn insert(&mut self, tag: impl Into<String>, handler: TagHandler) {
        self.handlers.insert(tag.into(), Arc::new(handler));
    }

    pub(crate) fn lookup(&self, tag: &str) -> Option<Arc<TagHandler>> {
        self.handlers.get(tag).cloned()
    }
}

impl Default for ReadHandlerMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn string_rep<'a>(tag: &str, rep: &'a Value) -> Result<&'a str> {
    rep.as_str()
        .ok_or_else(|| Error::malformed_tag(tag, "expected a string representation"))
}

/// Instants arrive as epoch milliseconds (number or string) or, from
/// verbose writers, as RFC 3339 text.
fn instant_from_rep(rep: Value) -> Result<Value> {
    let millis = match &rep {
        Value::Int(ms) => *ms,
        Value::String(s) => match i64::from_str(s) {
            Ok(ms) => ms,
            Err(_) => {
                let t = DateTime::parse_from_rfc3339(s)
                    .map_err(|e| Error::malformed_tag("t", e))?;
                return Ok(Value::Instant(t.with_timezone(&Utc)));
            }
        },
        _ => return Err(Error::malformed_tag("t", "expected milliseconds or text")),
    };
    DateTime::from_timestamp_millis(millis)
        .map(Value::Instant)
        .ok_or_else(|| Error::malformed_tag("t", format!("{millis} is out of range")))
}
