//! Write handlers: how values become tags and representations.
//!
//! Every value the writer meets is resolved to a [`WriteHandler`], which
//! names the value's tag and unpacks it into a representation the
//! emitter can recurse on. Built-in handlers are dispatched by
//! [`ValueKind`]; user types wrapped in [`Value::Ext`] are dispatched by
//! `TypeId`. User-supplied entries override the defaults.
//!
//! ## Custom handlers
//!
//! ```rust
//! use std::borrow::Cow;
//! use std::sync::Arc;
//! use transit::{TagProvider, TransitMap, Value, WriteHandler, Writer};
//!
//! struct Point { x: f64, y: f64 }
//!
//! struct PointWriteHandler;
//!
//! impl WriteHandler for PointWriteHandler {
//!     fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
//!         Cow::Borrowed("point")
//!     }
//!
//!     fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
//!         let Some(p) = value.as_ext::<Point>() else {
//!             return Cow::Owned(Value::Null);
//!         };
//!         let mut map = TransitMap::new();
//!         map.insert(Value::from("x"), Value::Float(p.x));
//!         map.insert(Value::from("y"), Value::Float(p.y));
//!         Cow::Owned(Value::Map(map))
//!     }
//! }
//!
//! let mut buf = Vec::new();
//! let mut writer = Writer::new(&mut buf)
//!     .with_ext_handler::<Point>(Arc::new(PointWriteHandler));
//! writer.write(&Value::ext(Point { x: 1.0, y: 2.0 })).unwrap();
//! ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::SecondsFormat;

use crate::emitter::format_float;
use crate::value::ValueKind;
use crate::{Error, Result, Value};

/// Knows the tag of every writable value; implemented by
/// [`WriteHandlerMap`] and threaded through handler calls so composite
/// handlers can inspect their children.
pub trait TagProvider {
    /// The tag the registry would assign to a value, if any.
    fn tag_of(&self, value: &Value) -> Option<Cow<'static, str>>;
}

/// Converts one kind of value into a `(tag, representation)` pair for
/// the emitter.
pub trait WriteHandler: Send + Sync {
    /// The tag for this value. One-character tags mark scalars; longer
    /// tags mark composites.
    fn tag(&self, value: &Value, tags: &dyn TagProvider) -> Cow<'static, str>;

    /// The representation the emitter recurses on. Identity handlers
    /// borrow; restructuring handlers allocate.
    fn rep<'a>(&self, value: &'a Value, tags: &dyn TagProvider) -> Cow<'a, Value>;

    /// A string form of the representation, for sinks that prefer
    /// strings and for map keys. `None` means the value has no string
    /// form, which is an error when one is demanded.
    fn string_rep(&self, _value: &Value) -> Option<String> {
        None
    }

    /// An alternative handler for verbose output, if one exists.
    fn verbose_handler(&self) -> Option<Arc<dyn WriteHandler>> {
        None
    }
}

impl Value {
    /// Borrows the payload of a [`Value::Ext`] as `T`; handler
    /// convenience.
    #[must_use]
    pub fn as_ext<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Ext(e) => e.downcast_ref::<T>(),
            _ => None,
        }
    }
}

struct NilWriteHandler;

impl WriteHandler for NilWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("_")
    }

    fn rep<'a>(&self, _value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Owned(Value::Null)
    }

    fn string_rep(&self, _value: &Value) -> Option<String> {
        Some(String::new())
    }
}

struct BoolWriteHandler;

impl WriteHandler for BoolWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Borrowed(value)
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        value
            .as_bool()
            .map(|b| if b { "t" } else { "f" }.to_string())
    }
}

struct StringWriteHandler;

impl WriteHandler for StringWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("s")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Borrowed(value)
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        value.as_str().map(String::from)
    }
}

struct IntWriteHandler;

impl WriteHandler for IntWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("i")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Borrowed(value)
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        value.as_i64().map(|i| i.to_string())
    }
}

struct FloatWriteHandler;

impl WriteHandler for FloatWriteHandler {
    fn tag(&self, value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        match value {
            Value::Float(f) if f.is_nan() || f.is_infinite() => Cow::Borrowed("z"),
            _ => Cow::Borrowed("d"),
        }
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Float(f) if f.is_nan() => Cow::Owned(Value::from("NaN")),
            Value::Float(f) if *f == f64::INFINITY => Cow::Owned(Value::from("INF")),
            Value::Float(f) if *f == f64::NEG_INFINITY => Cow::Owned(Value::from("-INF")),
            _ => Cow::Borrowed(value),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Float(f) => Some(format_float(*f)),
            _ => None,
        }
    }
}

struct BigIntWriteHandler;

impl WriteHandler for BigIntWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("n")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::BigInt(i) => Cow::Owned(Value::String(i.to_string())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::BigInt(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

struct BigDecWriteHandler;

impl WriteHandler for BigDecWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("f")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::BigDec(d) => Cow::Owned(Value::String(d.to_string())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::BigDec(d) => Some(d.to_string()),
            _ => None,
        }
    }
}

struct BytesWriteHandler;

impl WriteHandler for BytesWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("b")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Borrowed(value)
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        value.as_bytes().map(|b| BASE64.encode(b))
    }
}

struct CharWriteHandler;

impl WriteHandler for CharWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("c")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Char(c) => Cow::Owned(Value::String(c.to_string())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }
}

/// Instants are written as milliseconds since the epoch under `m`; the
/// verbose alternative writes RFC 3339 text under `t`.
struct InstantWriteHandler;

impl WriteHandler for InstantWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("m")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Instant(t) => Cow::Owned(Value::Int(t.timestamp_millis())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Instant(t) => Some(t.timestamp_millis().to_string()),
            _ => None,
        }
    }

    fn verbose_handler(&self) -> Option<Arc<dyn WriteHandler>> {
        Some(Arc::new(VerboseInstantWriteHandler))
    }
}

struct VerboseInstantWriteHandler;

impl WriteHandler for VerboseInstantWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("t")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Instant(t) => Cow::Owned(Value::String(
                t.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Instant(t) => Some(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            _ => None,
        }
    }
}

struct UuidWriteHandler;

impl WriteHandler for UuidWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("u")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Uuid(u) => Cow::Owned(Value::String(u.to_string())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Uuid(u) => Some(u.to_string()),
            _ => None,
        }
    }
}

struct UriWriteHandler;

impl WriteHandler for UriWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("r")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Uri(u) => Cow::Owned(Value::String(u.as_str().to_string())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Uri(u) => Some(u.as_str().to_string()),
            _ => None,
        }
    }
}

struct KeywordWriteHandler;

impl WriteHandler for KeywordWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed(":")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Keyword(name) => Cow::Owned(Value::String(name.clone())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Keyword(name) => Some(name.clone()),
            _ => None,
        }
    }
}

struct SymbolWriteHandler;

impl WriteHandler for SymbolWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("$")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Symbol(name) => Cow::Owned(Value::String(name.clone())),
            _ => Cow::Owned(Value::Null),
        }
    }

    fn string_rep(&self, value: &Value) -> Option<String> {
        match value {
            Value::Symbol(name) => Some(name.clone()),
            _ => None,
        }
    }
}

struct RatioWriteHandler;

impl WriteHandler for RatioWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("ratio")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Ratio(numer, denom) => {
                Cow::Owned(Value::Array(vec![Value::Int(*numer), Value::Int(*denom)]))
            }
            _ => Cow::Owned(Value::Null),
        }
    }
}

struct ArrayWriteHandler;

impl WriteHandler for ArrayWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("array")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        Cow::Borrowed(value)
    }
}

struct ListWriteHandler;

impl WriteHandler for ListWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("list")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::List(items) => Cow::Owned(Value::Array(items.clone())),
            _ => Cow::Owned(Value::Null),
        }
    }
}

struct SetWriteHandler;

impl WriteHandler for SetWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("set")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Set(set) => Cow::Owned(Value::Array(set.iter().cloned().collect())),
            _ => Cow::Owned(Value::Null),
        }
    }
}

/// A key is stringable when it is a native string or its tag is a single
/// character; a map with only stringable keys uses the `map` form,
/// anything else the `cmap` form.
fn stringable_keys(map: &crate::TransitMap, tags: &dyn TagProvider) -> bool {
    map.keys().all(|key| match tags.tag_of(key) {
        Some(tag) => tag.len() == 1,
        None => key.is_string(),
    })
}

struct MapWriteHandler;

impl WriteHandler for MapWriteHandler {
    fn tag(&self, value: &Value, tags: &dyn TagProvider) -> Cow<'static, str> {
        match value {
            Value::Map(m) if stringable_keys(m, tags) => Cow::Borrowed("map"),
            _ => Cow::Borrowed("cmap"),
        }
    }

    fn rep<'a>(&self, value: &'a Value, tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Map(m) if stringable_keys(m, tags) => Cow::Borrowed(value),
            Value::Map(m) => {
                let mut flat = Vec::with_capacity(m.len() * 2);
                for (k, v) in m.iter() {
                    flat.push(k.clone());
                    flat.push(v.clone());
                }
                Cow::Owned(Value::Array(flat))
            }
            _ => Cow::Owned(Value::Null),
        }
    }
}

struct TaggedValueWriteHandler;

impl WriteHandler for TaggedValueWriteHandler {
    fn tag(&self, value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        match value {
            Value::Tagged(tv) => Cow::Owned(tv.tag().to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Tagged(tv) => Cow::Borrowed(tv.rep()),
            _ => Cow::Owned(Value::Null),
        }
    }
}

struct QuoteWriteHandler;

impl WriteHandler for QuoteWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("'")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Quote(inner) => Cow::Borrowed(inner.as_ref()),
            _ => Cow::Owned(Value::Null),
        }
    }
}

struct LinkWriteHandler;

impl WriteHandler for LinkWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("link")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        match value {
            Value::Link(link) => Cow::Owned(Value::Map(link.to_map())),
            _ => Cow::Owned(Value::Null),
        }
    }
}

/// The writer's handler registry: built-in kinds plus `TypeId`-keyed
/// entries for extension types.
pub struct WriteHandlerMap {
    by_kind: HashMap<ValueKind, Arc<dyn WriteHandler>>,
    by_type: HashMap<TypeId, Arc<dyn WriteHandler>>,
}

impl WriteHandlerMap {
    /// The default handler set covering every built-in kind.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut by_kind: HashMap<ValueKind, Arc<dyn WriteHandler>> = HashMap::new();
        by_kind.insert(ValueKind::Null, Arc::new(NilWriteHandler));
        by_kind.insert(ValueKind::Bool, Arc::new(BoolWriteHandler));
        by_kind.insert(ValueKind::Int, Arc::new(IntWriteHandler));
        by_kind.insert(ValueKind::BigInt, Arc::new(BigIntWriteHandler));
        by_kind.insert(ValueKind::Float, Arc::new(FloatWriteHandler));
        by_kind.insert(ValueKind::BigDec, Arc::new(BigDecWriteHandler));
        by_kind.insert(ValueKind::String, Arc::new(StringWriteHandler));
        by_kind.insert(ValueKind::Bytes, Arc::new(BytesWriteHandler));
        by_kind.insert(ValueKind::Char, Arc::new(CharWriteHandler));
        by_kind.insert(ValueKind::Instant, Arc::new(InstantWriteHandler));
        by_kind.insert(ValueKind::Uuid, Arc::new(UuidWriteHandler));
        by_kind.insert(ValueKind::Uri, Arc::new(UriWriteHandler));
        by_kind.insert(ValueKind::Keyword, Arc::new(KeywordWriteHandler));
        by_kind.insert(ValueKind::Symbol, Arc::new(SymbolWriteHandler));
        by_kind.insert(ValueKind::Ratio, Arc::new(RatioWriteHandler));
        by_kind.insert(ValueKind::Array, Arc::new(ArrayWriteHandler));
        by_kind.insert(ValueKind::List, Arc::new(ListWriteHandler));
        by_kind.insert(ValueKind::Set, Arc::new(SetWriteHandler));
        by_kind.insert(ValueKind::Map, Arc::new(MapWriteHandler));
        by_kind.insert(ValueKind::Tagged, Arc::new(TaggedValueWriteHandler));
        by_kind.insert(ValueKind::Quote, Arc::new(QuoteWriteHandler));
        by_kind.insert(ValueKind::Link, Arc::new(LinkWriteHandler));
        WriteHandlerMap {
            by_kind,
            by_type: HashMap::new(),
        }
    }

    /// Overrides the handler for a built-in kind.
    pub fn insert_kind(&mut self, kind: ValueKind, handler: Arc<dyn WriteHandler>) {
        self.by_kind.insert(kind, handler);
    }

    /// Registers a handler for an extension type.
    pub fn insert_ext<T: Any>(&mut self, handler: Arc<dyn WriteHandler>) {
        self.by_type.insert(TypeId::of::<T>(), handler);
    }

    /// Resolves the handler for a value.
    pub fn lookup(&self, value: &Value) -> Result<Arc<dyn WriteHandler>> {
        match value {
            Value::Ext(e) => self
                .by_type
                .get(&e.type_id())
                .cloned()
                .ok_or_else(|| Error::unsupported_type("unregistered extension type")),
            v => self
                .by_kind
                .get(&v.kind())
                .cloned()
                .ok_or_else(|| Error::unsupported_type(v.kind())),
        }
    }
}

impl Default for WriteHandlerMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TagProvider for WriteHandlerMap {
    fn tag_of(&self, value: &Value) -> Option<Cow<'static, str>> {
        self.lookup(value).ok().map(|h| h.tag(value, self))
    }
}
