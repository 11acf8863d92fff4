//! The dynamic value model shared by the reader and the writer.
//!
//! [`Value`] is a tagged sum over every semantic type the format can
//! carry: the JSON-native scalars, the richer tagged scalars (keywords,
//! symbols, instants, UUIDs, URIs, characters, binary, big numbers), the
//! collection types, and two escape hatches — [`TaggedValue`] for tags
//! nobody handles and [`ExtVal`] for user types with registered
//! handlers.
//!
//! ## Creating values
//!
//! ```rust
//! use transit::{transit, Value};
//!
//! let v = Value::from("hello");
//! let kw = Value::keyword("status");
//! let doc = transit!({ "id" => 7, "tags" => ["a", "b"] });
//! assert!(doc.as_map().is_some());
//! ```

use crate::decimal::BigDec;
use crate::map::TransitMap;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// A dynamically-typed Transit value.
///
/// # Examples
///
/// ```rust
/// use transit::Value;
///
/// let v = Value::from(42);
/// assert!(v.is_int());
/// assert_eq!(v.as_i64(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
    BigDec(BigDec),
    String(String),
    Bytes(Vec<u8>),
    Char(char),
    /// A point in time with millisecond precision.
    Instant(DateTime<Utc>),
    Uuid(Uuid),
    Uri(Url),
    /// A keyword, written `~:name`. The stored name excludes the colon.
    Keyword(String),
    /// A symbol, written `~$name`.
    Symbol(String),
    /// A rational number as a numerator/denominator pair.
    Ratio(i64, i64),
    Array(Vec<Value>),
    /// An ordered sequence distinct from the plain array type.
    List(Vec<Value>),
    Set(Set),
    Map(TransitMap),
    /// A tagged value no handler claimed; round-trips unchanged.
    Tagged(TaggedValue),
    /// Forces the wrapped value to be emitted in the `["~#'", rep]` form.
    /// Top-level scalars are quoted automatically; constructing one by
    /// hand is rarely needed.
    Quote(Box<Value>),
    Link(Link),
    /// A user type dispatched by `TypeId` through registered handlers.
    Ext(ExtVal),
}

/// Discriminant of a [`Value`], used for write-handler dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    BigInt,
    Float,
    BigDec,
    String,
    Bytes,
    Char,
    Instant,
    Uuid,
    Uri,
    Keyword,
    Symbol,
    Ratio,
    Array,
    List,
    Set,
    Map,
    Tagged,
    Quote,
    Link,
    Ext,
}

impl ValueKind {
    /// A short lowercase name, used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::BigInt => "big integer",
            ValueKind::Float => "float",
            ValueKind::BigDec => "big decimal",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Char => "char",
            ValueKind::Instant => "instant",
            ValueKind::Uuid => "uuid",
            ValueKind::Uri => "uri",
            ValueKind::Keyword => "keyword",
            ValueKind::Symbol => "symbol",
            ValueKind::Ratio => "ratio",
            ValueKind::Array => "array",
            ValueKind::List => "list",
            ValueKind::Set => "set",
            ValueKind::Map => "map",
            ValueKind::Tagged => "tagged value",
            ValueKind::Quote => "quote",
            ValueKind::Link => "link",
            ValueKind::Ext => "extension type",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// The discriminant of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::Float(_) => ValueKind::Float,
            Value::BigDec(_) => ValueKind::BigDec,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Char(_) => ValueKind::Char,
            Value::Instant(_) => ValueKind::Instant,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Uri(_) => ValueKind::Uri,
            Value::Keyword(_) => ValueKind::Keyword,
            Value::Symbol(_) => ValueKind::Symbol,
            Value::Ratio(..) => ValueKind::Ratio,
            Value::Array(_) => ValueKind::Array,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
            Value::Tagged(_) => ValueKind::Tagged,
            Value::Quote(_) => ValueKind::Quote,
            Value::Link(_) => ValueKind::Link,
            Value::Ext(_) => ValueKind::Ext,
        }
    }

    /// Creates a keyword value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use transit::Value;
    ///
    /// let kw = Value::keyword("status");
    /// assert_eq!(kw, Value::Keyword("status".to_string()));
    /// ```
    pub fn keyword(name: impl Into<String>) -> Self {
        Value::Keyword(name.into())
    }

    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Creates a tagged value.
    pub fn tagged(tag: impl Into<String>, rep: Value) -> Self {
        Value::Tagged(TaggedValue::new(tag, rep))
    }

    /// Wraps a user type for handler-based dispatch.
    ///
    /// The writer must have a handler registered for `T` or emission
    /// fails with [`Error::UnsupportedType`].
    pub fn ext<T: Any + Send + Sync>(value: T) -> Self {
        Value::Ext(ExtVal::new(value))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value for floats and integers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements of an array or list.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&TransitMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::BigInt(v)
    }
}

impl From<BigDec> for Value {
    fn from(v: BigDec) -> Self {
        Value::BigDec(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Instant(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Url> for Value {
    fn from(v: Url) -> Self {
        Value::Uri(v)
    }
}

impl From<TransitMap> for Value {
    fn from(v: TransitMap) -> Self {
        Value::Map(v)
    }
}

impl From<Set> for Value {
    fn from(v: Set) -> Self {
        Value::Set(v)
    }
}

impl From<TaggedValue> for Value {
    fn from(v: TaggedValue) -> Self {
        Value::Tagged(v)
    }
}

impl From<Link> for Value {
    fn from(v: Link) -> Self {
        Value::Link(v)
    }
}

/// A `(tag, representation)` pair for tags without a registered handler.
///
/// The default read handler produces these for unknown tags, and the
/// writer emits them back in the same form, so unknown extensions
/// survive a round trip untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    tag: String,
    rep: Box<Value>,
}

impl TaggedValue {
    pub fn new(tag: impl Into<String>, rep: Value) -> Self {
        TaggedValue {
            tag: tag.into(),
            rep: Box::new(rep),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn rep(&self) -> &Value {
        &self.rep
    }

    #[must_use]
    pub fn into_rep(self) -> Value {
        *self.rep
    }
}

/// An insertion-ordered collection without duplicates.
///
/// Membership uses structural equality, so composite values work as
/// elements. Equality between sets ignores insertion order.
#[derive(Debug, Clone, Default)]
pub struct Set {
    items: Vec<Value>,
}

impl Set {
    #[must_use]
    pub fn new() -> Self {
        Set { items: Vec::new() }
    }

    /// Adds a value, returning `false` if an equal value was already
    /// present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|v| v == value)
    }

    /// Removes a value, returning `true` if it was present.
    pub fn remove(&mut self, value: &Value) -> bool {
        match self.items.iter().position(|v| v == value) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|v| other.contains(v))
    }
}

impl FromIterator<Value> for Set {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let mut set = Set::new();
        for v in iter {
            set.insert(v);
        }
        set
    }
}

impl IntoIterator for Set {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// How a [`Link`] should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    Link,
    Image,
}

impl Render {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Render::Link => "link",
            Render::Image => "image",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "link" => Ok(Render::Link),
            "image" => Ok(Render::Image),
            other => Err(Error::handler(format!(
                "render must be either 'link' or 'image', got '{other}'"
            ))),
        }
    }
}

/// A hypermedia link, written as a `~#link`-tagged string map.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    href: String,
    rel: String,
    name: Option<String>,
    prompt: Option<String>,
    render: Render,
}

impl Link {
    /// Creates a link. `href` and `rel` must be non-empty.
    pub fn new(
        href: impl Into<String>,
        rel: impl Into<String>,
        render: Render,
    ) -> Result<Self> {
        let href = href.into();
        let rel = rel.into();
        if href.is_empty() {
            return Err(Error::handler("value of href cannot be empty"));
        }
        if rel.is_empty() {
            return Err(Error::handler("value of rel cannot be empty"));
        }
        Ok(Link {
            href,
            rel,
            name: None,
            prompt: None,
            render,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub fn rel(&self) -> &str {
        &self.rel
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    #[must_use]
    pub fn render(&self) -> Render {
        self.render
    }

    /// Builds a link from its string-map representation.
    pub fn from_map(map: &TransitMap) -> Result<Self> {
        let field = |name: &str| -> Option<String> {
            map.get_str(name).and_then(|v| v.as_str()).map(String::from)
        };
        let render = Render::parse(&field("render").unwrap_or_default())?;
        let mut link = Link::new(
            field("href").unwrap_or_default(),
            field("rel").unwrap_or_default(),
            render,
        )?;
        link.name = field("name");
        link.prompt = field("prompt");
        Ok(link)
    }

    /// The string-map representation this link is written as.
    #[must_use]
    pub fn to_map(&self) -> TransitMap {
        let mut map = TransitMap::with_capacity(5);
        map.insert(Value::from("href"), Value::from(self.href.clone()));
        map.insert(Value::from("rel"), Value::from(self.rel.clone()));
        if let Some(name) = &self.name {
            map.insert(Value::from("name"), Value::from(name.clone()));
        }
        if let Some(prompt) = &self.prompt {
            map.insert(Value::from("prompt"), Value::from(prompt.clone()));
        }
        map.insert(Value::from("render"), Value::from(self.render.as_str()));
        map
    }
}

/// A shared, type-erased user value.
///
/// Write dispatch looks the wrapped type up by [`TypeId`] in the
/// writer's handler registry. Equality is by identity: two `ExtVal`s
/// are equal only when they share the same allocation.
#[derive(Clone)]
pub struct ExtVal {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ExtVal {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        ExtVal {
            inner: Arc::new(value),
        }
    }

    /// The `TypeId` of the wrapped value.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.inner.as_ref().type_id()
    }

    /// Borrows the wrapped value as `T`, if that is its type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use transit::Value;
    ///
    /// struct Point { x: f64, y: f64 }
    ///
    /// let v = Value::ext(Point { x: 1.0, y: 2.0 });
    /// if let Value::Ext(e) = &v {
    ///     assert_eq!(e.downcast_ref::<Point>().map(|p| p.x), Some(1.0));
    /// }
    /// ```
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for ExtVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtVal").field(&"..").finish()
    }
}

impl PartialEq for ExtVal {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_ignores_duplicates() {
        let mut set = Set::new();
        assert!(set.insert(Value::Int(1)));
        assert!(!set.insert(Value::Int(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a: Set = [Value::Int(1), Value::Int(2)].into_iter().collect();
        let b: Set = [Value::Int(2), Value::Int(1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_link_requires_href_and_rel() {
        assert!(Link::new("", "self", Render::Link).is_err());
        assert!(Link::new("http://example.com", "", Render::Link).is_err());
        let link = Link::new("http://example.com", "self", Render::Image).unwrap();
        assert_eq!(link.render(), Render::Image);
    }

    #[test]
    fn test_link_map_round_trip() {
        let link = Link::new("http://example.com/a", "self", Render::Link)
            .unwrap()
            .with_name("a");
        assert_eq!(Link::from_map(&link.to_map()).unwrap(), link);
    }

    #[test]
    fn test_link_rejects_bad_render() {
        let mut map = TransitMap::new();
        map.insert(Value::from("href"), Value::from("http://example.com"));
        map.insert(Value::from("rel"), Value::from("self"));
        map.insert(Value::from("render"), Value::from("video"));
        assert!(Link::from_map(&map).is_err());
    }

    #[test]
    fn test_ext_downcast_and_identity() {
        let e = ExtVal::new(42u32);
        assert_eq!(e.downcast_ref::<u32>(), Some(&42));
        assert!(e.downcast_ref::<i64>().is_none());
        assert_eq!(e, e.clone());
        assert_ne!(e, ExtVal::new(42u32));
    }
}
