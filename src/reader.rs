//! The read session façade.
//!
//! A [`Reader`] carries the tag registry, the default handler for
//! unknown tags, and the builders used for untagged collections. Each
//! [`read`](Reader::read) call parses exactly one top-level form with a
//! fresh read cache.

use std::io;
use std::sync::Arc;

use crate::builders::{ArrayBuilder, DefaultArrayBuilder, DefaultMapBuilder, MapBuilder};
use crate::cache::ReadCache;
use crate::parser::JsonParser;
use crate::read_handlers::{default_tag_handler, DefaultTagHandler, ReadHandlerMap, TagHandler};
use crate::{Result, Value};

/// Reads Transit values from JSON text.
///
/// # Examples
///
/// ```rust
/// use transit::{Reader, Value};
///
/// let reader = Reader::new();
/// let v = reader.read(r#"["~#'",24]"#).unwrap();
/// assert_eq!(v, Value::Int(24));
/// ```
pub struct Reader {
    handlers: ReadHandlerMap,
    default_handler: DefaultTagHandler,
    map_builder: Arc<dyn MapBuilder>,
    array_builder: Arc<dyn ArrayBuilder>,
}

impl Reader {
    /// Creates a reader with the default tag handlers.
    #[must_use]
    pub fn new() -> Self {
        Reader {
            handlers: ReadHandlerMap::with_defaults(),
            default_handler: default_tag_handler(),
            map_builder: Arc::new(DefaultMapBuilder),
            array_builder: Arc::new(DefaultArrayBuilder),
        }
    }

    /// Registers a tag handler, overriding any previous entry.
    #[must_use]
    pub fn with_handler(mut self, tag: impl Into<String>, handler: TagHandler) -> Self {
        self.handlers.insert(tag, handler);
        self
    }

    /// Replaces the fallback applied to unknown tags.
    #[must_use]
    pub fn with_default_handler(
        mut self,
        handler: impl Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        self.default_handler = Arc::new(handler);
        self
    }

    /// Replaces the builder used for untagged maps.
    #[must_use]
    pub fn with_map_builder(mut self, builder: Arc<dyn MapBuilder>) -> Self {
        self.map_builder = builder;
        self
    }

    /// Replaces the builder used for untagged arrays.
    #[must_use]
    pub fn with_array_builder(mut self, builder: Arc<dyn ArrayBuilder>) -> Self {
        self.array_builder = builder;
        self
    }

    /// Reads exactly one top-level form from a string.
    pub fn read(&self, input: &str) -> Result<Value> {
        let root: serde_json::Value = serde_json::from_str(input)?;
        let mut parser = JsonParser::new(
            root,
            &self.handlers,
            self.default_handler.as_ref(),
            self.map_builder.as_ref(),
            self.array_builder.as_ref(),
        );
        let mut cache = ReadCache::new();
        let value = parser.parse(&mut cache)?;
        tracing::trace!("read one top-level form");
        Ok(value)
    }

    /// Reads exactly one top-level form from an [`io::Read`] source.
    pub fn read_from(&self, mut source: impl io::Read) -> Result<Value> {
        let mut input = String::new();
        source.read_to_string(&mut input)?;
        self.read(&input)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}
