//! The write session façade.
//!
//! A [`Writer`] owns a sink, a handler registry and its options, and
//! appends one top-level form per [`write`](Writer::write) call. Each
//! call gets a fresh write cache; caches never outlive or cross a
//! top-level form.

use std::any::Any;
use std::io;
use std::sync::Arc;

use crate::cache::WriteCache;
use crate::emitter::{JsonEmitter, Marshaler};
use crate::value::ValueKind;
use crate::write_handlers::{WriteHandler, WriteHandlerMap};
use crate::{Result, Value};

/// Configuration for a write session.
///
/// # Examples
///
/// ```rust
/// use transit::WriterOptions;
///
/// let options = WriterOptions::new().with_cache(false);
/// assert!(!options.cache);
/// ```
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Whether repeated cacheable strings are replaced by cache codes.
    pub cache: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions { cache: true }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the write cache.
    #[must_use]
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

/// Writes Transit values as JSON text to an [`io::Write`] sink.
///
/// # Examples
///
/// ```rust
/// use transit::{Value, Writer};
///
/// let mut buf = Vec::new();
/// let mut writer = Writer::new(&mut buf);
/// writer.write(&Value::from("hello")).unwrap();
/// assert_eq!(String::from_utf8(buf).unwrap(), r#"["~#'","hello"]"#);
/// ```
pub struct Writer<W: io::Write> {
    w: W,
    handlers: WriteHandlerMap,
    options: WriterOptions,
}

impl<W: io::Write> Writer<W> {
    /// Creates a writer with the default handlers and options.
    pub fn new(w: W) -> Self {
        Writer {
            w,
            handlers: WriteHandlerMap::with_defaults(),
            options: WriterOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = options;
        self
    }

    /// Registers a handler for an extension type, overriding any
    /// previous entry for `T`.
    #[must_use]
    pub fn with_ext_handler<T: Any>(mut self, handler: Arc<dyn WriteHandler>) -> Self {
        self.handlers.insert_ext::<T>(handler);
        self
    }

    /// Overrides the handler for a built-in kind.
    #[must_use]
    pub fn with_kind_handler(mut self, kind: ValueKind, handler: Arc<dyn WriteHandler>) -> Self {
        self.handlers.insert_kind(kind, handler);
        self
    }

    /// Appends one top-level form to the sink.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        let mut cache = WriteCache::new(self.options.cache);
        let emitter = JsonEmitter::new(&mut self.w);
        let mut marshaler = Marshaler::new(emitter, &self.handlers);
        marshaler.marshal_top(value, &mut cache)?;
        tracing::trace!("wrote one top-level form");
        Ok(())
    }

    /// Consumes the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.w
    }

    /// Borrows the sink.
    pub fn get_ref(&self) -> &W {
        &self.w
    }
}
