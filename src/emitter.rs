//! The emitter: value graph in, host JSON out.
//!
//! [`Marshaler`] is the format-level dispatch: it resolves a value to
//! its write handler, decides between the scalar, tagged-array and
//! map-as-array forms, and recurses over representations. It talks to an
//! abstract [`Emitter`] sink; [`JsonEmitter`] is the JSON text backend,
//! which owns all JSON concerns (punctuation, string escaping, number
//! formatting).

use std::borrow::Cow;
use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::cache::WriteCache;
use crate::constants::{ESC_STR, ESC_TAG, MAP_AS_ARRAY, MAX_SAFE_INTEGER};
use crate::map::TransitMap;
use crate::write_handlers::{WriteHandler, WriteHandlerMap};
use crate::{Error, Result, Value};

/// The abstract token sink the marshaler writes against.
pub(crate) trait Emitter {
    fn emit_null(&mut self, as_map_key: bool, cache: &mut WriteCache) -> Result<()>;
    fn emit_bool(&mut self, b: bool, as_map_key: bool, cache: &mut WriteCache) -> Result<()>;
    fn emit_int(&mut self, i: i64, as_map_key: bool, cache: &mut WriteCache) -> Result<()>;
    fn emit_float(&mut self, f: f64, as_map_key: bool, cache: &mut WriteCache) -> Result<()>;
    fn emit_string(
        &mut self,
        prefix: &str,
        tag: &str,
        s: &str,
        as_map_key: bool,
        cache: &mut WriteCache,
    ) -> Result<()>;
    fn emit_bytes(&mut self, b: &[u8], as_map_key: bool, cache: &mut WriteCache) -> Result<()>;
    fn array_start(&mut self, size: Option<usize>) -> Result<()>;
    fn array_end(&mut self) -> Result<()>;
    fn map_start(&mut self, size: Option<usize>) -> Result<()>;
    fn map_end(&mut self) -> Result<()>;
    fn prefers_strings(&self) -> bool;
    fn flush(&mut self) -> Result<()>;
}

/// Prepends the escape character when a string's first character would
/// otherwise read as wire structure.
pub(crate) fn escape(s: &str) -> Cow<'_, str> {
    if matches!(s.as_bytes().first(), Some(b'~' | b'^' | b'`')) {
        Cow::Owned(format!("{ESC_STR}{s}"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Formats a finite double. Integral values keep a trailing `.0` so they
/// come back as doubles, whatever their magnitude.
pub(crate) fn format_float(f: f64) -> String {
    if f == f.trunc() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn maybe_prefix(prefix: &str, tag: &str, s: &str) -> String {
    if prefix.is_empty() && tag.is_empty() {
        s.to_string()
    } else {
        format!("{prefix}{tag}{s}")
    }
}

/// Drives a value graph through the write handlers into an [`Emitter`].
pub(crate) struct Marshaler<'h, E> {
    emitter: E,
    handlers: &'h WriteHandlerMap,
}

impl<'h, E: Emitter> Marshaler<'h, E> {
    pub(crate) fn new(emitter: E, handlers: &'h WriteHandlerMap) -> Self {
        Marshaler { emitter, handlers }
    }

    /// Emits one top-level form. Scalars are quoted so the document is
    /// always a composite.
    pub(crate) fn marshal_top(&mut self, value: &Value, cache: &mut WriteCache) -> Result<()> {
        let handler = self.handlers.lookup(value)?;
        let tag = handler.tag(value, self.handlers);
        if tag.len() == 1 {
            self.emit_tagged("'", value, cache)?;
        } else {
            self.marshal(value, false, cache)?;
        }
        self.emitter.flush()
    }

    fn marshal(&mut self, value: &Value, as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        let handler = self.handlers.lookup(value)?;
        let tag = handler.tag(value, self.handlers);

        if tag.len() == 1 {
            match tag.as_bytes()[0] {
                b'_' => self.emitter.emit_null(as_map_key, cache),
                b's' => match handler.rep(value, self.handlers).as_ref() {
                    Value::String(s) => {
                        self.emitter
                            .emit_string("", "", &escape(s), as_map_key, cache)
                    }
                    _ => Err(Error::custom("string handler returned a non-string rep")),
                },
                b'?' => match handler.rep(value, self.handlers).as_ref() {
                    Value::Bool(b) => self.emitter.emit_bool(*b, as_map_key, cache),
                    _ => Err(Error::custom("boolean handler returned a non-bool rep")),
                },
                b'i' => match handler.rep(value, self.handlers).as_ref() {
                    Value::Int(i) => self.emitter.emit_int(*i, as_map_key, cache),
                    _ => Err(Error::custom("integer handler returned a non-integer rep")),
                },
                b'd' => match handler.rep(value, self.handlers).as_ref() {
                    Value::Float(f) => self.emitter.emit_float(*f, as_map_key, cache),
                    _ => Err(Error::custom("double handler returned a non-double rep")),
                },
                b'b' => match handler.rep(value, self.handlers).as_ref() {
                    Value::Bytes(bytes) => self.emitter.emit_bytes(bytes, as_map_key, cache),
                    _ => Err(Error::custom("binary handler returned a non-bytes rep")),
                },
                b'\'' => {
                    let rep = handler.rep(value, self.handlers);
                    self.emit_tagged(&tag, rep.as_ref(), cache)
                }
                _ => self.emit_encoded(&tag, handler.as_ref(), value, as_map_key, cache),
            }
        } else {
            match tag.as_ref() {
                "array" => {
                    let rep = handler.rep(value, self.handlers);
                    match rep.as_ref() {
                        Value::Array(items) => self.emit_array(items, cache),
                        _ => Err(Error::custom("array handler returned a non-array rep")),
                    }
                }
                "map" => {
                    let rep = handler.rep(value, self.handlers);
                    match rep.as_ref() {
                        Value::Map(m) => self.emit_map(m, cache),
                        _ => Err(Error::custom("map handler returned a non-map rep")),
                    }
                }
                _ => self.emit_encoded(&tag, handler.as_ref(), value, as_map_key, cache),
            }
        }
    }

    /// Tagged scalars become `"~<tag><rep>"` strings where possible and
    /// `["~#<tag>", rep]` arrays otherwise; multi-character tags never
    /// work as map keys.
    fn emit_encoded(
        &mut self,
        tag: &str,
        handler: &dyn WriteHandler,
        value: &Value,
        as_map_key: bool,
        cache: &mut WriteCache,
    ) -> Result<()> {
        if tag.len() == 1 {
            let rep = handler.rep(value, self.handlers);
            if let Value::String(s) = rep.as_ref() {
                self.emitter.emit_string(ESC_STR, tag, s, as_map_key, cache)
            } else if self.emitter.prefers_strings() || as_map_key {
                match handler.string_rep(value) {
                    Some(s) => self.emitter.emit_string(ESC_STR, tag, &s, as_map_key, cache),
                    None => Err(Error::string_rep_missing(value.kind())),
                }
            } else {
                self.emit_tagged(tag, rep.as_ref(), cache)
            }
        } else if as_map_key {
            Err(Error::non_stringable_key(value.kind()))
        } else {
            let rep = handler.rep(value, self.handlers);
            self.emit_tagged(tag, rep.as_ref(), cache)
        }
    }

    fn emit_tagged(&mut self, tag: &str, rep: &Value, cache: &mut WriteCache) -> Result<()> {
        self.emitter.array_start(Some(2))?;
        self.emitter.emit_string(ESC_TAG, tag, "", false, cache)?;
        self.marshal(rep, false, cache)?;
        self.emitter.array_end()
    }

    fn emit_array(&mut self, items: &[Value], cache: &mut WriteCache) -> Result<()> {
        self.emitter.array_start(Some(items.len()))?;
        for item in items {
            self.marshal(item, false, cache)?;
        }
        self.emitter.array_end()
    }

    /// Maps with stringable keys use the `["^ ", k0, v0, ...]` form.
    fn emit_map(&mut self, map: &TransitMap, cache: &mut WriteCache) -> Result<()> {
        self.emitter.array_start(Some(map.len() * 2 + 1))?;
        self.emitter.emit_string("", "", MAP_AS_ARRAY, false, cache)?;
        for (key, value) in map.iter() {
            self.marshal(key, true, cache)?;
            self.marshal(value, false, cache)?;
        }
        self.emitter.array_end()
    }
}

enum Ctx {
    Array { first: bool },
    Map { first: bool, next_is_key: bool },
}

/// Writes JSON text to an [`io::Write`](std::io::Write) sink.
pub(crate) struct JsonEmitter<W> {
    w: W,
    ctx: Vec<Ctx>,
}

impl<W: Write> JsonEmitter<W> {
    pub(crate) fn new(w: W) -> Self {
        JsonEmitter { w, ctx: Vec::new() }
    }

    /// Writes the separator the enclosing container requires before its
    /// next element.
    fn before_value(&mut self) -> Result<()> {
        match self.ctx.last_mut() {
            Some(Ctx::Array { first }) => {
                if *first {
                    *first = false;
                } else {
                    self.w.write_all(b",")?;
                }
            }
            Some(Ctx::Map { first, next_is_key }) => {
                if *next_is_key {
                    if *first {
                        *first = false;
                    } else {
                        self.w.write_all(b",")?;
                    }
                    *next_is_key = false;
                } else {
                    self.w.write_all(b":")?;
                    *next_is_key = true;
                }
            }
            None => {}
        }
        Ok(())
    }

    fn write_raw(&mut self, s: &str) -> Result<()> {
        self.before_value()?;
        self.w.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_json_string(&mut self, s: &str) -> Result<()> {
        self.before_value()?;
        self.w.write_all(b"\"")?;
        for c in s.chars() {
            match c {
                '"' => self.w.write_all(b"\\\"")?,
                '\\' => self.w.write_all(b"\\\\")?,
                '\n' => self.w.write_all(b"\\n")?,
                '\r' => self.w.write_all(b"\\r")?,
                '\t' => self.w.write_all(b"\\t")?,
                '\u{0008}' => self.w.write_all(b"\\b")?,
                '\u{000C}' => self.w.write_all(b"\\f")?,
                c if (c as u32) < 0x20 => {
                    write!(self.w, "\\u{:04x}", c as u32)?;
                }
                c => {
                    let mut buf = [0u8; 4];
                    self.w.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                }
            }
        }
        self.w.write_all(b"\"")?;
        Ok(())
    }
}

impl<W: Write> Emitter for JsonEmitter<W> {
    fn emit_null(&mut self, as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        if as_map_key {
            self.emit_string(ESC_STR, "_", "", as_map_key, cache)
        } else {
            self.write_raw("null")
        }
    }

    fn emit_bool(&mut self, b: bool, as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        if as_map_key {
            self.emit_string(ESC_STR, "?", if b { "t" } else { "f" }, as_map_key, cache)
        } else {
            self.write_raw(if b { "true" } else { "false" })
        }
    }

    fn emit_int(&mut self, i: i64, as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        if as_map_key || i.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
            self.emit_string(ESC_STR, "i", &i.to_string(), as_map_key, cache)
        } else {
            self.write_raw(&i.to_string())
        }
    }

    fn emit_float(&mut self, f: f64, as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        if as_map_key {
            self.emit_string(ESC_STR, "d", &format_float(f), as_map_key, cache)
        } else {
            self.write_raw(&format_float(f))
        }
    }

    fn emit_string(
        &mut self,
        prefix: &str,
        tag: &str,
        s: &str,
        as_map_key: bool,
        cache: &mut WriteCache,
    ) -> Result<()> {
        let out = cache.cache_write(maybe_prefix(prefix, tag, s), as_map_key);
        self.write_json_string(&out)
    }

    fn emit_bytes(&mut self, b: &[u8], as_map_key: bool, cache: &mut WriteCache) -> Result<()> {
        self.emit_string(ESC_STR, "b", &BASE64.encode(b), as_map_key, cache)
    }

    fn array_start(&mut self, _size: Option<usize>) -> Result<()> {
        self.before_value()?;
        self.w.write_all(b"[")?;
        self.ctx.push(Ctx::Array { first: true });
        Ok(())
    }

    fn array_end(&mut self) -> Result<()> {
        self.ctx.pop();
        self.w.write_all(b"]")?;
        Ok(())
    }

    fn map_start(&mut self, _size: Option<usize>) -> Result<()> {
        self.before_value()?;
        self.w.write_all(b"{")?;
        self.ctx.push(Ctx::Map {
            first: true,
            next_is_key: true,
        });
        Ok(())
    }

    fn map_end(&mut self) -> Result<()> {
        self.ctx.pop();
        self.w.write_all(b"}")?;
        Ok(())
    }

    fn prefers_strings(&self) -> bool {
        true
    }

    fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}
