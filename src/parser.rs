//! The parser: host JSON in, value graph out.
//!
//! The host tree is flattened into a token stream, and the state machine
//! pulls tokens through a `next`/`peek` cursor. Strings pass through the
//! read cache, which resolves cache codes and hands everything else to
//! [`JsonParser::parse_string`]; that is where the escape grammar lives.
//! Tag sentinels and the map-as-array marker travel as [`Parsed`]
//! variants between productions and never escape into the value model.

use std::collections::VecDeque;

use crate::builders::{ArrayBuilder, MapBuilder};
use crate::cache::ReadCache;
use crate::constants::MAP_AS_ARRAY;
use crate::read_handlers::{ArrayReadHandler, MapReadHandler, ReadHandlerMap, TagHandler};
use crate::{Error, Result, Value};

/// One host-layer token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    ArrayStart,
    ArrayEnd,
    MapStart,
    MapEnd,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Flattens a host JSON tree into the token stream the state machine
/// consumes. Numbers without a fractional part become integers.
fn tokenize(node: serde_json::Value, out: &mut VecDeque<Token>) {
    match node {
        serde_json::Value::Null => out.push_back(Token::Null),
        serde_json::Value::Bool(b) => out.push_back(Token::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_back(Token::Int(i));
            } else if let Some(f) = n.as_f64() {
                out.push_back(Token::Float(f));
            } else {
                out.push_back(Token::Null);
            }
        }
        serde_json::Value::String(s) => out.push_back(Token::Str(s)),
        serde_json::Value::Array(items) => {
            out.push_back(Token::ArrayStart);
            for item in items {
                tokenize(item, out);
            }
            out.push_back(Token::ArrayEnd);
        }
        serde_json::Value::Object(entries) => {
            out.push_back(Token::MapStart);
            for (key, value) in entries {
                out.push_back(Token::Str(key));
                tokenize(value, out);
            }
            out.push_back(Token::MapEnd);
        }
    }
}

/// A parse intermediate: a finished value, a tag sentinel awaiting its
/// representation, or the map-as-array marker.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Parsed {
    Val(Value),
    Tag(String),
    MapMarker,
}

impl Parsed {
    /// Collapses sentinels to their literal string form; they only mean
    /// something in the positions the grammar gives them.
    pub(crate) fn into_value(self) -> Value {
        match self {
            Parsed::Val(v) => v,
            Parsed::Tag(tag) => Value::String(format!("~#{tag}")),
            Parsed::MapMarker => Value::String(MAP_AS_ARRAY.to_string()),
        }
    }
}

/// Token-driven parser over one host JSON document.
pub(crate) struct JsonParser<'h> {
    tokens: VecDeque<Token>,
    handlers: &'h ReadHandlerMap,
    default_handler: &'h (dyn Fn(&str, Value) -> Result<Value> + Send + Sync),
    map_builder: &'h dyn MapBuilder,
    array_builder: &'h dyn ArrayBuilder,
}

impl<'h> JsonParser<'h> {
    pub(crate) fn new(
        root: serde_json::Value,
        handlers: &'h ReadHandlerMap,
        default_handler: &'h (dyn Fn(&str, Value) -> Result<Value> + Send + Sync),
        map_builder: &'h dyn MapBuilder,
        array_builder: &'h dyn ArrayBuilder,
    ) -> Self {
        let mut tokens = VecDeque::new();
        tokenize(root, &mut tokens);
        JsonParser {
            tokens,
            handlers,
            default_handler,
            map_builder,
            array_builder,
        }
    }

    fn next(&mut self) -> Result<Token> {
        self.tokens.pop_front().ok_or(Error::UnexpectedEof)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        let found = self.next()?;
        if found == *token {
            Ok(())
        } else {
            Err(Error::json(format!("expected {token:?}, found {found:?}")))
        }
    }

    /// Reads one top-level form.
    pub(crate) fn parse(&mut self, cache: &mut ReadCache) -> Result<Value> {
        match self.parse_val(false, cache)? {
            Parsed::Val(v) => Ok(v),
            Parsed::Tag(tag) => Err(Error::malformed_tag(
                &tag,
                "tag without a representation",
            )),
            Parsed::MapMarker => Ok(Value::String(MAP_AS_ARRAY.to_string())),
        }
    }

    fn parse_val(&mut self, as_map_key: bool, cache: &mut ReadCache) -> Result<Parsed> {
        match self.next()? {
            Token::MapStart => self.parse_map(cache, None).map(Parsed::Val),
            Token::ArrayStart => self.parse_array(cache, None).map(Parsed::Val),
            Token::Str(s) => cache.cache_read(&s, as_map_key, self),
            Token::Int(i) => Ok(Parsed::Val(Value::Int(i))),
            Token::Float(f) => Ok(Parsed::Val(Value::Float(f))),
            Token::Bool(b) => Ok(Parsed::Val(Value::Bool(b))),
            Token::Null => Ok(Parsed::Val(Value::Null)),
            found @ (Token::ArrayEnd | Token::MapEnd) => {
                Err(Error::json(format!("unexpected {found:?}")))
            }
        }
    }

    /// Applies the escape grammar to one string.
    pub(crate) fn parse_string(&self, s: &str) -> Result<Parsed> {
        let b = s.as_bytes();
        if b.len() > 1 {
            if b[0] == b'~' {
                return match b[1] {
                    b'~' | b'^' | b'`' => Ok(Parsed::Val(Value::String(s[1..].to_string()))),
                    b'#' => Ok(Parsed::Tag(s[2..].to_string())),
                    _ => self
                        .decode(&s[1..2], Value::String(s[2..].to_string()))
                        .map(Parsed::Val),
                };
            }
            if b[0] == b'^' && b[1] == b' ' {
                return Ok(Parsed::MapMarker);
            }
        }
        Ok(Parsed::Val(Value::String(s.to_string())))
    }

    /// Decodes a tagged string representation through its handler, or
    /// the default handler when the tag is unknown.
    fn decode(&self, tag: &str, rep: Value) -> Result<Value> {
        match self.handlers.lookup(tag) {
            Some(handler) => match handler.as_ref() {
                TagHandler::Scalar(h) => h.from_rep(rep),
                TagHandler::Array(_) | TagHandler::Map(_) => Err(Error::handler(format!(
                    "tag `{tag}` requires a composite representation"
                ))),
            },
            None => (self.default_handler)(tag, rep),
        }
    }

    /// Parses after an opening `[`. The first element decides the shape:
    /// the map marker turns the array into a map, a tag sentinel turns
    /// it into a tagged value, anything else accumulates through an
    /// array builder.
    fn parse_array(
        &mut self,
        cache: &mut ReadCache,
        handler: Option<&ArrayReadHandler>,
    ) -> Result<Value> {
        let builder = handler.map_or(self.array_builder, |h| h.builder());
        if matches!(self.peek(), Some(Token::ArrayEnd)) {
            self.next()?;
            return builder.init(0).complete();
        }

        match self.parse_val(false, cache)? {
            Parsed::MapMarker => self.parse_entries(Token::ArrayEnd, cache, self.map_builder),
            Parsed::Tag(tag) => {
                let value = self.parse_tagged(&tag, cache)?;
                self.expect(&Token::ArrayEnd)?;
                Ok(value)
            }
            Parsed::Val(first) => {
                let mut acc = builder.init(0);
                acc.add(first);
                while !self.peek_is(&Token::ArrayEnd) {
                    acc.add(self.parse_val(false, cache)?.into_value());
                }
                self.next()?;
                acc.complete()
            }
        }
    }

    /// Parses the representation that follows a tag sentinel. Collection
    /// handlers take over their own composite rep; everything else
    /// parses the rep generically and decodes through from-rep.
    fn parse_tagged(&mut self, tag: &str, cache: &mut ReadCache) -> Result<Value> {
        match self.handlers.lookup(tag) {
            Some(handler) => match handler.as_ref() {
                TagHandler::Map(mh) if matches!(self.peek(), Some(Token::MapStart)) => {
                    self.next()?;
                    self.parse_map(cache, Some(mh))
                }
                TagHandler::Array(ah) if matches!(self.peek(), Some(Token::ArrayStart)) => {
                    self.next()?;
                    self.parse_array(cache, Some(ah))
                }
                TagHandler::Scalar(h) => {
                    let rep = self.parse_val(false, cache)?.into_value();
                    h.from_rep(rep)
                }
                TagHandler::Map(_) | TagHandler::Array(_) => Err(Error::handler(format!(
                    "tag `{tag}` requires a composite representation"
                ))),
            },
            None => {
                let rep = self.parse_val(false, cache)?.into_value();
                (self.default_handler)(tag, rep)
            }
        }
    }

    fn parse_map(
        &mut self,
        cache: &mut ReadCache,
        handler: Option<&MapReadHandler>,
    ) -> Result<Value> {
        let builder = handler.map_or(self.map_builder, |h| h.builder());
        self.parse_entries(Token::MapEnd, cache, builder)
    }

    /// Parses key/value entries until the terminator, which is `}` for a
    /// host object and `]` for the map-as-array form. A tag sentinel in
    /// key position means the "map" is really a one-entry tagged-value
    /// encoding.
    fn parse_entries(
        &mut self,
        end: Token,
        cache: &mut ReadCache,
        builder: &dyn MapBuilder,
    ) -> Result<Value> {
        let mut acc = builder.init();
        while !self.peek_is(&end) {
            let key = self.parse_val(true, cache)?;
            if let Parsed::Tag(tag) = key {
                let value = self.parse_tagged(&tag, cache)?;
                self.expect(&end)?;
                return Ok(value);
            }
            let value = self.parse_val(false, cache)?.into_value();
            acc.add(key.into_value(), value);
        }
        self.next()?;
        acc.complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{DefaultArrayBuilder, DefaultMapBuilder};
    use crate::read_handlers::default_tag_handler;

    fn parse(input: &str) -> Result<Value> {
        let handlers = ReadHandlerMap::with_defaults();
        let default = default_tag_handler();
        let root: serde_json::Value = serde_json::from_str(input).unwrap();
        let mut parser = JsonParser::new(
            root,
            &handlers,
            default.as_ref(),
            &DefaultMapBuilder,
            &DefaultArrayBuilder,
        );
        let mut cache = ReadCache::new();
        parser.parse(&mut cache)
    }

    #[test]
    fn test_parse_string_applies_escape_grammar() {
        let handlers = ReadHandlerMap::with_defaults();
        let default = default_tag_handler();
        let parser = JsonParser::new(
            serde_json::Value::Null,
            &handlers,
            default.as_ref(),
            &DefaultMapBuilder,
            &DefaultArrayBuilder,
        );
        assert_eq!(
            parser.parse_string("~~tilde").unwrap(),
            Parsed::Val(Value::from("~tilde"))
        );
        assert_eq!(
            parser.parse_string("~#point").unwrap(),
            Parsed::Tag("point".to_string())
        );
        assert_eq!(parser.parse_string("^ ").unwrap(), Parsed::MapMarker);
        assert_eq!(
            parser.parse_string("plain").unwrap(),
            Parsed::Val(Value::from("plain"))
        );
        assert_eq!(
            parser.parse_string("~:kw").unwrap(),
            Parsed::Val(Value::keyword("kw"))
        );
        // One-character strings never decode.
        assert_eq!(
            parser.parse_string("~").unwrap(),
            Parsed::Val(Value::from("~"))
        );
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(parse("24").unwrap(), Value::Int(24));
        assert_eq!(parse("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("null").unwrap(), Value::Null);
    }

    #[test]
    fn test_bare_tag_is_an_error() {
        assert!(matches!(
            parse(r#""~#point""#),
            Err(Error::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_sentinels_degrade_mid_array() {
        assert_eq!(
            parse(r#"[1,"~#point"]"#).unwrap(),
            Value::Array(vec![Value::Int(1), Value::from("~#point")])
        );
    }

    #[test]
    fn test_host_objects_parse_as_maps() {
        let v = parse(r#"{"a":1}"#).unwrap();
        let map = v.as_map().unwrap();
        assert_eq!(map.get_str("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_truncated_input_is_eof() {
        let handlers = ReadHandlerMap::with_defaults();
        let default = default_tag_handler();
        let mut parser = JsonParser::new(
            serde_json::Value::Null,
            &handlers,
            default.as_ref(),
            &DefaultMapBuilder,
            &DefaultArrayBuilder,
        );
        let mut cache = ReadCache::new();
        parser.parse(&mut cache).unwrap();
        assert!(matches!(
            parser.parse(&mut cache),
            Err(Error::UnexpectedEof)
        ));
    }
}
