//! Error types for reading and writing Transit data.
//!
//! All fallible operations in this crate return [`Result`]. Write-side
//! failures describe the value that could not be emitted; read-side
//! failures describe the malformed input. Cache rollover is not an error
//! and is handled silently.

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or
/// decoding Transit data.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error from the underlying sink or source.
    #[error("IO error: {0}")]
    Io(String),

    /// The host JSON layer rejected the input.
    #[error("host JSON error: {0}")]
    Json(String),

    /// No write handler is registered for the value (write side).
    #[error("no write handler for {0}")]
    UnsupportedType(String),

    /// A value whose tag is longer than one character was used as a map
    /// key in the string-keyed map form (write side).
    #[error("cannot use {0} as a map key")]
    NonStringableKey(String),

    /// A handler was asked for a string representation and did not
    /// provide one (write side).
    #[error("{0} cannot be encoded as a string")]
    StringRepMissing(String),

    /// A tag payload could not be decoded (read side).
    #[error("malformed `{tag}` representation: {msg}")]
    MalformedTag { tag: String, msg: String },

    /// The token stream ended before a form was complete (read side).
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A read or write handler reported a failure; propagated verbatim.
    #[error("handler error: {0}")]
    Handler(String),

    /// Generic message.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an IO error from a display message.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a host-JSON error from a display message.
    pub fn json<T: fmt::Display>(msg: T) -> Self {
        Error::Json(msg.to_string())
    }

    /// Creates an unsupported-type error naming the offending value.
    pub fn unsupported_type<T: fmt::Display>(what: T) -> Self {
        Error::UnsupportedType(what.to_string())
    }

    /// Creates a non-stringable-key error naming the offending key.
    pub fn non_stringable_key<T: fmt::Display>(what: T) -> Self {
        Error::NonStringableKey(what.to_string())
    }

    /// Creates a missing-string-representation error.
    pub fn string_rep_missing<T: fmt::Display>(what: T) -> Self {
        Error::StringRepMissing(what.to_string())
    }

    /// Creates a malformed-tag error for a representation that could not
    /// be decoded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use transit::Error;
    ///
    /// let err = Error::malformed_tag("u", "invalid UUID");
    /// assert!(err.to_string().contains("`u`"));
    /// ```
    pub fn malformed_tag<T: fmt::Display>(tag: &str, msg: T) -> Self {
        Error::MalformedTag {
            tag: tag.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a handler error.
    pub fn handler<T: fmt::Display>(msg: T) -> Self {
        Error::Handler(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
