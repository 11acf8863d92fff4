//! Write-side and read-side string caches.
//!
//! Strings that recur in a payload (keywords, symbols, tag markers, long
//! map keys) are replaced by two- or three-character codes after their
//! first transmission. Both ends count cacheable strings in the same
//! order, so a code is just an index into that shared sequence. When the
//! code space is exhausted both caches reinitialize, again in lockstep.

use std::collections::HashMap;

use crate::constants::{
    BASE_CHAR_INDEX, CACHE_CODE_DIGITS, MAP_AS_ARRAY, MAX_CACHE_ENTRIES, MIN_SIZE_CACHEABLE,
};
use crate::parser::{JsonParser, Parsed};
use crate::{Error, Result};

/// A string is cacheable when it is long enough and is either a map key
/// or carries a keyword, symbol or tag prefix.
pub(crate) fn is_cacheable(s: &str, as_map_key: bool) -> bool {
    let b = s.as_bytes();
    b.len() >= MIN_SIZE_CACHEABLE
        && (as_map_key || (b[0] == b'~' && matches!(b[1], b':' | b'$' | b'#')))
}

/// Cache codes start with `^`; `"^ "` is the map marker, not a code.
pub(crate) fn is_cache_code(s: &str) -> bool {
    s.as_bytes().first() == Some(&b'^') && s != MAP_AS_ARRAY
}

pub(crate) fn index_to_code(index: usize) -> String {
    let hi = index / CACHE_CODE_DIGITS;
    let lo = index % CACHE_CODE_DIGITS;
    if hi == 0 {
        format!("^{}", (lo as u8 + BASE_CHAR_INDEX) as char)
    } else {
        format!(
            "^{}{}",
            (hi as u8 + BASE_CHAR_INDEX) as char,
            (lo as u8 + BASE_CHAR_INDEX) as char
        )
    }
}

pub(crate) fn code_to_index(code: &str) -> Result<usize> {
    let digit = |b: u8| -> Result<usize> {
        let d = b.wrapping_sub(BASE_CHAR_INDEX) as usize;
        if d < CACHE_CODE_DIGITS {
            Ok(d)
        } else {
            Err(Error::json(format!("invalid cache code `{code}`")))
        }
    };
    match code.as_bytes() {
        [b'^', lo] => digit(*lo),
        [b'^', hi, lo] => Ok(digit(*hi)? * CACHE_CODE_DIGITS + digit(*lo)?),
        _ => Err(Error::json(format!("invalid cache code `{code}`"))),
    }
}

/// Per-write-session map from cacheable strings to their codes.
pub(crate) struct WriteCache {
    cache: HashMap<String, String>,
    index: usize,
    enabled: bool,
}

impl WriteCache {
    pub(crate) fn new(enabled: bool) -> Self {
        WriteCache {
            cache: HashMap::new(),
            index: 0,
            enabled,
        }
    }

    fn init(&mut self) {
        self.cache.clear();
        self.index = 0;
    }

    /// Substitutes a previously seen cacheable string with its code.
    ///
    /// The first occurrence registers a code but still transmits the
    /// full string; the code goes on the wire from the second
    /// occurrence on.
    pub(crate) fn cache_write(&mut self, s: String, as_map_key: bool) -> String {
        if self.enabled && is_cacheable(&s, as_map_key) {
            if let Some(code) = self.cache.get(&s) {
                return code.clone();
            }
            if self.index == MAX_CACHE_ENTRIES {
                tracing::debug!("write cache rolled over");
                self.init();
            }
            let code = index_to_code(self.index);
            self.index += 1;
            self.cache.insert(s.clone(), code);
        }
        s
    }
}

/// Per-read-session list of parsed values for previously seen cacheable
/// strings, indexed by cache code.
pub(crate) struct ReadCache {
    cache: Vec<Parsed>,
    index: usize,
}

impl ReadCache {
    pub(crate) fn new() -> Self {
        ReadCache {
            cache: Vec::new(),
            index: 0,
        }
    }

    fn init(&mut self) {
        self.cache.clear();
        self.index = 0;
    }

    /// Resolves a cache code, or parses a string and remembers the
    /// result when the string is cacheable.
    pub(crate) fn cache_read(
        &mut self,
        s: &str,
        as_map_key: bool,
        parser: &JsonParser<'_>,
    ) -> Result<Parsed> {
        if !s.is_empty() && is_cache_code(s) {
            let idx = code_to_index(s)?;
            return self
                .cache
                .get(idx)
                .cloned()
                .ok_or_else(|| Error::json(format!("unknown cache code `{s}`")));
        }
        let parsed = parser.parse_string(s)?;
        if is_cacheable(s, as_map_key) {
            if self.index == MAX_CACHE_ENTRIES {
                tracing::debug!("read cache rolled over");
                self.init();
            }
            self.cache.push(parsed.clone());
            self.index += 1;
        }
        Ok(parsed)
    }
}
