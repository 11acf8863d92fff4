//! Character roles and cache parameters of the wire grammar.
//!
//! A handful of ASCII characters carry all of the format's structure when
//! they appear at the front of a string: `~` introduces a tagged scalar,
//! `~#` a tag marker, `^` a cache code, and `` ` `` is reserved. Strings
//! that naturally begin with one of these are escaped by prepending `~`.

/// Escape character; also the prefix of every tagged scalar.
pub const ESC: char = '~';
/// Tag character; `~#` marks a tag.
pub const TAG: char = '#';
/// Substitution character; prefix of cache codes and the map marker.
pub const SUB: char = '^';
/// Reserved for future use; escaped like `ESC` and `SUB`.
pub const RESERVED: char = '`';

pub const ESC_STR: &str = "~";
pub const ESC_TAG: &str = "~#";
pub const QUOTE_TAG: &str = "~#'";
/// First element of an array that encodes a map.
pub const MAP_AS_ARRAY: &str = "^ ";

/// Strings shorter than this are never cached.
pub const MIN_SIZE_CACHEABLE: usize = 4;
/// Size of the cache code alphabet.
pub const CACHE_CODE_DIGITS: usize = 44;
/// Caches roll over after this many entries.
pub const MAX_CACHE_ENTRIES: usize = CACHE_CODE_DIGITS * CACHE_CODE_DIGITS;
/// Code point of the first character of the code alphabet (`'0'`).
pub const BASE_CHAR_INDEX: u8 = 48;

/// Largest integer magnitude that survives a JSON double unscathed
/// (2^53 - 1). Integers beyond it are emitted as `~i` strings.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
