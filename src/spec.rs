//! Wire Format Reference
//!
//! This module documents how Transit values are encoded on top of JSON,
//! as implemented by this crate. See
//! <https://github.com/cognitect/transit-format> for the full format
//! description.
//!
//! # Overview
//!
//! Transit is a self-describing, extensible interchange format layered
//! on a host format (here: JSON). Semantics beyond JSON's reach —
//! keywords, symbols, arbitrary-precision numbers, instants, UUIDs,
//! URIs, characters, binary data, sets, maps with composite keys,
//! user-defined types — are expressed with two devices:
//!
//! - **tag prefixes** inside strings, and
//! - **tagged values** as two-element arrays.
//!
//! # Tagged scalars
//!
//! A string starting with `~` carries a one-character tag and a payload:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `~_` | null |
//! | `~s<text>` | string (identity escape) |
//! | `~?t`, `~?f` | boolean |
//! | `~i<digits>` | integer |
//! | `~d<number>` | double |
//! | `~b<base64>` | binary |
//! | `~c<char>` | character |
//! | `~m<millis>` | instant, epoch milliseconds |
//! | `~t<rfc3339>` | instant, text form |
//! | `~u<uuid>` | UUID |
//! | `~r<uri>` | URI |
//! | `~n<digits>` | arbitrary-precision integer |
//! | `~f<decimal>` | arbitrary-precision decimal |
//! | `~zNaN`, `~zINF`, `~z-INF` | special doubles |
//! | `~:<name>` | keyword |
//! | `~$<name>` | symbol |
//!
//! A string whose first character is `~`, `^` or `` ` `` is escaped by
//! prepending `~`; readers strip one leading `~`.
//!
//! # Composite forms
//!
//! - **Tagged arrays**: `["~#<tag>", <rep>]` carry any tag with a
//!   composite (or scalar) representation. Built-in multi-character
//!   tags: `set`, `list`, `cmap`, `ratio`, `link`.
//! - **Map-as-array**: a map whose keys are all stringable is written
//!   `["^ ", k0, v0, k1, v1, ...]`.
//! - **cmap**: a map with composite keys is written
//!   `["~#cmap", [k0, v0, k1, v1, ...]]`.
//! - **Quoting**: a top-level scalar is wrapped so every document is
//!   composite: `24` becomes `["~#'",24]`.
//!
//! # Caching
//!
//! Strings at least four characters long are cached when they appear in
//! map-key position or start with `~:`, `~$` or `~#`. The first
//! occurrence is transmitted in full; later occurrences are replaced by
//! `^<c>` or `^<c><c>` codes drawn from a 44-character alphabet starting
//! at code point 48, giving 1936 codes before both sides reinitialize.
//! `^ ` is the map-as-array marker, never a cache code.
//!
//! ```text
//! [["^ ","name","JW","town","Enschede"],
//!  ["^ ","^0","JW","^1","Enschede"]]
//! ```
//!
//! # Numbers
//!
//! Integers within ±(2^53 − 1) are written as JSON numbers; anything
//! larger is stringified as `~i<digits>`, and map keys are always
//! stringified. Doubles that happen to be integral keep a trailing
//! `.0` so they read back as doubles. NaN and the infinities use the
//! `z` tag.
//!
//! # Extension
//!
//! Unknown tags round-trip as [`TaggedValue`](crate::TaggedValue):
//! reading `["~#point",["^ ","x",1.0,"y",2.0]]` without a `point`
//! handler yields a tagged value whose representation is a two-entry
//! map. Registering read and write handlers replaces that fallback with
//! domain types in both directions.
