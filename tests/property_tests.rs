//! Property-based round-trip guarantees across generated inputs.

use proptest::prelude::*;
use transit::{from_str, to_string, TransitMap, Value};

fn round_trips(value: &Value) -> bool {
    match to_string(value) {
        Ok(json) => match from_str(&json) {
            Ok(back) => back == *value,
            Err(e) => {
                eprintln!("read failed: {e}\nwire was: {json}");
                false
            }
        },
        Err(e) => {
            eprintln!("write failed: {e}");
            false
        }
    }
}

proptest! {
    #[test]
    fn prop_ints(n in any::<i64>()) {
        prop_assert!(round_trips(&Value::Int(n)));
    }

    // The default f64 strategy covers the full finite range.
    #[test]
    fn prop_floats(f in any::<f64>()) {
        prop_assert!(round_trips(&Value::Float(f)));
    }

    #[test]
    fn prop_bools(b in any::<bool>()) {
        prop_assert!(round_trips(&Value::Bool(b)));
    }

    #[test]
    fn prop_strings(s in any::<String>()) {
        prop_assert!(round_trips(&Value::from(s)));
    }

    // Escape idempotence: a reserved first character never leaks.
    #[test]
    fn prop_escaped_strings(prefix in "[~^`]", rest in any::<String>()) {
        let combined = format!("{}{}", prefix, rest);
        prop_assert!(round_trips(&Value::from(combined)));
    }

    #[test]
    fn prop_bytes(b in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert!(round_trips(&Value::Bytes(b)));
    }

    #[test]
    fn prop_keywords(name in "[a-z][a-z0-9-]{0,20}") {
        prop_assert!(round_trips(&Value::keyword(name)));
    }

    #[test]
    fn prop_int_arrays(v in prop::collection::vec(any::<i64>(), 0..20)) {
        prop_assert!(round_trips(&Value::Array(v.into_iter().map(Value::Int).collect())));
    }

    #[test]
    fn prop_string_maps(entries in prop::collection::vec((any::<String>(), any::<i64>()), 0..20)) {
        let map: TransitMap = entries
            .into_iter()
            .map(|(k, v)| (Value::from(k), Value::Int(v)))
            .collect();
        prop_assert!(round_trips(&Value::Map(map)));
    }

    // Repeated cacheable strings decode to the same sequence they
    // encoded from.
    #[test]
    fn prop_cache_consistency(
        names in prop::collection::vec("[a-z]{4,12}", 1..20),
        repeats in 2usize..5,
    ) {
        let mut items = Vec::new();
        for _ in 0..repeats {
            for name in &names {
                items.push(Value::keyword(name.clone()));
            }
        }
        prop_assert!(round_trips(&Value::Array(items)));
    }
}
