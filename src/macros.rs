//! Convenience macro for building [`Value`](crate::Value) literals.

/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Arrays use brackets, maps use braces with `=>` between key and value
/// (keys are full values, not just strings), and `null` is spelled out.
/// Anything else goes through `Value::from`.
///
/// # Examples
///
/// ```rust
/// use transit::{transit, Value};
///
/// let doc = transit!({
///     "name" => "Alice",
///     "age" => 30,
///     "tags" => ["admin", "dev"],
///     "extra" => null
/// });
///
/// let map = doc.as_map().unwrap();
/// assert_eq!(map.get_str("age"), Some(&Value::Int(30)));
/// ```
#[macro_export]
macro_rules! transit {
    (null) => {
        $crate::Value::Null
    };
    ([ $( $elem:tt ),* $(,)? ]) => {
        $crate::Value::Array(vec![ $( $crate::transit!($elem) ),* ])
    };
    ({ $( $key:tt => $value:tt ),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::TransitMap::new();
        $( map.insert($crate::transit!($key), $crate::transit!($value)); )*
        $crate::Value::Map(map)
    }};
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{TransitMap, Value};

    #[test]
    fn test_builds_scalars() {
        assert_eq!(transit!(null), Value::Null);
        assert_eq!(transit!(42), Value::Int(42));
        assert_eq!(transit!("hi"), Value::from("hi"));
        assert_eq!(transit!(true), Value::Bool(true));
    }

    #[test]
    fn test_builds_nested_structures() {
        let v = transit!({
            "id" => 7,
            "points" => [[1, 2], [3, 4]],
        });
        let map = v.as_map().unwrap();
        assert_eq!(map.get_str("id"), Some(&Value::Int(7)));
        let points = map.get_str("points").and_then(Value::as_array).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_map_keys_are_values() {
        let v = transit!({ 1 => "one" });
        let mut expected = TransitMap::new();
        expected.insert(Value::Int(1), Value::from("one"));
        assert_eq!(v, Value::Map(expected));
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(transit!([]), Value::Array(vec![]));
        assert_eq!(transit!({}), Value::Map(TransitMap::new()));
    }
}
