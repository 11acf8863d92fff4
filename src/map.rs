//! Ordered map type with arbitrary value keys.
//!
//! Transit maps may be keyed by any value, including floats, decimals and
//! composites, none of which implement `Hash + Eq`. [`TransitMap`] is
//! therefore an insertion-ordered association list with structural-
//! equality lookup. Emission walks entries in insertion order, which
//! keeps output deterministic; equality between maps ignores order, as a
//! map's contract demands.

use crate::Value;

/// An insertion-ordered map of Transit values to Transit values.
///
/// # Examples
///
/// ```rust
/// use transit::{TransitMap, Value};
///
/// let mut map = TransitMap::new();
/// map.insert(Value::from("name"), Value::from("Alice"));
/// map.insert(Value::Int(1), Value::from("one"));
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Alice"));
/// assert_eq!(map.get(&Value::Int(1)).and_then(|v| v.as_str()), Some("one"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransitMap {
    entries: Vec<(Value, Value)>,
}

impl TransitMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        TransitMap {
            entries: Vec::new(),
        }
    }

    /// Creates an empty map with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TransitMap {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts a key-value pair, returning the previous value for an
    /// equal key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        for (k, v) in &mut self.entries {
            if *k == key {
                return Some(std::mem::replace(v, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    /// Returns the value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value for a string key, if present.
    ///
    /// Convenience for the common string-keyed case; equivalent to
    /// calling [`get`](Self::get) with `Value::String`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, Value::String(s) if s == key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains an equal key.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// Order-insensitive: two maps are equal when they associate equal keys
/// with equal values.
impl PartialEq for TransitMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl FromIterator<(Value, Value)> for TransitMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let mut map = TransitMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for TransitMap {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Extend<(Value, Value)> for TransitMap {
    fn extend<T: IntoIterator<Item = (Value, Value)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_equal_keys() {
        let mut map = TransitMap::new();
        assert!(map.insert(Value::from("k"), Value::Int(1)).is_none());
        assert_eq!(
            map.insert(Value::from("k"), Value::Int(2)),
            Some(Value::Int(1))
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_composite_keys_use_structural_equality() {
        let mut map = TransitMap::new();
        let key = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        map.insert(key.clone(), Value::from("pair"));
        assert_eq!(
            map.get(&Value::Array(vec![Value::Int(1), Value::Int(2)])),
            Some(&Value::from("pair"))
        );
        assert!(map.contains_key(&key));
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a: TransitMap = [
            (Value::from("x"), Value::Int(1)),
            (Value::from("y"), Value::Int(2)),
        ]
        .into_iter()
        .collect();
        let b: TransitMap = [
            (Value::from("y"), Value::Int(2)),
            (Value::from("x"), Value::Int(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let map: TransitMap = [
            (Value::from("first"), Value::Int(1)),
            (Value::from("second"), Value::Int(2)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("first"), Value::from("second")]);
    }
}
