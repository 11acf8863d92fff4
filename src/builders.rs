//! Pluggable accumulators for parsed collections.
//!
//! The parser never constructs a collection directly; it asks a builder
//! for an accumulator, feeds it items (or key/value pairs) as they are
//! decoded, and takes the finished value at the end. Collection-tagged
//! read handlers carry their own builder, which is how `set`, `list` and
//! `cmap` representations become distinct domain types from the same
//! array syntax.

use crate::map::TransitMap;
use crate::value::Set;
use crate::{Error, Result, Value};

/// Factory for array accumulators.
pub trait ArrayBuilder: Send + Sync {
    /// Starts a new accumulator. The size hint may be ignored.
    fn init(&self, size_hint: usize) -> Box<dyn ArrayAcc>;
}

/// An in-progress array.
pub trait ArrayAcc {
    fn add(&mut self, item: Value);
    fn complete(self: Box<Self>) -> Result<Value>;
}

/// Factory for map accumulators.
pub trait MapBuilder: Send + Sync {
    fn init(&self) -> Box<dyn MapAcc>;
}

/// An in-progress map.
pub trait MapAcc {
    fn add(&mut self, key: Value, value: Value);
    fn complete(self: Box<Self>) -> Result<Value>;
}

/// Builds plain [`Value::Array`] sequences; the parser's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArrayBuilder;

struct VecAcc {
    items: Vec<Value>,
}

impl ArrayBuilder for DefaultArrayBuilder {
    fn init(&self, size_hint: usize) -> Box<dyn ArrayAcc> {
        Box::new(VecAcc {
            items: Vec::with_capacity(size_hint),
        })
    }
}

impl ArrayAcc for VecAcc {
    fn add(&mut self, item: Value) {
        self.items.push(item);
    }

    fn complete(self: Box<Self>) -> Result<Value> {
        Ok(Value::Array(self.items))
    }
}

/// Builds [`Value::List`] sequences for the `list` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListBuilder;

struct ListAcc {
    items: Vec<Value>,
}

impl ArrayBuilder for ListBuilder {
    fn init(&self, size_hint: usize) -> Box<dyn ArrayAcc> {
        Box::new(ListAcc {
            items: Vec::with_capacity(size_hint),
        })
    }
}

impl ArrayAcc for ListAcc {
    fn add(&mut self, item: Value) {
        self.items.push(item);
    }

    fn complete(self: Box<Self>) -> Result<Value> {
        Ok(Value::List(self.items))
    }
}

/// Builds [`Value::Set`] collections for the `set` tag; duplicates are
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetBuilder;

struct SetAcc {
    set: Set,
}

impl ArrayBuilder for SetBuilder {
    fn init(&self, _size_hint: usize) -> Box<dyn ArrayAcc> {
        Box::new(SetAcc { set: Set::new() })
    }
}

impl ArrayAcc for SetAcc {
    fn add(&mut self, item: Value) {
        self.set.insert(item);
    }

    fn complete(self: Box<Self>) -> Result<Value> {
        Ok(Value::Set(self.set))
    }
}

/// Builds maps from the `cmap` tag's flat alternating key/value stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmapBuilder;

struct CmapAcc {
    map: TransitMap,
    pending_key: Option<Value>,
}

impl ArrayBuilder for CmapBuilder {
    fn init(&self, size_hint: usize) -> Box<dyn ArrayAcc> {
        Box::new(CmapAcc {
            map: TransitMap::with_capacity(size_hint / 2),
            pending_key: None,
        })
    }
}

impl ArrayAcc for CmapAcc {
    fn add(&mut self, item: Value) {
        match self.pending_key.take() {
            Some(key) => {
                self.map.insert(key, item);
            }
            None => self.pending_key = Some(item),
        }
    }

    fn complete(self: Box<Self>) -> Result<Value> {
        if self.pending_key.is_some() {
            return Err(Error::handler(
                "cmap representation has a key without a value",
            ));
        }
        Ok(Value::Map(self.map))
    }
}

/// Builds [`Value::Map`] associations; the parser's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMapBuilder;

struct MapEntriesAcc {
    map: TransitMap,
}

impl MapBuilder for DefaultMapBuilder {
    fn init(&self) -> Box<dyn MapAcc> {
        Box::new(MapEntriesAcc {
            map: TransitMap::new(),
        })
    }
}

impl MapAcc for MapEntriesAcc {
    fn add(&mut self, key: Value, value: Value) {
        self.map.insert(key, value);
    }

    fn complete(self: Box<Self>) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_builder_drops_duplicates() {
        let mut acc = SetBuilder.init(0);
        acc.add(Value::Int(1));
        acc.add(Value::Int(1));
        acc.add(Value::Int(2));
        let set = match acc.complete().unwrap() {
            Value::Set(s) => s,
            other => panic!("expected set, got {other:?}"),
        };
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_cmap_builder_pairs_alternating_items() {
        let mut acc = CmapBuilder.init(4);
        acc.add(Value::Array(vec![Value::Int(1), Value::Int(2)]));
        acc.add(Value::from("pair"));
        let map = match acc.complete().unwrap() {
            Value::Map(m) => m,
            other => panic!("expected map, got {other:?}"),
        };
        assert_eq!(
            map.get(&Value::Array(vec![Value::Int(1), Value::Int(2)])),
            Some(&Value::from("pair"))
        );
    }

    #[test]
    fn test_cmap_builder_rejects_dangling_key() {
        let mut acc = CmapBuilder.init(0);
        acc.add(Value::from("key"));
        assert!(acc.complete().is_err());
    }

    #[test]
    fn test_list_builder_preserves_order() {
        let mut acc = ListBuilder.init(2);
        acc.add(Value::Int(2));
        acc.add(Value::Int(1));
        assert_eq!(
            acc.complete().unwrap(),
            Value::List(vec![Value::Int(2), Value::Int(1)])
        );
    }
}
