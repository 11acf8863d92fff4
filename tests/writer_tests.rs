//! Wire-format assertions for the write side.
//!
//! Map entries emit in insertion order, so the expected strings are
//! exact.

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;

use chrono::DateTime;
use num_bigint::BigInt;
use transit::{
    to_string, transit, BigDec, Link, Render, Set, TagProvider, TransitMap, Value, WriteHandler,
    Writer, WriterOptions,
};
use url::Url;
use uuid::Uuid;

#[test]
fn test_writes_nil() {
    assert_eq!(to_string(&Value::Null).unwrap(), r#"["~#'",null]"#);
}

#[test]
fn test_writes_strings() {
    assert_eq!(
        to_string(&Value::from("a string")).unwrap(),
        r#"["~#'","a string"]"#
    );
}

#[test]
fn test_escapes_reserved_first_characters() {
    assert_eq!(to_string(&Value::from("~tilde")).unwrap(), r#"["~#'","~~tilde"]"#);
    assert_eq!(to_string(&Value::from("^caret")).unwrap(), r#"["~#'","~^caret"]"#);
    assert_eq!(to_string(&Value::from("`tick")).unwrap(), r#"["~#'","~`tick"]"#);
}

#[test]
fn test_writes_small_integers() {
    assert_eq!(to_string(&Value::Int(24)).unwrap(), r#"["~#'",24]"#);
}

#[test]
fn test_writes_big_integers_as_strings() {
    assert_eq!(
        to_string(&Value::Int(9_007_199_254_740_999)).unwrap(),
        r#"["~#'","~i9007199254740999"]"#
    );
    assert_eq!(
        to_string(&Value::Int(-9_007_199_254_740_999)).unwrap(),
        r#"["~#'","~i-9007199254740999"]"#
    );
}

#[test]
fn test_writes_floats() {
    assert_eq!(
        to_string(&Value::Float(3.14159265359)).unwrap(),
        r#"["~#'",3.14159265359]"#
    );
    // Integral doubles keep a fraction so they stay doubles on the way back.
    assert_eq!(to_string(&Value::Float(100.0)).unwrap(), r#"["~#'",100.0]"#);
    assert_eq!(
        to_string(&Value::Float(1e16)).unwrap(),
        r#"["~#'",10000000000000000.0]"#
    );
}

#[test]
fn test_writes_special_floats() {
    assert_eq!(
        to_string(&Value::Float(f64::NAN)).unwrap(),
        r#"["~#'","~zNaN"]"#
    );
    assert_eq!(
        to_string(&Value::Float(f64::INFINITY)).unwrap(),
        r#"["~#'","~zINF"]"#
    );
    assert_eq!(
        to_string(&Value::Float(f64::NEG_INFINITY)).unwrap(),
        r#"["~#'","~z-INF"]"#
    );
}

#[test]
fn test_writes_byte_slices() {
    assert_eq!(
        to_string(&Value::Bytes(b"hello world".to_vec())).unwrap(),
        r#"["~#'","~baGVsbG8gd29ybGQ="]"#
    );
}

#[test]
fn test_writes_instants_as_epoch_millis() {
    let t = DateTime::from_timestamp_millis(1_456_231_033_010).unwrap();
    assert_eq!(
        to_string(&Value::Instant(t)).unwrap(),
        r#"["~#'","~m1456231033010"]"#
    );
}

#[test]
fn test_writes_chars() {
    assert_eq!(to_string(&Value::Char('a')).unwrap(), r#"["~#'","~ca"]"#);
}

#[test]
fn test_writes_uuids() {
    let id = Uuid::parse_str("dda5a83f-8f9d-4194-ae88-5745c8ca94a7").unwrap();
    assert_eq!(
        to_string(&Value::Uuid(id)).unwrap(),
        r#"["~#'","~udda5a83f-8f9d-4194-ae88-5745c8ca94a7"]"#
    );
}

#[test]
fn test_writes_uris() {
    let url = Url::parse("http://example.com/search").unwrap();
    assert_eq!(
        to_string(&Value::Uri(url)).unwrap(),
        r#"["~#'","~rhttp://example.com/search"]"#
    );
}

#[test]
fn test_writes_keywords_and_symbols() {
    assert_eq!(
        to_string(&Value::keyword("status")).unwrap(),
        r#"["~#'","~:status"]"#
    );
    assert_eq!(
        to_string(&Value::symbol("conj")).unwrap(),
        r#"["~#'","~$conj"]"#
    );
}

#[test]
fn test_writes_big_numbers() {
    let n = BigInt::from_str("123456789012345678901234567890").unwrap();
    assert_eq!(
        to_string(&Value::BigInt(n)).unwrap(),
        r#"["~#'","~n123456789012345678901234567890"]"#
    );
    let d = BigDec::from_str("3.14159").unwrap();
    assert_eq!(
        to_string(&Value::BigDec(d)).unwrap(),
        r#"["~#'","~f3.14159"]"#
    );
}

#[test]
fn test_writes_simple_arrays_bare() {
    let arr = Value::Array((1..=4).map(Value::Int).collect());
    assert_eq!(to_string(&arr).unwrap(), "[1,2,3,4]");
}

#[test]
fn test_writes_empty_collections() {
    assert_eq!(to_string(&transit!([])).unwrap(), "[]");
    assert_eq!(to_string(&transit!({})).unwrap(), r#"["^ "]"#);
}

#[test]
fn test_writes_simple_maps_as_arrays() {
    let m = transit!({ "key" => 12 });
    assert_eq!(to_string(&m).unwrap(), r#"["^ ","key",12]"#);
}

#[test]
fn test_stringifies_non_string_map_keys() {
    let m = transit!({ 1 => "hello", 2 => "world" });
    assert_eq!(
        to_string(&m).unwrap(),
        r#"["^ ","~i1","hello","~i2","world"]"#
    );
}

#[test]
fn test_stringifies_scalar_map_keys() {
    let m = transit!({ true => 1, 2.5 => 2 });
    assert_eq!(to_string(&m).unwrap(), r#"["^ ","~?t",1,"~d2.5",2]"#);
}

#[test]
fn test_caches_repeated_map_keys() {
    let m = transit!({ "name" => "JW", "town" => "Enschede" });
    let a = Value::Array(vec![m.clone(), m.clone(), m]);
    assert_eq!(
        to_string(&a).unwrap(),
        concat!(
            r#"[["^ ","name","JW","town","Enschede"],"#,
            r#"["^ ","^0","JW","^1","Enschede"],"#,
            r#"["^ ","^0","JW","^1","Enschede"]]"#
        )
    );
}

#[test]
fn test_caches_repeated_keywords() {
    let a = Value::Array(vec![
        Value::keyword("status"),
        Value::keyword("status"),
        Value::keyword("status"),
    ]);
    assert_eq!(to_string(&a).unwrap(), r#"["~:status","^0","^0"]"#);
}

#[test]
fn test_cache_can_be_disabled() {
    let m = transit!({ "name" => "JW" });
    let a = Value::Array(vec![m.clone(), m]);
    let mut buf = Vec::new();
    let mut writer =
        Writer::new(&mut buf).with_options(WriterOptions::new().with_cache(false));
    writer.write(&a).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        r#"[["^ ","name","JW"],["^ ","name","JW"]]"#
    );
}

#[test]
fn test_writes_nested_maps() {
    let m = transit!({
        "id" => 12,
        "action" => "delete",
        "resource" => { "owner_id" => 5 }
    });
    assert_eq!(
        to_string(&m).unwrap(),
        r#"["^ ","id",12,"action","delete","resource",["^ ","owner_id",5]]"#
    );
}

#[test]
fn test_writes_composite_keys_as_cmap() {
    let mut m = TransitMap::new();
    m.insert(transit!([1, 2, 3]), Value::Bytes(b"goodbye".to_vec()));
    m.insert(transit!([7, 8, 9]), Value::Bytes(b"cruel".to_vec()));
    m.insert(transit!([13, 14, 15]), Value::Bytes(b"world".to_vec()));
    assert_eq!(
        to_string(&Value::Map(m)).unwrap(),
        concat!(
            r#"["~#cmap",[[1,2,3],"~bZ29vZGJ5ZQ==","#,
            r#"[7,8,9],"~bY3J1ZWw=","#,
            r#"[13,14,15],"~bd29ybGQ="]]"#
        )
    );
}

#[test]
fn test_writes_sets_and_lists() {
    let set: Set = (1..=3).map(Value::Int).collect();
    assert_eq!(to_string(&Value::Set(set)).unwrap(), r#"["~#set",[1,2,3]]"#);
    let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(to_string(&list).unwrap(), r#"["~#list",[1,2]]"#);
}

#[test]
fn test_writes_ratios() {
    assert_eq!(
        to_string(&Value::Ratio(1, 3)).unwrap(),
        r#"["~#ratio",[1,3]]"#
    );
}

#[test]
fn test_writes_links() {
    let link = Link::new("http://example.com/search", "search", Render::Link)
        .unwrap()
        .with_name("Search");
    assert_eq!(
        to_string(&Value::Link(link)).unwrap(),
        concat!(
            r#"["~#link",["^ ","href","http://example.com/search","#,
            r#""rel","search","name","Search","render","link"]]"#
        )
    );
}

#[test]
fn test_writes_tagged_values_verbatim() {
    let v = Value::tagged("point", transit!({ "x" => 1.5, "y" => 2.5 }));
    assert_eq!(
        to_string(&v).unwrap(),
        r#"["~#point",["^ ","x",1.5,"y",2.5]]"#
    );
}

#[test]
fn test_quotes_single_char_tagged_values_at_top_level() {
    let v = Value::tagged("x", Value::from("payload"));
    assert_eq!(to_string(&v).unwrap(), r#"["~#'","~xpayload"]"#);
}

#[test]
fn test_single_char_tags_without_string_reps_fail() {
    // A string-preferring sink needs a string form for one-character tags.
    let v = Value::tagged("x", Value::Int(1));
    assert!(matches!(
        to_string(&v).unwrap_err(),
        transit::Error::StringRepMissing(_)
    ));
}

#[test]
fn test_tagged_values_cache_their_tags() {
    let v = Value::Array(vec![
        Value::tagged("point", Value::Int(1)),
        Value::tagged("point", Value::Int(2)),
    ]);
    assert_eq!(
        to_string(&v).unwrap(),
        r#"[["~#point",1],["^0",2]]"#
    );
}

struct Point {
    x: f32,
    y: f32,
}

struct PointWriteHandler;

impl WriteHandler for PointWriteHandler {
    fn tag(&self, _value: &Value, _tags: &dyn TagProvider) -> Cow<'static, str> {
        Cow::Borrowed("point")
    }

    fn rep<'a>(&self, value: &'a Value, _tags: &dyn TagProvider) -> Cow<'a, Value> {
        let Some(p) = value.as_ext::<Point>() else {
            return Cow::Owned(Value::Null);
        };
        let mut map = TransitMap::new();
        map.insert(Value::from("x"), Value::Float(p.x as f64));
        map.insert(Value::from("y"), Value::Float(p.y as f64));
        Cow::Owned(Value::Map(map))
    }
}

#[test]
fn test_allows_custom_write_handlers() {
    let mut buf = Vec::new();
    let mut writer =
        Writer::new(&mut buf).with_ext_handler::<Point>(Arc::new(PointWriteHandler));
    writer.write(&Value::ext(Point { x: 3.14, y: 100.0 })).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        r#"["~#point",["^ ","x",3.140000104904175,"y",100.0]]"#
    );
}

#[test]
fn test_non_stringable_keys_in_forced_map_form_fail() {
    // Forcing the string-keyed map form around a composite key fails.
    let mut m = TransitMap::new();
    m.insert(Value::Set(Set::new()), Value::Int(1));
    let v = Value::tagged("map", Value::Map(m));
    assert!(matches!(
        to_string(&v).unwrap_err(),
        transit::Error::NonStringableKey(_)
    ));
}

#[test]
fn test_unregistered_extension_types_fail() {
    struct Mystery;
    let err = to_string(&Value::ext(Mystery)).unwrap_err();
    assert!(matches!(err, transit::Error::UnsupportedType(_)));
}

#[test]
fn test_successive_writes_share_the_sink() {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    writer.write(&Value::Int(1)).unwrap();
    writer.write(&Value::Int(2)).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        r#"["~#'",1]["~#'",2]"#
    );
}
