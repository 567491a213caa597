// HashMap (primitive-keyed) test suite.
//
// Core invariants exercised:
// - Partitions: `1` and `"1"` never collide; snapshots visit strings,
//   numbers, then other primitives, each in insertion order.
// - Key kind: object keys are rejected.
// - Numeric keys: SameValueZero (`NaN` finds itself, `-0 == +0`).
// - Snapshots are copies: mutating during `iterate` is safe.
use harmony_collections::{
    CollectionError, CollectionKind, HashMap, Object, Partition, Value, ValueType,
};
use std::collections::hash_map::RandomState;

#[test]
fn numeric_and_string_keys_do_not_collide() {
    let h: HashMap<&'static str> = HashMap::new();
    h.set(1, "num").unwrap();
    h.set("1", "str").unwrap();
    assert_eq!(h.get(&Value::from(1)), Ok(Some("num")));
    assert_eq!(h.get(&Value::from("1")), Ok(Some("str")));
    assert_eq!(h.len(), 2);
}

#[test]
fn other_primitives_are_distinct_keys() {
    let h: HashMap<i32> = HashMap::new();
    h.set(true, 1).unwrap();
    h.set(false, 2).unwrap();
    h.set(Value::Null, 3).unwrap();
    h.set(Value::Undefined, 4).unwrap();
    h.set("true", 5).unwrap();
    h.set("null", 6).unwrap();
    assert_eq!(h.get(&Value::from(true)), Ok(Some(1)));
    assert_eq!(h.get(&Value::from(false)), Ok(Some(2)));
    assert_eq!(h.get(&Value::Null), Ok(Some(3)));
    assert_eq!(h.get(&Value::Undefined), Ok(Some(4)));
    assert_eq!(h.len(), 6);
}

#[test]
fn object_keys_are_rejected() {
    let h: HashMap<i32> = HashMap::new();
    let key = Value::from(Object::new());
    let expected = CollectionError::InvalidKey {
        collection: CollectionKind::HashMap,
        found: ValueType::Object,
    };
    assert_eq!(h.set(key.clone(), 1), Err(expected));
    assert_eq!(h.get(&key), Err(expected));
    assert_eq!(h.has(&key), Err(expected));
    assert_eq!(h.delete(&key), Err(expected));
    assert_eq!(Partition::of(&key), Err(expected));
    assert!(h.is_empty());
}

#[test]
fn partition_of_each_primitive() {
    assert_eq!(Partition::of(&"a".into()), Ok(Partition::String));
    assert_eq!(Partition::of(&2.5.into()), Ok(Partition::Number));
    assert_eq!(Partition::of(&true.into()), Ok(Partition::Other));
    assert_eq!(Partition::of(&Value::Null), Ok(Partition::Other));
    assert_eq!(Partition::of(&Value::Undefined), Ok(Partition::Other));
}

// Test: SameValueZero on number keys.
// Verifies: -0 and +0 are one key reported as +0; NaN finds itself.
#[test]
fn signed_zero_and_nan_keys() {
    let h: HashMap<&'static str> = HashMap::new();
    h.set(-0.0, "zero").unwrap();
    assert_eq!(h.get(&Value::from(0.0)), Ok(Some("zero")));
    assert_eq!(h.set(0.0, "again"), Ok(Some("zero")));
    assert_eq!(h.len(), 1);
    match h.keys().as_slice() {
        [Value::Number(n)] => assert!(*n == 0.0 && n.is_sign_positive()),
        other => panic!("unexpected keys: {other:?}"),
    }

    h.set(f64::NAN, "nan").unwrap();
    assert_eq!(h.get(&Value::from(f64::NAN)), Ok(Some("nan")));
    assert_eq!(h.has(&Value::from(-f64::NAN)), Ok(true));
    assert_eq!(h.len(), 2);
}

// Test: delete of absent keys.
// Verifies: returns false and leaves keys() unchanged.
#[test]
fn delete_absent_key_is_noop() {
    let h: HashMap<i32> = HashMap::new();
    h.set("a", 1).unwrap();
    h.set(2, 2).unwrap();
    let before = h.keys();
    assert_eq!(h.delete(&Value::from("zz")), Ok(false));
    assert_eq!(h.delete(&Value::from("2")), Ok(false));
    assert_eq!(h.keys(), before);
    assert_eq!(h.delete(&Value::from(2)), Ok(true));
    assert_eq!(h.keys(), [Value::from("a")]);
}

// Test: overwrite keeps position within the partition.
#[test]
fn overwrite_keeps_partition_order() {
    let h: HashMap<i32> = HashMap::new();
    h.set("a", 1).unwrap();
    h.set("b", 2).unwrap();
    h.set("a", 3).unwrap();
    assert_eq!(h.keys(), [Value::from("a"), Value::from("b")]);
    assert_eq!(h.values(), [3, 2]);
    assert_eq!(
        h.entries(),
        [(Value::from("a"), 3), (Value::from("b"), 2)]
    );
}

// Test: iterate works on a snapshot.
// Verifies: callbacks see every entry present at the start, even when
// they delete entries or insert new ones.
#[test]
fn iterate_over_snapshot_allows_mutation() {
    let h: HashMap<i32> = HashMap::new();
    h.set("a", 1).unwrap();
    h.set("b", 2).unwrap();
    h.set(3, 3).unwrap();

    let mut seen = Vec::new();
    h.iterate(|v, k| {
        seen.push((k.clone(), *v));
        h.delete(&Value::from("b")).unwrap();
        h.set("z", 26).unwrap();
    });
    assert_eq!(
        seen,
        [
            (Value::from("a"), 1),
            (Value::from("b"), 2),
            (Value::from(3), 3)
        ]
    );
    assert_eq!(h.keys(), [Value::from("a"), Value::from("z"), Value::from(3)]);
}

// Test: to_object coerces keys to member names.
#[test]
fn to_object_uses_string_forms() {
    let h: HashMap<Value> = HashMap::new();
    h.set("name", Value::from("x")).unwrap();
    h.set(1.5, Value::from(true)).unwrap();
    h.set(Value::Null, Value::from(0)).unwrap();
    let o = h.to_object();
    let keys: Vec<String> = o.own_keys().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["name", "1.5", "null"]);
    assert_eq!(o.get("1.5"), Some(Value::from(true)));
}

#[test]
fn from_entries_and_custom_hasher() {
    let h = HashMap::from_entries([("a", 1), ("b", 2)]).unwrap();
    assert_eq!(h.values(), [1, 2]);

    let err = HashMap::from_entries([(Value::from(1), 1), (Value::from(Object::new()), 2)]);
    assert!(matches!(
        err,
        Err(CollectionError::InvalidKey {
            collection: CollectionKind::HashMap,
            found: ValueType::Object,
        })
    ));

    let custom: HashMap<i32, RandomState> = HashMap::with_hasher(RandomState::new());
    custom.set("k", 1).unwrap();
    assert_eq!(custom.get(&"k".into()), Ok(Some(1)));
    assert_eq!(custom.to_string(), "[object HashMap]");
}
