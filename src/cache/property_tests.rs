//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store behavior over random operation sequences.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::cache::CacheStore;
use crate::config::{CacheOptions, SetOptions};
use crate::schema::{ValidationMode, Validator};

// == Strategies ==
/// Generates user records with a small id space so relations collide often
fn user_strategy() -> impl Strategy<Value = Value> {
    (0u32..6, "[a-z]{1,8}", 18u32..90)
        .prop_map(|(id, name, age)| json!({ "id": id.to_string(), "name": name, "age": age }))
}

/// Generates collections; ids may repeat, the store keeps the first of each
fn collection_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(user_strategy(), 0..6).prop_map(Value::Array)
}

#[derive(Debug, Clone)]
enum CacheOp {
    SetRecord(Value),
    SetCollection { key: String, users: Value },
    Get { key: String },
    DeleteRecord { id: u32 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        user_strategy().prop_map(CacheOp::SetRecord),
        ("/lists/[a-c]", collection_strategy())
            .prop_map(|(key, users)| CacheOp::SetCollection { key, users }),
        "/users/[0-5]".prop_map(|key| CacheOp::Get { key }),
        (0u32..6).prop_map(|id| CacheOp::DeleteRecord { id }),
    ]
}

fn record_key(record: &Value) -> String {
    format!("/users/{}", record["id"].as_str().unwrap_or_default())
}

/// Builds an object from fields inserted in the given order
fn object_from(fields: &[(String, Value)]) -> Value {
    let mut map = Map::new();
    for (name, value) in fields {
        map.insert(name.clone(), value.clone());
    }
    Value::Object(map)
}

fn field_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(|s| json!(s)),
        any::<bool>().prop_map(|b| json!(b)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every set, get and del counts exactly one hit, whatever its outcome.
    #[test]
    fn prop_hit_counting(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(&CacheOptions::default()).unwrap();

        for op in &ops {
            match op {
                CacheOp::SetRecord(record) => {
                    let _ = store.set(record_key(record), record.clone(), &SetOptions::new());
                }
                CacheOp::SetCollection { key, users } => {
                    let _ = store.set(key.clone(), users.clone(), &SetOptions::new());
                }
                CacheOp::Get { key } => {
                    store.get(key);
                }
                CacheOp::DeleteRecord { id } => {
                    store.del(&format!("/users/{}", id));
                }
            }
        }

        prop_assert_eq!(store.stats().hits, ops.len() as u64);
        prop_assert_eq!(store.stats().count, store.len());
    }

    // A stored record is returned unchanged.
    #[test]
    fn prop_roundtrip_storage(record in user_strategy()) {
        let mut store = CacheStore::new(&CacheOptions::default()).unwrap();
        let key = record_key(&record);

        store.set(key.clone(), record.clone(), &SetOptions::new()).unwrap();

        prop_assert_eq!(store.get(&key), Some(record));
    }

    // No collection ever holds two elements with the same relation key, and
    // every collection mirrors the latest write of each record it contains.
    #[test]
    fn prop_collections_stay_consistent(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(&CacheOptions::default()).unwrap();

        for op in ops {
            match op {
                CacheOp::SetRecord(record) => {
                    store.set(record_key(&record), record.clone(), &SetOptions::new()).unwrap();
                    for key in ["/lists/a", "/lists/b", "/lists/c"] {
                        if let Some(Value::Array(users)) = store.get(key) {
                            prop_assert!(users.contains(&record), "{} misses {}", key, record);
                        }
                    }
                }
                CacheOp::SetCollection { key, users } => {
                    store.set(key, users, &SetOptions::new()).unwrap();
                }
                CacheOp::Get { key } => {
                    store.get(&key);
                }
                CacheOp::DeleteRecord { id } => {
                    if store.del(&format!("/users/{}", id)) {
                        for key in ["/lists/a", "/lists/b", "/lists/c"] {
                            if let Some(Value::Array(users)) = store.get(key) {
                                prop_assert!(users.iter().all(|u| u["id"] != json!(id.to_string())));
                            }
                        }
                    }
                }
            }

            for key in ["/lists/a", "/lists/b", "/lists/c"] {
                if let Some(Value::Array(users)) = store.get(key) {
                    let ids: HashSet<String> = users.iter().map(|u| u["id"].to_string()).collect();
                    prop_assert_eq!(ids.len(), users.len(), "duplicate ids in {}", key);
                }
            }
        }
    }

    // Objects built in any insertion order come out key-sorted and identical,
    // so both modes see the same field sequence.
    #[test]
    fn prop_objects_are_key_sorted(
        fields in prop::collection::btree_map("[a-z]{1,6}", field_value_strategy(), 1..8)
    ) {
        let forward: Vec<(String, Value)> = fields.into_iter().collect();
        let mut backward = forward.clone();
        backward.reverse();

        let reference = object_from(&forward);
        let candidate = object_from(&backward);
        let keys: Vec<&String> = candidate.as_object().unwrap().keys().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(&reference, &candidate);

        for mode in [ValidationMode::Quick, ValidationMode::Deep] {
            let validator = Validator::new(&reference, mode);
            prop_assert!(validator.validate(&candidate));
        }
    }

    // Adding a field is always rejected in both modes.
    #[test]
    fn prop_validation_rejects_extra_field(
        fields in prop::collection::btree_map("[a-z]{1,6}", field_value_strategy(), 1..8)
    ) {
        let forward: Vec<(String, Value)> = fields.into_iter().collect();
        let reference = object_from(&forward);
        let mut extended = forward.clone();
        extended.push(("EXTRA".to_string(), json!(1)));
        let candidate = object_from(&extended);

        for mode in [ValidationMode::Quick, ValidationMode::Deep] {
            let validator = Validator::new(&reference, mode);
            prop_assert!(!validator.validate(&candidate));
        }
    }
}
