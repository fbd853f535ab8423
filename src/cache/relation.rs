//! Relation Synchronization Module
//!
//! Keeps collection entries consistent with the record entries that belong to them.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::cache::CacheEntry;

// == Sync Mode ==
/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// The record was created or rewritten
    Upsert,
    /// The record was deleted
    Remove,
}

/// Reads the relation key of `record`. Missing and `null` fields yield `None`.
pub fn relation_value<'a>(record: &'a Value, entry_key: &str) -> Option<&'a Value> {
    record.get(entry_key).filter(|value| !value.is_null())
}

// == Synchronize ==
/// Propagates a record event into every collection entry.
///
/// For each collection the element whose `entry_key` equals `relation_value`
/// is replaced (upsert), appended when absent (upsert), or dropped (remove),
/// unless the collection opted out through its ignore flags. A `None`
/// relation value matches nothing and nothing is appended for it. An upsert
/// without a record is handled as a removal.
///
/// Returns the number of collections whose payload changed.
pub fn synchronize(
    entries: &mut HashMap<String, CacheEntry>,
    entry_key: &str,
    mode: SyncMode,
    relation_value: Option<&Value>,
    record: Option<&Value>,
) -> usize {
    let Some(relation_value) = relation_value else {
        return 0;
    };
    let mode = match (mode, record) {
        (SyncMode::Upsert, None) => SyncMode::Remove,
        (mode, _) => mode,
    };

    let mut changed = 0;
    for entry in entries.values_mut() {
        let options = entry.options;
        let Value::Array(items) = &mut entry.payload else {
            continue;
        };
        let matches = |item: &Value| item.get(entry_key) == Some(relation_value);
        let position = items.iter().position(matches);

        let modified = match (mode, position, record) {
            (SyncMode::Upsert, Some(index), Some(record)) if !options.ignore_update => {
                items[index] = record.clone();
                drop_duplicates(items, index, matches);
                true
            }
            (SyncMode::Upsert, None, Some(record)) if !options.ignore_create => {
                items.push(record.clone());
                true
            }
            (SyncMode::Remove, Some(_), _) if !options.ignore_delete => {
                items.retain(|item| !matches(item));
                true
            }
            _ => false,
        };

        if modified {
            entry.touch();
            changed += 1;
        }
    }
    changed
}

/// Removes every match after `keep`, so a collection holds one element per key.
fn drop_duplicates<F>(items: &mut Vec<Value>, keep: usize, matches: F)
where
    F: Fn(&Value) -> bool,
{
    let mut index = 0;
    items.retain(|item| {
        let retained = index <= keep || !matches(item);
        index += 1;
        retained
    });
}

// == Dedupe ==
/// Keeps the first element for each relation key and drops later ones.
///
/// Elements without a relation key are always kept. Returns the number of
/// elements removed.
pub fn dedupe_by_relation(items: &mut Vec<Value>, entry_key: &str) -> usize {
    let before = items.len();
    let mut seen = HashSet::new();
    items.retain(|item| match relation_value(item, entry_key) {
        Some(key) => seen.insert(key.to_string()),
        None => true,
    });
    before - items.len()
}
