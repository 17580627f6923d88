//! An in-process response cache with tag based invalidation.
//!
//! Listing responses are stored under a string key together with the tags
//! they were derived from. Mutation endpoints declare the tags they touch,
//! and every entry stored under one of those tags is dropped. This mirrors
//! the cache contract of the web client this API was built for: a cache
//! entry for key K is removed when a mutation declares it affects K.

use std::{collections::HashMap, sync::Mutex};

use serde_json::Value;

use crate::database_id::TransactionId;

/// A label that ties cache entries to the data they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTag {
    /// Covers every cached transaction listing.
    TransactionList,
    /// Covers cached responses that contain the transaction with this ID.
    Transaction(TransactionId),
}

#[derive(Debug)]
struct CacheEntry {
    tags: Vec<CacheTag>,
    value: Value,
}

/// Caches JSON responses until a mutation invalidates one of their tags.
///
/// A poisoned lock is treated as an empty cache rather than an error, since
/// serving uncached data is always correct.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Look up the cached response stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).map(|entry| entry.value.clone()),
            Err(_) => None,
        }
    }

    /// Store `value` under `key`, tied to `tags`.
    pub fn insert(&self, key: String, tags: Vec<CacheTag>, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, CacheEntry { tags, value });
        }
    }

    /// Drop every entry that declared `tag`.
    pub fn invalidate(&self, tag: CacheTag) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| !entry.tags.contains(&tag));
        }
    }
}
