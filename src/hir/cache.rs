//! Project-wide memo of computed constant values.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::constant::ConstValue;

/// Keyed cache of constant values, `None` included ("computed: not
/// constant"). The lock is only held to look up or store a value, never
/// while a value is computed, so computations may recurse into the cache.
#[derive(Debug)]
pub struct ConstantCache<K> {
    values: Mutex<FxHashMap<K, Option<ConstValue>>>,
}

impl<K> Default for ConstantCache<K> {
    fn default() -> Self {
        Self {
            values: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<K: Hash + Eq + Clone + std::fmt::Debug> ConstantCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached result for `key`; the outer `None` is a cache miss.
    pub fn get(&self, key: &K) -> Option<Option<ConstValue>> {
        self.values.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    pub fn clear(&mut self) {
        self.values.get_mut().clear();
    }

    /// Return the cached value of `key`, or compute and cache it.
    ///
    /// `visited` holds the keys being computed further up the call stack. A
    /// request for one of those is a cycle and yields `None` without
    /// computing or caching anything.
    pub fn compute_with_caching(
        &self,
        key: K,
        visited: &mut FxHashSet<K>,
        compute: impl FnOnce(&mut FxHashSet<K>) -> Option<ConstValue>,
    ) -> Option<ConstValue> {
        if let Some(value) = self.get(&key) {
            trace!(?key, "constant cache hit");
            return value;
        }
        if !visited.insert(key.clone()) {
            trace!(?key, "cyclic constant reference");
            return None;
        }
        let value = compute(visited);
        visited.remove(&key);
        self.values.lock().insert(key, value.clone());
        value
    }
}
