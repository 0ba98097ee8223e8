//! Insertion-ordered deduplication.
//!
//! [`Mapping`] assigns dense ids (0, 1, 2, ...) to keys in the order they are
//! first seen. Adding a key twice returns the id it already has.

use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Mapping<K> {
    table: Vec<K>,
    ids: FxHashMap<K, usize>,
}

impl<K> Default for Mapping<K> {
    fn default() -> Self {
        Self {
            table: Vec::new(),
            ids: FxHashMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> Mapping<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `key`, appending it to the table on first sight.
    pub fn add(&mut self, key: K) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.table.len();
        self.ids.insert(key.clone(), id);
        self.table.push(key);
        id
    }

    #[inline]
    #[must_use]
    pub fn id_of(&self, key: &K) -> Option<usize> {
        self.ids.get(key).copied()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&K> {
        self.table.get(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Keys in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.table.iter()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.ids.clear();
    }
}

impl<'a, K> IntoIterator for &'a Mapping<K> {
    type Item = &'a K;
    type IntoIter = std::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.iter()
    }
}

/// An `Arc` that hashes and compares by pointer.
///
/// Two materials with identical parameters are still two materials.
#[derive(Debug)]
pub struct ByAddress<T>(pub Arc<T>);

impl<T> ByAddress<T> {
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T> Clone for ByAddress<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ByAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ByAddress<T> {}

impl<T> Hash for ByAddress<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl<T> Deref for ByAddress<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<Arc<T>> for ByAddress<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_first_insertion() {
        let mut mapping = Mapping::new();
        assert_eq!(mapping.add("b"), 0);
        assert_eq!(mapping.add("a"), 1);
        assert_eq!(mapping.add("b"), 0);
        assert_eq!(mapping.add("c"), 2);
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.iter().copied().collect::<Vec<_>>(), ["b", "a", "c"]);
    }

    #[test]
    fn by_address_ignores_value_equality() {
        let first = Arc::new(1u32);
        let second = Arc::new(1u32);

        let mut mapping = Mapping::new();
        let a = mapping.add(ByAddress(Arc::clone(&first)));
        let b = mapping.add(ByAddress(second));
        let c = mapping.add(ByAddress(first));

        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn clear_restarts_ids() {
        let mut mapping = Mapping::new();
        mapping.add(10);
        mapping.add(20);
        mapping.clear();
        assert!(mapping.is_empty());
        assert_eq!(mapping.add(20), 0);
        assert_eq!(mapping.id_of(&10), None);
    }
}
