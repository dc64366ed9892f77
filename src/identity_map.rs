//! IdentityMap: map keyed by object identity.
//!
//! Keys are pointer-like ([`Identity`]: `&T`, `Rc<T>`, `Arc<T>`). Two keys
//! are the same key only if they point to the same allocation, whatever
//! their `Eq` says. The address feeds the same Fibonacci placement as every
//! other table, which spreads the aligned low bits of heap addresses.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::Result;
use crate::policy::{ByIdentity, Cached, Identity};
use crate::raw_table::{self, RawTable};
use core::fmt;

pub type Iter<'a, K, V> = raw_table::Iter<'a, Cached<K>, V>;
pub type IterMut<'a, K, V> = raw_table::IterMut<'a, Cached<K>, V>;
pub type IntoIter<K, V> = raw_table::IntoIter<Cached<K>, V>;
pub type Cursor<'a, K, V> = raw_table::Cursor<'a, Cached<K>, V, ByIdentity>;

#[derive(Clone)]
pub struct IdentityMap<K, V> {
    table: RawTable<Cached<K>, V, ByIdentity>,
}

impl<K: Identity, V> Default for IdentityMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> IdentityMap<K, V> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.table.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.table.values_mut()
    }

    /// Linear scan for a value; `identity` compares addresses instead of `==`.
    pub fn find_key(&self, value: &V, identity: bool) -> Option<&K>
    where
        V: PartialEq,
    {
        self.iter()
            .find(|(_, v)| {
                if identity {
                    core::ptr::eq(*v, value)
                } else {
                    *v == value
                }
            })
            .map(|(k, _)| k)
    }

    pub fn contains_value(&self, value: &V, identity: bool) -> bool
    where
        V: PartialEq,
    {
        self.find_key(value, identity).is_some()
    }
}

impl<K: Identity, V> IdentityMap<K, V> {
    pub fn new() -> Self {
        Self {
            table: RawTable::with_policy(ByIdentity),
        }
    }

    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        Self::with_config(TableConfig::new(initial_capacity, DEFAULT_LOAD_FACTOR))
    }

    pub fn with_capacity_and_load_factor(initial_capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(TableConfig::new(initial_capacity, load_factor))
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_config_and_policy(config, ByIdentity)?,
        })
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key).map(|(_, v)| v)
    }

    /// Removes the entry and hands back the stored key as well.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.table.remove(key)
    }

    pub fn clear(&mut self) {
        self.table.clear()
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity)
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        self.table.shrink(max_capacity)
    }

    pub fn ensure_capacity(&mut self, additional: usize) {
        self.table.ensure_capacity(additional)
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.table.try_ensure_capacity(additional)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        self.table.cursor()
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(keep)
    }
}

impl<K: Identity, V: PartialEq> PartialEq for IdentityMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Identity, V: Eq> Eq for IdentityMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IdentityMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Identity, V> Extend<(K, V)> for IdentityMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Identity, V> FromIterator<(K, V)> for IdentityMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Identity, V> IntoIterator for IdentityMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a IdentityMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::sync::Arc;

    /// Invariant: equal but distinct objects are distinct keys.
    #[test]
    fn equal_values_are_distinct_keys() {
        let a = String::from("twin");
        let b = String::from("twin");
        let mut m = IdentityMap::new();
        m.insert(&a, 1);
        m.insert(&b, 2);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&&a), Some(&1));
        assert_eq!(m.get(&&b), Some(&2));
        assert_eq!(m.insert(&a, 3), Some(1));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn rc_clones_share_identity() {
        let key = Rc::new(vec![1, 2, 3]);
        let other = Rc::new(vec![1, 2, 3]);
        let mut m = IdentityMap::new();
        m.insert(key.clone(), "first");
        assert!(m.contains_key(&key));
        assert!(!m.contains_key(&other));
        assert_eq!(*m.get_or(&other, &"missing"), "missing");
        let (stored, v) = m.remove_entry(&key).unwrap();
        assert!(Rc::ptr_eq(&stored, &key));
        assert_eq!(v, "first");
        assert!(m.is_empty());
    }

    #[test]
    fn many_heap_keys_resolve() {
        let keys: Vec<Arc<u64>> = (0..2000).map(Arc::new).collect();
        let mut m: IdentityMap<Arc<u64>, u64> = keys.iter().map(|k| (k.clone(), **k)).collect();
        assert_eq!(m.len(), 2000);
        for k in &keys {
            assert_eq!(m.get(k), Some(&**k));
        }
        m.retain(|k, _| **k % 2 == 0);
        assert_eq!(m.len(), 1000);
        for k in &keys {
            assert_eq!(m.contains_key(k), **k % 2 == 0);
        }
        assert!(m.contains_value(&4, false));
        assert!(!m.contains_value(&5, false));
    }

    #[test]
    fn boxed_slices_by_address() {
        let items: Vec<Box<[u8]>> = vec![vec![0; 4].into(), vec![0; 4].into()];
        let mut m = IdentityMap::new();
        for (i, item) in items.iter().enumerate() {
            m.insert(&**item, i);
        }
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&&*items[1]), Some(&1));
    }
}
