//! OrderedMap: an `ObjectMap` that remembers insertion order.
//!
//! The inner map owns the values and decides membership. `order` is only an
//! iteration index over it: every key in the map appears in `order` exactly
//! once and nothing else does. Keys are cloned into `order` on first insert.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::{Error, Result};
use crate::object_map::ObjectMap;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

#[derive(Clone)]
pub struct OrderedMap<K, V, S = DefaultHashBuilder> {
    map: ObjectMap<K, V, S>,
    order: Vec<K>,
}

/// In-order iterator over `(&K, &V)`.
pub struct Iter<'a, K, V, S> {
    keys: core::slice::Iter<'a, K>,
    map: &'a ObjectMap<K, V, S>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        self.map.get(key).map(|v| (key, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ExactSizeIterator for Iter<'_, K, V, S> {}

/// In-order owning iterator.
pub struct IntoIter<K, V, S> {
    keys: std::vec::IntoIter<K>,
    map: ObjectMap<K, V, S>,
}

impl<K, V, S> Iterator for IntoIter<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        self.map.remove(&key).map(|v| (key, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

/// Removing cursor over an [`OrderedMap`] in insertion order.
pub struct Cursor<'a, K, V, S> {
    map: &'a mut OrderedMap<K, V, S>,
    next: usize,
    current: Option<usize>,
}

impl<K, V, S> Cursor<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        let i = self.next;
        let OrderedMap { map, order } = &mut *self.map;
        let key = order.get(i)?;
        self.current = Some(i);
        self.next += 1;
        map.get_mut(key).map(|v| (key, v))
    }

    /// Removes the entry last returned by [`Cursor::next`]; the next call
    /// to `next` continues with the entry that followed it.
    pub fn remove(&mut self) -> Result<(K, V)> {
        let i = self.current.take().ok_or(Error::NoCurrentEntry)?;
        self.next = i;
        self.map.remove_index(i)
    }
}

impl<K, V> OrderedMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        Self::with_config(TableConfig::new(initial_capacity, DEFAULT_LOAD_FACTOR))
    }

    pub fn with_capacity_and_load_factor(initial_capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(TableConfig::new(initial_capacity, load_factor))
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> OrderedMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.map.load_factor()
    }

    /// Keys in insertion order.
    pub fn ordered_keys(&self) -> &[K] {
        &self.order
    }

    pub fn keys(&self) -> core::slice::Iter<'_, K> {
        self.order.iter()
    }
}

impl<K, V, S> OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            map: ObjectMap::with_hasher(hasher),
            order: Vec::new(),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        Ok(Self {
            map: ObjectMap::with_config_and_hasher(config, hasher)?,
            order: Vec::with_capacity(config.initial_capacity),
        })
    }

    /// Stores `value` under `key`. A new key goes to the end of the order;
    /// replacing the value of an existing key leaves the order alone.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.map.get_mut(&key) {
            return Some(core::mem::replace(slot, value));
        }
        self.order.push(key.clone());
        self.map.insert(key, value);
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_mut(key)
    }

    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get_or(key, default)
    }

    /// Entry at position `index` of the insertion order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        let key = self.order.get(index)?;
        self.map.get(key).map(|v| (key, v))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    pub fn contains_value(&self, value: &V, identity: bool) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value, identity)
    }

    /// First key in insertion order whose value matches; see
    /// [`ObjectMap::find_key`].
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

    /// Position of `key` in the insertion order. Linear in the length.
    pub fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.order.iter().position(|k| k.borrow() == key)
    }

    /// Removes `key` from both the map and the order. Linear in the length.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let value = self.map.remove(key)?;
        if let Some(i) = self.index_of(key) {
            self.order.remove(i);
        }
        Some(value)
    }

    /// Removes the entry at position `index` of the insertion order.
    pub fn remove_index(&mut self, index: usize) -> Result<(K, V)> {
        if index >= self.order.len() {
            return Err(Error::out_of_bounds(index, self.order.len()));
        }
        let key = self.order.remove(index);
        let value = self
            .map
            .remove(&key)
            .expect("ordered key must be present in the map");
        Ok((key, value))
    }

    /// Replaces key `before` with `after`, keeping its value and position.
    ///
    /// Fails (returns `false`) when `after` is already present or `before`
    /// is absent.
    pub fn alter(&mut self, before: &K, after: K) -> bool {
        if self.map.contains_key(&after) {
            return false;
        }
        match self.index_of(before) {
            Some(i) => self.replace_at(i, after),
            None => false,
        }
    }

    /// Replaces the key at position `index` with `after`, keeping its value
    /// and position. Fails when `index` is out of range or `after` is
    /// already present.
    pub fn alter_index(&mut self, index: usize, after: K) -> bool {
        if index >= self.order.len() || self.map.contains_key(&after) {
            return false;
        }
        self.replace_at(index, after)
    }

    fn replace_at(&mut self, index: usize, after: K) -> bool {
        let before = core::mem::replace(&mut self.order[index], after.clone());
        let value = self
            .map
            .remove(&before)
            .expect("ordered key must be present in the map");
        self.map.insert(after, value);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.map.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.order.clear();
        self.order.shrink_to(max_capacity);
        self.map.clear_to(max_capacity);
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        self.order.shrink_to(max_capacity);
        self.map.shrink(max_capacity);
    }

    pub fn ensure_capacity(&mut self, additional: usize) {
        self.order.reserve(additional);
        self.map.ensure_capacity(additional);
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.map.try_ensure_capacity(additional)?;
        self.order.reserve(additional);
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            keys: self.order.iter(),
            map: &self.map,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        Cursor {
            map: self,
            next: 0,
            current: None,
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K, &mut V) -> bool) {
        let mut cursor = self.cursor();
        while let Some((k, v)) = cursor.next() {
            if !keep(k, v) {
                let _ = cursor.remove();
            }
        }
    }
}

impl<K, V, S> PartialEq for OrderedMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    /// Same entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.map == other.map
    }
}

impl<K, V, S> Eq for OrderedMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> fmt::Debug for OrderedMap<K, V, S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .order
            .iter()
            .filter_map(|k| self.map.get(k).map(|v| (k, v)));
        f.debug_map().entries(entries).finish()
    }
}

impl<K, Q, V, S> Index<&Q> for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in OrderedMap")
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for OrderedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            keys: self.order.into_iter(),
            map: self.map,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
