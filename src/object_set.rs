//! ObjectSet: set of `Hash + Eq` values on the same engine as `ObjectMap`.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::Result;
use crate::policy::{Cached, Hashed};
use crate::raw_table::{self, RawTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

#[derive(Clone)]
pub struct ObjectSet<K, S = DefaultHashBuilder> {
    table: RawTable<Cached<K>, (), Hashed<S>>,
}

/// Iterator over the items of an [`ObjectSet`] in table order.
#[derive(Clone)]
pub struct Iter<'a, K> {
    inner: raw_table::Iter<'a, Cached<K>, ()>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

pub struct IntoIter<K> {
    inner: raw_table::IntoIter<Cached<K>, ()>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

/// Removing cursor over an [`ObjectSet`].
pub struct Cursor<'a, K, S> {
    inner: raw_table::Cursor<'a, Cached<K>, (), Hashed<S>>,
}

impl<K, S> Cursor<'_, K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&K> {
        self.inner.next().map(|(k, _)| k)
    }

    /// Removes the item last returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<K> {
        self.inner.remove().map(|(k, _)| k)
    }
}

impl<K> ObjectSet<K, DefaultHashBuilder>
where
    K: Hash + Eq,
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

impl<K, S> Default for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S> ObjectSet<K, S> {
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

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Some item of the set, the first in table order.
    pub fn first(&self) -> Option<&K> {
        self.iter().next()
    }
}

impl<K, S> ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: RawTable::with_policy(Hashed(hasher)),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        Ok(Self {
            table: RawTable::with_config_and_policy(config, Hashed(hasher))?,
        })
    }

    fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.table.policy().0.hash_one(q);
        self.table.find(hash, |k| k.borrow() == q)
    }

    /// Adds `item`; returns `false` and keeps the stored item if an equal
    /// one is already present.
    pub fn insert(&mut self, item: K) -> bool {
        self.table.insert(item, ()).is_none()
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(item).is_some()
    }

    /// The stored item equal to `item`.
    pub fn get<Q>(&self, item: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(item)?;
        self.table.entry_at(i).map(|(k, _)| k)
    }

    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.take(item).is_some()
    }

    /// Removes and returns the stored item equal to `item`.
    pub fn take<Q>(&mut self, item: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(item)?;
        self.table.remove_at(i).map(|r| r.key)
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

    pub fn cursor(&mut self) -> Cursor<'_, K, S> {
        Cursor {
            inner: self.table.cursor(),
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.table.retain(|k, _| keep(k))
    }
}

impl<K, S> PartialEq for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K, S> Eq for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, S> fmt::Debug for ObjectSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S> Extend<K> for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for k in iter {
            self.insert(k);
        }
    }
}

impl<'a, K, S> Extend<&'a K> for ObjectSet<K, S>
where
    K: Hash + Eq + Copy + 'a,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K, S> FromIterator<K> for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, S> IntoIterator for ObjectSet<K, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, S> IntoIterator for &'a ObjectSet<K, S> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_novelty() {
        let mut s = ObjectSet::new();
        assert!(s.insert("a".to_string()));
        assert!(!s.insert("a".to_string()));
        assert!(s.insert("b".to_string()));
        assert_eq!(s.len(), 2);
        assert!(s.contains("a"));
        assert_eq!(s.get("b").map(String::as_str), Some("b"));
        assert!(s.remove("a"));
        assert!(!s.remove("a"));
        assert_eq!(s.first().map(String::as_str), Some("b"));
        assert_eq!(s.take("b"), Some("b".to_string()));
        assert!(s.is_empty());
        assert_eq!(s.first(), None);
    }

    #[test]
    fn equality_and_debug() {
        let a: ObjectSet<u16> = (0..300).collect();
        let b: ObjectSet<u16> = (0..300).rev().collect();
        assert_eq!(a, b);
        let mut c = ObjectSet::new();
        c.insert(9u16);
        assert_eq!(format!("{c:?}"), "{9}");
        assert_ne!(a, c);
    }

    /// Invariant: cursor removal visits each item exactly once.
    #[test]
    fn cursor_drains_everything() {
        let mut s: ObjectSet<u64> = (1..=500).collect();
        let mut seen = Vec::new();
        let mut c = s.cursor();
        while let Some(&k) = c.next() {
            seen.push(k);
            assert_eq!(c.remove().unwrap(), k);
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=500).collect::<Vec<_>>());
        assert!(s.is_empty());
    }

    #[test]
    fn retain_and_capacity_ops() {
        let mut s: ObjectSet<i32> = (0..1000).collect();
        s.retain(|k| k % 10 == 0);
        assert_eq!(s.len(), 100);
        let big = s.capacity();
        s.shrink(0);
        assert!(s.capacity() < big);
        assert!((0..1000).step_by(10).all(|k| s.contains(&k)));
        s.clear_to(4);
        assert_eq!((s.len(), s.capacity()), (0, 4));
        s.extend(&[1, 2, 3]);
        let mut items: Vec<_> = s.into_iter().collect();
        items.sort_unstable();
        assert_eq!(items, vec![1, 2, 3]);
    }
}
