//! OrderedSet: an `ObjectSet` that remembers insertion order.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::{Error, Result};
use crate::object_set::ObjectSet;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

#[derive(Clone)]
pub struct OrderedSet<K, S = DefaultHashBuilder> {
    set: ObjectSet<K, S>,
    order: Vec<K>,
}

/// Removing cursor over an [`OrderedSet`] in insertion order.
pub struct Cursor<'a, K, S> {
    set: &'a mut OrderedSet<K, S>,
    next: usize,
    current: Option<usize>,
}

impl<K, S> Cursor<'_, K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&K> {
        let i = self.next;
        let item = self.set.order.get(i)?;
        self.current = Some(i);
        self.next += 1;
        Some(item)
    }

    /// Removes the item last returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<K> {
        let i = self.current.take().ok_or(Error::NoCurrentEntry)?;
        self.next = i;
        self.set.remove_index(i)
    }
}

impl<K> OrderedSet<K, DefaultHashBuilder>
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

impl<K, S> Default for OrderedSet<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S> OrderedSet<K, S> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.set.capacity()
    }

    /// Items in insertion order.
    pub fn ordered_items(&self) -> &[K] {
        &self.order
    }

    pub fn iter(&self) -> core::slice::Iter<'_, K> {
        self.order.iter()
    }

    /// The earliest inserted item still present.
    pub fn first(&self) -> Option<&K> {
        self.order.first()
    }

    pub fn get_index(&self, index: usize) -> Option<&K> {
        self.order.get(index)
    }
}

impl<K, S> OrderedSet<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            set: ObjectSet::with_hasher(hasher),
            order: Vec::new(),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        Ok(Self {
            set: ObjectSet::with_config_and_hasher(config, hasher)?,
            order: Vec::with_capacity(config.initial_capacity),
        })
    }

    /// Appends `item` unless an equal item is present; returns whether it
    /// was added.
    pub fn insert(&mut self, item: K) -> bool {
        if self.set.contains(&item) {
            return false;
        }
        self.order.push(item.clone());
        self.set.insert(item)
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.set.contains(item)
    }

    pub fn index_of<Q>(&self, item: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.order.iter().position(|k| k.borrow() == item)
    }

    /// Removes `item`. Linear in the length.
    pub fn remove<Q>(&mut self, item: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if !self.set.remove(item) {
            return false;
        }
        if let Some(i) = self.index_of(item) {
            self.order.remove(i);
        }
        true
    }

    /// Removes and returns the item at position `index`.
    pub fn remove_index(&mut self, index: usize) -> Result<K> {
        if index >= self.order.len() {
            return Err(Error::out_of_bounds(index, self.order.len()));
        }
        let item = self.order.remove(index);
        self.set.remove(&item);
        Ok(item)
    }

    /// Replaces `before` with `after` at the same position. Fails when
    /// `after` is already present or `before` is absent.
    pub fn alter(&mut self, before: &K, after: K) -> bool {
        if self.set.contains(&after) {
            return false;
        }
        match self.index_of(before) {
            Some(i) => self.replace_at(i, after),
            None => false,
        }
    }

    /// Replaces the item at `index` with `after`. Fails when `index` is out
    /// of range or `after` is already present.
    pub fn alter_index(&mut self, index: usize, after: K) -> bool {
        if index >= self.order.len() || self.set.contains(&after) {
            return false;
        }
        self.replace_at(index, after)
    }

    fn replace_at(&mut self, index: usize, after: K) -> bool {
        let before = core::mem::replace(&mut self.order[index], after.clone());
        self.set.remove(&before);
        self.set.insert(after)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.set.clear();
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.order.clear();
        self.order.shrink_to(max_capacity);
        self.set.clear_to(max_capacity);
    }

    pub fn shrink(&mut self, max_capacity: usize) {
        self.order.shrink_to(max_capacity);
        self.set.shrink(max_capacity);
    }

    pub fn ensure_capacity(&mut self, additional: usize) {
        self.order.reserve(additional);
        self.set.ensure_capacity(additional);
    }

    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.set.try_ensure_capacity(additional)?;
        self.order.reserve(additional);
        Ok(())
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, S> {
        Cursor {
            set: self,
            next: 0,
            current: None,
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        let mut cursor = self.cursor();
        while let Some(item) = cursor.next() {
            if !keep(item) {
                let _ = cursor.remove();
            }
        }
    }
}

impl<K, S> PartialEq for OrderedSet<K, S>
where
    K: PartialEq,
{
    /// Same items in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<K: Eq, S> Eq for OrderedSet<K, S> {}

impl<K: fmt::Debug, S> fmt::Debug for OrderedSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.order.iter()).finish()
    }
}

impl<K, S> Extend<K> for OrderedSet<K, S>
where
    K: Hash + Eq + Clone,
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

impl<K, S> FromIterator<K> for OrderedSet<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K, S> IntoIterator for OrderedSet<K, S> {
    type Item = K;
    type IntoIter = std::vec::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl<'a, K, S> IntoIterator for &'a OrderedSet<K, S> {
    type Item = &'a K;
    type IntoIter = core::slice::Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut s = OrderedSet::new();
        for w in ["pear", "fig", "apple", "fig", "kiwi"] {
            s.insert(w.to_string());
        }
        assert_eq!(s.ordered_items(), &["pear", "fig", "apple", "kiwi"]);
        assert_eq!(s.first().map(String::as_str), Some("pear"));
        assert!(s.remove("fig"));
        assert!(!s.remove("fig"));
        assert_eq!(s.ordered_items(), &["pear", "apple", "kiwi"]);
        assert_eq!(s.remove_index(0).unwrap(), "pear");
        assert!(matches!(
            s.remove_index(5),
            Err(Error::IndexOutOfBounds { index: 5, len: 2 })
        ));
    }

    #[test]
    fn alter_rules() {
        let mut s: OrderedSet<char> = "abc".chars().collect();
        assert!(s.alter_index(1, 'd'));
        assert_eq!(s.ordered_items(), &['a', 'd', 'c']);
        assert!(!s.contains(&'b'));
        assert!(s.contains(&'d'));
        assert!(!s.alter(&'a', 'c'));
        assert!(!s.alter(&'q', 'z'));
        assert!(s.alter(&'c', 'z'));
        assert_eq!(s.ordered_items(), &['a', 'd', 'z']);
        assert!(!s.alter_index(3, 'y'));
    }

    #[test]
    fn cursor_and_retain_follow_order() {
        let mut s: OrderedSet<u32> = (0..10).collect();
        let mut c = s.cursor();
        let mut seen = Vec::new();
        while let Some(&k) = c.next() {
            seen.push(k);
            if k < 3 {
                assert_eq!(c.remove().unwrap(), k);
            }
        }
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        s.retain(|k| k % 2 == 0);
        assert_eq!(s.ordered_items(), &[4, 6, 8]);
        assert_eq!(format!("{s:?}"), "{4, 6, 8}");
        assert_eq!(s.into_iter().collect::<Vec<_>>(), vec![4, 6, 8]);
    }

    #[test]
    fn clear_keeps_sides_in_sync() {
        let mut s: OrderedSet<i64> = (0..300).collect();
        s.clear_to(8);
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 8);
        assert!(s.insert(1));
        assert_eq!(s.index_of(&1), Some(0));
        s.clear();
        assert!(!s.contains(&1));
    }
}
