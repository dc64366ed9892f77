//! ObjectMap: map keyed by `Hash + Eq` values.
//!
//! Each slot stores the key with the hash it was inserted under, so the
//! engine can resize and compact without hashing again. Lookups accept any
//! borrowed form `Q` of the key, like `std::collections::HashMap`.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::Result;
use crate::policy::{Cached, Hashed};
use crate::raw_table::{self, RawTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

pub type Iter<'a, K, V> = raw_table::Iter<'a, Cached<K>, V>;
pub type IterMut<'a, K, V> = raw_table::IterMut<'a, Cached<K>, V>;
pub type IntoIter<K, V> = raw_table::IntoIter<Cached<K>, V>;
pub type Cursor<'a, K, V, S> = raw_table::Cursor<'a, Cached<K>, V, Hashed<S>>;

#[derive(Clone)]
pub struct ObjectMap<K, V, S = DefaultHashBuilder> {
    table: RawTable<Cached<K>, V, Hashed<S>>,
}

impl<K, V> ObjectMap<K, V, DefaultHashBuilder>
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

impl<K, V, S> Default for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ObjectMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    pub fn hasher(&self) -> &S {
        &self.table.policy().0
    }

    /// Entries in table order. Order changes when the table resizes.
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

    /// Looks for a value among the entries by a linear scan.
    ///
    /// With `identity` set, a stored value matches only if it is the very
    /// object `value` points to; otherwise values are compared with `==`.
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

impl<K, V, S> ObjectMap<K, V, S>
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

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.table.policy().0.hash_one(q)
    }

    fn find<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.table.find(hash, |k| k.borrow() == q)
    }

    /// Stores `value` under `key` and returns the value it replaced. The
    /// existing key is kept when one compares equal.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.table.entry_at(i)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.table.entry_at_mut(i).map(|(_, v)| v)
    }

    /// The value for `key`, or `default` when the key is absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.table.remove_at(i).map(|r| (r.key, r.value))
    }

    /// Vacates every slot and keeps the current capacity.
    pub fn clear(&mut self) {
        self.table.clear()
    }

    /// Clears the map and releases slots beyond `max_capacity`.
    pub fn clear_to(&mut self, max_capacity: usize) {
        self.table.clear_to(max_capacity)
    }

    /// Shrinks toward `max_capacity` without dropping below what the
    /// current entries need.
    pub fn shrink(&mut self, max_capacity: usize) {
        self.table.shrink(max_capacity)
    }

    /// Resizes once so `additional` more inserts need no further growth.
    ///
    /// # Panics
    ///
    /// Panics if `len() + additional` entries cannot fit in
    /// [`MAX_CAPACITY`](crate::MAX_CAPACITY) slots.
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.table.ensure_capacity(additional)
    }

    /// Fallible [`ObjectMap::ensure_capacity`]; leaves the map unchanged on
    /// `Error::InvalidCapacity`.
    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        self.table.try_ensure_capacity(additional)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        self.table.cursor()
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.table.retain(keep)
    }
}

impl<K, V, S> PartialEq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ObjectMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V, S> Index<&Q> for ObjectMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if the key is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in ObjectMap")
    }
}

impl<K, V, S> Extend<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
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

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ObjectMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ObjectMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn borrowed_lookups() {
        let mut m = ObjectMap::new();
        m.insert("alpha".to_string(), 1);
        m.insert("beta".to_string(), 2);
        assert_eq!(m.get("alpha"), Some(&1));
        assert!(m.contains_key("beta"));
        assert_eq!(m["beta"], 2);
        assert_eq!(m.remove("alpha"), Some(1));
        assert_eq!(m.get("alpha"), None);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn get_or_falls_back() {
        let mut m = ObjectMap::new();
        m.insert(3, "three");
        assert_eq!(*m.get_or(&3, &"none"), "three");
        assert_eq!(*m.get_or(&4, &"none"), "none");
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut m = ObjectMap::new();
        m.insert('x', vec![1]);
        m.get_mut(&'x').unwrap().push(2);
        assert_eq!(m[&'x'], vec![1, 2]);
        for v in m.values_mut() {
            v.clear();
        }
        assert!(m[&'x'].is_empty());
    }

    /// Invariant: identity lookup matches only the stored object itself.
    #[test]
    fn find_key_by_equality_and_identity() {
        let mut m = ObjectMap::new();
        m.insert("a", String::from("v"));
        m.insert("b", String::from("w"));
        let probe = String::from("v");
        assert_eq!(m.find_key(&probe, false), Some(&"a"));
        assert_eq!(m.find_key(&probe, true), None);
        let stored = m.get("b").unwrap();
        assert_eq!(m.find_key(stored, true), Some(&"b"));
        assert!(m.contains_value(&String::from("w"), false));
        assert!(!m.contains_value(&String::from("z"), false));
    }

    #[test]
    fn constructors_validate() {
        let m: ObjectMap<u8, u8> = ObjectMap::with_capacity_and_load_factor(5, 0.5).unwrap();
        assert_eq!(m.capacity(), 8);
        assert_eq!(m.load_factor(), 0.5);
        assert!(matches!(
            ObjectMap::<u8, u8>::with_capacity_and_load_factor(5, 1.0),
            Err(Error::InvalidLoadFactor { .. })
        ));
        assert!(ObjectMap::<u8, u8>::with_capacity(usize::MAX).is_err());
        assert_eq!(ObjectMap::<u8, u8>::new().capacity(), 64);
    }

    #[test]
    fn equality_ignores_layout() {
        let a: ObjectMap<i32, i32> = (0..100).map(|i| (i, i * i)).collect();
        let mut b = ObjectMap::with_capacity(4).unwrap();
        for i in (0..100).rev() {
            b.insert(i, i * i);
        }
        assert_ne!(a.capacity(), 0);
        assert_eq!(a, b);
        b.insert(0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_renders_as_map() {
        let mut m = ObjectMap::new();
        m.insert(1, "one");
        assert_eq!(format!("{m:?}"), "{1: \"one\"}");
    }

    #[test]
    fn cursor_and_retain() {
        let mut m: ObjectMap<u32, u32> = (0..50).map(|i| (i, i)).collect();
        let mut c = m.cursor();
        while let Some((k, v)) = c.next() {
            *v += 100;
            if k % 5 == 0 {
                c.remove().unwrap();
            }
        }
        assert_eq!(m.len(), 40);
        m.retain(|k, _| k % 2 == 1);
        assert_eq!(m.len(), 20);
        assert!(m.iter().all(|(k, v)| k % 2 == 1 && k % 5 != 0 && *v == k + 100));
    }

    #[test]
    fn extend_by_reference_and_into_iter() {
        let src = [(1u8, 10u8), (2, 20)];
        let mut m: ObjectMap<u8, u8> = ObjectMap::new();
        m.extend(src.iter().map(|(k, v)| (k, v)));
        let mut pairs: Vec<_> = m.clone().into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 10), (2, 20)]);
        for (_, v) in &mut m {
            *v += 1;
        }
        let total: u32 = (&m).into_iter().map(|(_, v)| *v as u32).sum();
        assert_eq!(total, 32);
    }

    #[test]
    #[should_panic(expected = "key not present")]
    fn index_panics_on_missing_key() {
        let m: ObjectMap<i32, i32> = ObjectMap::new();
        let _v = m[&7];
    }
}
