//! PrimitiveMap: integer-keyed map with unboxed keys.
//!
//! The key array holds the raw integers and `0` marks a vacant slot, so key
//! `0` itself lives outside the table in `zero_value`. Every operation
//! checks for the zero key first; iteration and cursors yield it before the
//! table entries.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::{Error, Result};
use crate::policy::{PrimitiveKey, Raw};
use crate::raw_table::{self, RawTable};
use core::fmt;

pub type IntMap<V> = PrimitiveMap<i32, V>;
pub type LongMap<V> = PrimitiveMap<i64, V>;
pub type IntFloatMap = PrimitiveMap<i32, f32>;
pub type IntIntMap = PrimitiveMap<i32, i32>;

/// Values that [`PrimitiveMap::get_and_increment`] can count with.
///
/// Integers use wrapping addition in every build profile, so a counter at
/// `MAX` moves to `MIN` rather than panicking in debug builds.
pub trait Counter: Copy {
    fn increment(self, by: Self) -> Self;
}

macro_rules! wrapping_counter {
    ($($t:ty),*) => {$(
        impl Counter for $t {
            #[inline]
            fn increment(self, by: Self) -> Self {
                self.wrapping_add(by)
            }
        }
    )*};
}

wrapping_counter!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Counter for f32 {
    #[inline]
    fn increment(self, by: Self) -> Self {
        self + by
    }
}

impl Counter for f64 {
    #[inline]
    fn increment(self, by: Self) -> Self {
        self + by
    }
}

#[derive(Clone)]
pub struct PrimitiveMap<K, V> {
    table: RawTable<K, V, Raw>,
    zero_value: Option<V>,
}

/// Iterator over `(key, &value)`, zero key first.
pub struct Iter<'a, K, V> {
    zero: Option<&'a V>,
    inner: raw_table::Iter<'a, K, V>,
}

impl<'a, K: PrimitiveKey, V> Iterator for Iter<'a, K, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            return Some((K::ZERO, v));
        }
        self.inner.next().map(|(k, v)| (*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.inner.len() + usize::from(self.zero.is_some());
        (n, Some(n))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over `(key, &mut value)`, zero key first.
pub struct IterMut<'a, K, V> {
    zero: Option<&'a mut V>,
    inner: raw_table::IterMut<'a, K, V>,
}

impl<'a, K: PrimitiveKey, V> Iterator for IterMut<'a, K, V> {
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            return Some((K::ZERO, v));
        }
        self.inner.next().map(|(k, v)| (*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.inner.len() + usize::from(self.zero.is_some());
        (n, Some(n))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IterMut<'_, K, V> {}

pub struct IntoIter<K, V> {
    zero: Option<V>,
    inner: raw_table::IntoIter<K, V>,
}

impl<K: PrimitiveKey, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            return Some((K::ZERO, v));
        }
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.inner.len() + usize::from(self.zero.is_some());
        (n, Some(n))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IntoIter<K, V> {}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ZeroState {
    Pending,
    Current,
    Passed,
}

/// Removing cursor over a [`PrimitiveMap`]; visits the zero key first.
pub struct Cursor<'a, K, V> {
    zero: &'a mut Option<V>,
    state: ZeroState,
    inner: raw_table::Cursor<'a, K, V, Raw>,
}

impl<K: PrimitiveKey, V> Cursor<'_, K, V> {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(K, &mut V)> {
        if self.state == ZeroState::Pending && self.zero.is_some() {
            self.state = ZeroState::Current;
            return self.zero.as_mut().map(|v| (K::ZERO, v));
        }
        self.state = ZeroState::Passed;
        self.inner.next().map(|(k, v)| (*k, v))
    }

    /// Removes the entry last returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<(K, V)> {
        if self.state == ZeroState::Current {
            self.state = ZeroState::Passed;
            return self
                .zero
                .take()
                .map(|v| (K::ZERO, v))
                .ok_or(Error::NoCurrentEntry);
        }
        self.inner.remove()
    }
}

impl<K: PrimitiveKey, V> Default for PrimitiveMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey, V> PrimitiveMap<K, V> {
    /// Entries including the zero key.
    pub fn len(&self) -> usize {
        self.table.len() + usize::from(self.zero_value.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots in the table; the zero key needs none.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Whether key `0` is present.
    pub fn has_zero(&self) -> bool {
        self.zero_value.is_some()
    }

    pub fn zero_value(&self) -> Option<&V> {
        self.zero_value.as_ref()
    }
}

impl<K: PrimitiveKey, V> PrimitiveMap<K, V> {
    pub fn new() -> Self {
        Self {
            table: RawTable::with_policy(Raw),
            zero_value: None,
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
            table: RawTable::with_config_and_policy(config, Raw)?,
            zero_value: None,
        })
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if key == K::ZERO {
            return self.zero_value.replace(value);
        }
        self.table.insert(key, value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        if key == K::ZERO {
            return self.zero_value.as_ref();
        }
        self.table.get(&key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if key == K::ZERO {
            return self.zero_value.as_mut();
        }
        self.table.get_mut(&key)
    }

    /// The value for `key`, or `default` when the key is absent.
    pub fn get_or(&self, key: K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Adds `increment` to the value for `key` and returns the value from
    /// before the addition. An absent key starts from `default`. Integer
    /// values wrap on overflow, see [`Counter`].
    pub fn get_and_increment(&mut self, key: K, default: V, increment: V) -> V
    where
        V: Counter,
    {
        let slot = if key == K::ZERO {
            self.zero_value.get_or_insert(default)
        } else {
            let i = self.table.find_or_insert_with(key, || default);
            self.table.entry_at_mut(i).expect("index just found or inserted").1
        };
        let old = *slot;
        *slot = old.increment(increment);
        old
    }

    pub fn contains_key(&self, key: K) -> bool {
        if key == K::ZERO {
            return self.zero_value.is_some();
        }
        self.table.contains_key(&key)
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        if key == K::ZERO {
            return self.zero_value.take();
        }
        self.table.remove(&key).map(|(_, v)| v)
    }

    /// Linear scan for a value, zero key first; `identity` compares
    /// addresses instead of `==`.
    pub fn find_key(&self, value: &V, identity: bool) -> Option<K>
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

    pub fn clear(&mut self) {
        self.zero_value = None;
        self.table.clear()
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.zero_value = None;
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

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            zero: self.zero_value.as_ref(),
            inner: self.table.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            zero: self.zero_value.as_mut(),
            inner: self.table.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        let Self { table, zero_value } = self;
        Cursor {
            zero: zero_value,
            state: ZeroState::Pending,
            inner: table.cursor(),
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(K, &mut V) -> bool) {
        if let Some(v) = self.zero_value.as_mut() {
            if !keep(K::ZERO, v) {
                self.zero_value = None;
            }
        }
        self.table.retain(|k, v| keep(*k, v))
    }
}

impl<K: PrimitiveKey, V: PartialEq> PartialEq for PrimitiveMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: PrimitiveKey, V: Eq> Eq for PrimitiveMap<K, V> {}

impl<K: PrimitiveKey, V: fmt::Debug> fmt::Debug for PrimitiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PrimitiveKey, V> Extend<(K, V)> for PrimitiveMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: PrimitiveKey, V> FromIterator<(K, V)> for PrimitiveMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: PrimitiveKey, V> IntoIterator for PrimitiveMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            zero: self.zero_value,
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K: PrimitiveKey, V> IntoIterator for &'a PrimitiveMap<K, V> {
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
