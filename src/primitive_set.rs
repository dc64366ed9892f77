//! PrimitiveSet: integer set with `0` kept outside the table.

use crate::config::{TableConfig, DEFAULT_LOAD_FACTOR};
use crate::error::{Error, Result};
use crate::policy::{PrimitiveKey, Raw};
use crate::raw_table::{self, RawTable};
use core::fmt;

pub type IntSet = PrimitiveSet<i32>;
pub type LongSet = PrimitiveSet<i64>;

#[derive(Clone)]
pub struct PrimitiveSet<K> {
    table: RawTable<K, (), Raw>,
    has_zero: bool,
}

/// Iterator over the items, `0` first.
pub struct Iter<'a, K> {
    zero: bool,
    inner: raw_table::Iter<'a, K, ()>,
}

impl<K: PrimitiveKey> Iterator for Iter<'_, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        if core::mem::take(&mut self.zero) {
            return Some(K::ZERO);
        }
        self.inner.next().map(|(k, _)| *k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.inner.len() + usize::from(self.zero);
        (n, Some(n))
    }
}

impl<K: PrimitiveKey> ExactSizeIterator for Iter<'_, K> {}

/// Removing cursor over a [`PrimitiveSet`]; visits `0` first.
pub struct Cursor<'a, K> {
    has_zero: &'a mut bool,
    zero_current: bool,
    zero_passed: bool,
    inner: raw_table::Cursor<'a, K, (), Raw>,
}

impl<K: PrimitiveKey> Cursor<'_, K> {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<K> {
        self.zero_current = false;
        if !self.zero_passed {
            self.zero_passed = true;
            if *self.has_zero {
                self.zero_current = true;
                return Some(K::ZERO);
            }
        }
        self.inner.next().map(|(k, _)| *k)
    }

    /// Removes the item last returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<K> {
        if self.zero_current {
            self.zero_current = false;
            if !core::mem::take(self.has_zero) {
                return Err(Error::NoCurrentEntry);
            }
            return Ok(K::ZERO);
        }
        self.inner.remove().map(|(k, _)| k)
    }
}

impl<K: PrimitiveKey> Default for PrimitiveSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PrimitiveKey> PrimitiveSet<K> {
    pub fn new() -> Self {
        Self {
            table: RawTable::with_policy(Raw),
            has_zero: false,
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
            has_zero: false,
        })
    }

    pub fn len(&self) -> usize {
        self.table.len() + usize::from(self.has_zero)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns `true` if `item` was not yet present.
    pub fn insert(&mut self, item: K) -> bool {
        if item == K::ZERO {
            return !core::mem::replace(&mut self.has_zero, true);
        }
        self.table.insert(item, ()).is_none()
    }

    pub fn contains(&self, item: K) -> bool {
        if item == K::ZERO {
            return self.has_zero;
        }
        self.table.contains_key(&item)
    }

    pub fn remove(&mut self, item: K) -> bool {
        if item == K::ZERO {
            return core::mem::take(&mut self.has_zero);
        }
        self.table.remove(&item).is_some()
    }

    /// Some item of the set: `0` if present, else the first in table order.
    pub fn first(&self) -> Option<K> {
        self.iter().next()
    }

    pub fn clear(&mut self) {
        self.has_zero = false;
        self.table.clear()
    }

    pub fn clear_to(&mut self, max_capacity: usize) {
        self.has_zero = false;
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

    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            zero: self.has_zero,
            inner: self.table.iter(),
        }
    }

    pub fn cursor(&mut self) -> Cursor<'_, K> {
        let Self { table, has_zero } = self;
        Cursor {
            has_zero,
            zero_current: false,
            zero_passed: false,
            inner: table.cursor(),
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(K) -> bool) {
        if self.has_zero && !keep(K::ZERO) {
            self.has_zero = false;
        }
        self.table.retain(|k, _| keep(*k))
    }
}

impl<K: PrimitiveKey> PartialEq for PrimitiveSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}

impl<K: PrimitiveKey> Eq for PrimitiveSet<K> {}

impl<K: PrimitiveKey> fmt::Debug for PrimitiveSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PrimitiveKey> Extend<K> for PrimitiveSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0);
        for k in iter {
            self.insert(k);
        }
    }
}

impl<'a, K: PrimitiveKey + 'a> Extend<&'a K> for PrimitiveSet<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K: PrimitiveKey> FromIterator<K> for PrimitiveSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, K: PrimitiveKey> IntoIterator for &'a PrimitiveSet<K> {
    type Item = K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_an_ordinary_member() {
        let mut s = IntSet::new();
        assert!(s.insert(0));
        assert!(!s.insert(0));
        assert!(s.insert(-4));
        assert!(s.contains(0));
        assert_eq!(s.len(), 2);
        assert_eq!(s.first(), Some(0));
        assert!(s.remove(0));
        assert!(!s.remove(0));
        assert_eq!(s.first(), Some(-4));
        assert_eq!(format!("{s:?}"), "{-4}");
    }

    /// Invariant: the cursor returns `0` first, then each table item once.
    #[test]
    fn cursor_covers_zero_and_table() {
        let mut s: LongSet = (-50..50).collect();
        let mut c = s.cursor();
        assert_eq!(c.remove(), Err(Error::NoCurrentEntry));
        assert_eq!(c.next(), Some(0));
        assert_eq!(c.remove(), Ok(0));
        assert_eq!(c.remove(), Err(Error::NoCurrentEntry));
        let mut seen = Vec::new();
        while let Some(k) = c.next() {
            seen.push(k);
            if k % 2 != 0 {
                c.remove().unwrap();
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (-50..50).filter(|&k| k != 0).collect::<Vec<_>>());
        assert_eq!(s.len(), 49);
        assert!(s.iter().all(|k| k % 2 == 0 && k != 0));
    }

    #[test]
    fn retain_extend_and_equality() {
        let mut a: IntSet = (0..100).collect();
        a.retain(|k| k % 7 == 0);
        let mut b = IntSet::new();
        b.extend(&[98, 91, 84, 77, 70, 63, 56, 49, 42, 35, 28, 21, 14, 7, 0]);
        assert_eq!(a, b);
        b.clear();
        assert!(b.is_empty());
        assert_ne!(a, b);
    }
}
