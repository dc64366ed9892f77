//! RawTable: the open-addressing engine shared by every map and set.
//!
//! Layout is a pair of parallel boxed slices, one of key slots and one of
//! values, whose length is a power of two. Keys are placed with Fibonacci
//! hashing and probed linearly. Insertion uses Robin Hood displacement: a
//! key that has travelled further from its home slot than the resident it
//! meets takes that slot, and the resident continues probing. Removal
//! closes the gap by shifting the rest of the chain back one slot until it
//! reaches an empty slot or a key sitting at its home. No tombstones are
//! ever left behind.
//!
//! Invariants
//! - `capacity` is a power of two, at least 2.
//! - `len < threshold < capacity` between operations; growth happens
//!   before an insert that would reach the threshold.
//! - Along any run of occupied slots, probe distances never drop by more
//!   than one from one slot to the next. Lookups stop early when they walk
//!   past a resident closer to home than the probe itself.
//! - Resizing reinserts every key from scratch using the hash stored with
//!   it; old slot positions are never reused across capacities.

use crate::config::{self, TableConfig, MAX_CAPACITY};
use crate::error::{Error, Result};
use crate::placement::{place, probe_distance, shift_for};
use crate::policy::{KeyPolicy, Slot};
use crate::reentrancy::DebugReentrancy;
use core::fmt;
use core::mem;

pub struct RawTable<T, V, P> {
    policy: P,
    slots: Box<[T]>,
    values: Box<[Option<V>]>,
    len: usize,
    load_factor: f32,
    threshold: usize,
    mask: usize,
    shift: u32,
    reentrancy: DebugReentrancy,
}

/// An entry taken out by [`RawTable::remove_at`], with the slot where the
/// backward shift stopped.
#[derive(Debug)]
pub struct Removed<K, V> {
    pub key: K,
    pub value: V,
    /// Index left vacant once the chain was compacted.
    pub end: usize,
}

impl<T: Slot, V, P> RawTable<T, V, P> {
    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Live entry count at which the next insert grows the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Key and value stored at `index`, if that slot is occupied.
    pub fn entry_at(&self, index: usize) -> Option<(&T::Key, &V)> {
        let key = self.slots.get(index)?.key()?;
        let value = self.values[index].as_ref()?;
        Some((key, value))
    }

    pub fn entry_at_mut(&mut self, index: usize) -> Option<(&T::Key, &mut V)> {
        let key = self.slots.get(index)?.key()?;
        let value = self.values[index].as_mut()?;
        Some((key, value))
    }

    pub fn iter(&self) -> Iter<'_, T, V> {
        Iter {
            slots: self.slots.iter(),
            values: self.values.iter(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, V> {
        IterMut {
            slots: self.slots.iter(),
            values: self.values.iter_mut(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &T::Key> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }
}

impl<T: Slot, V, P: KeyPolicy<T::Key, Slot = T>> RawTable<T, V, P> {
    pub fn with_policy(policy: P) -> Self {
        let config = TableConfig::default();
        Self::build(policy, config::round_capacity(config.initial_capacity), config.load_factor)
    }

    pub fn with_config_and_policy(config: TableConfig, policy: P) -> Result<Self> {
        let capacity = config.table_capacity()?;
        Ok(Self::build(policy, capacity, config.load_factor))
    }

    fn build(policy: P, capacity: usize, load_factor: f32) -> Self {
        let (slots, values) = Self::allocate(capacity);
        let mut table = Self {
            policy,
            slots,
            values,
            len: 0,
            load_factor,
            threshold: 0,
            mask: 0,
            shift: 0,
            reentrancy: DebugReentrancy::new(),
        };
        table.set_geometry(capacity);
        table
    }

    fn allocate(capacity: usize) -> (Box<[T]>, Box<[Option<V>]>) {
        let slots = core::iter::repeat_with(T::vacant)
            .take(capacity)
            .collect();
        let values = core::iter::repeat_with(|| None).take(capacity).collect();
        (slots, values)
    }

    fn set_geometry(&mut self, capacity: usize) {
        self.mask = capacity - 1;
        self.shift = shift_for(capacity);
        self.threshold = config::threshold_for(capacity, self.load_factor);
    }

    #[inline]
    fn home(&self, hash: u64) -> usize {
        place(hash, self.shift)
    }

    /// Index of the entry stored under `hash` for which `eq` holds.
    pub fn find(&self, hash: u64, mut eq: impl FnMut(&T::Key) -> bool) -> Option<usize> {
        let _g = self.reentrancy.enter("find");
        let mut i = self.home(hash);
        let mut dist = 0;
        loop {
            let slot = &self.slots[i];
            let resident = slot.key()?;
            if slot.hash() == hash && eq(resident) {
                return Some(i);
            }
            if probe_distance(self.home(slot.hash()), i, self.mask) < dist {
                return None;
            }
            i = (i + 1) & self.mask;
            dist += 1;
        }
    }

    /// Index of `key` using the policy's equality.
    pub fn find_key(&self, key: &T::Key) -> Option<usize> {
        let hash = self.policy.hash(key);
        self.find(hash, |k| self.policy.eq(k, key))
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.find_key(key).is_some()
    }

    pub fn get(&self, key: &T::Key) -> Option<&V> {
        self.find_key(key).and_then(|i| self.values[i].as_ref())
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut V> {
        let i = self.find_key(key)?;
        self.values[i].as_mut()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: T::Key, value: V) -> Option<V> {
        let hash = self.policy.hash(&key);
        if let Some(i) = self.find(hash, |k| self.policy.eq(k, &key)) {
            return self.values[i].replace(value);
        }
        self.insert_new(hash, key, value);
        None
    }

    /// Index of `key`, inserting `default()` first if it is absent.
    pub fn find_or_insert_with(&mut self, key: T::Key, default: impl FnOnce() -> V) -> usize {
        let hash = self.policy.hash(&key);
        match self.find(hash, |k| self.policy.eq(k, &key)) {
            Some(i) => i,
            None => self.insert_new(hash, key, default()),
        }
    }

    /// Inserts a key the caller knows is absent and returns where it landed.
    ///
    /// Grows first when this insert would bring the table to its threshold,
    /// so the returned index stays valid.
    pub fn insert_new(&mut self, hash: u64, key: T::Key, value: V) -> usize {
        if self.len + 1 >= self.threshold {
            self.grow();
        }
        let at = self.insert_unique(hash, key, value);
        self.len += 1;
        at
    }

    /// Robin Hood insertion without a duplicate check or growth check.
    fn insert_unique(&mut self, hash: u64, key: T::Key, value: V) -> usize {
        let mask = self.mask;
        let mut carried = T::occupied(key, hash);
        let mut carried_value = Some(value);
        let mut carried_home = self.home(hash);
        let mut landed = None;
        let mut i = carried_home;
        loop {
            if self.slots[i].is_vacant() {
                self.slots[i] = carried;
                self.values[i] = carried_value;
                return landed.unwrap_or(i);
            }
            let resident_home = self.home(self.slots[i].hash());
            if probe_distance(resident_home, i, mask) < probe_distance(carried_home, i, mask) {
                mem::swap(&mut self.slots[i], &mut carried);
                mem::swap(&mut self.values[i], &mut carried_value);
                carried_home = resident_home;
                if landed.is_none() {
                    landed = Some(i);
                }
            }
            i = (i + 1) & mask;
        }
    }

    pub fn remove(&mut self, key: &T::Key) -> Option<(T::Key, V)> {
        let i = self.find_key(key)?;
        self.remove_at(i).map(|r| (r.key, r.value))
    }

    /// Removes the entry at `index` and compacts the chain behind it.
    pub fn remove_at(&mut self, index: usize) -> Option<Removed<T::Key, V>> {
        let value = self.values.get_mut(index)?.take()?;
        let key = self.slots[index].take()?;
        self.len -= 1;

        let mut gap = index;
        loop {
            let next = (gap + 1) & self.mask;
            let slot = &self.slots[next];
            if slot.is_vacant() || self.home(slot.hash()) == next {
                break;
            }
            self.slots.swap(gap, next);
            self.values.swap(gap, next);
            gap = next;
        }
        Some(Removed {
            key,
            value,
            end: gap,
        })
    }

    fn grow(&mut self) {
        let capacity = self.capacity();
        if capacity >= MAX_CAPACITY {
            panic!("merry-maps: capacity overflow (table already holds {capacity} slots)");
        }
        self.resize(capacity << 1);
    }

    /// Reallocates at `new_capacity` and reinserts every entry.
    fn resize(&mut self, new_capacity: usize) {
        log::debug!(
            "resizing table from {} to {} slots ({} entries)",
            self.capacity(),
            new_capacity,
            self.len
        );
        let (slots, values) = Self::allocate(new_capacity);
        let old_slots = mem::replace(&mut self.slots, slots);
        let old_values = mem::replace(&mut self.values, values);
        self.set_geometry(new_capacity);

        for (mut slot, value) in old_slots.into_vec().into_iter().zip(old_values.into_vec()) {
            let hash = slot.hash();
            if let (Some(key), Some(value)) = (slot.take(), value) {
                self.insert_unique(hash, key, value);
            }
        }
    }

    /// Makes room for `additional` more entries without further growth.
    ///
    /// # Panics
    ///
    /// Panics if the entries would not fit in [`MAX_CAPACITY`] slots; see
    /// [`RawTable::try_ensure_capacity`].
    pub fn ensure_capacity(&mut self, additional: usize) {
        if let Err(err) = self.try_ensure_capacity(additional) {
            panic!("merry-maps: capacity overflow: {err}");
        }
    }

    /// Like [`RawTable::ensure_capacity`], but reports a request that cannot
    /// fit instead of panicking. The table is unchanged on error.
    pub fn try_ensure_capacity(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .len
            .checked_add(additional)
            .ok_or(Error::invalid_capacity(usize::MAX))?;
        if needed < self.threshold {
            return Ok(());
        }
        let target = config::capacity_for_len(needed, self.load_factor)
            .ok_or(Error::invalid_capacity(needed))?;
        if target > self.capacity() {
            self.resize(target);
        }
        Ok(())
    }

    /// Reduces capacity to `max_capacity` (rounded up to a power of two), or
    /// to the smallest capacity that still holds every entry below the
    /// threshold. Never grows the table.
    pub fn shrink(&mut self, max_capacity: usize) {
        let target = config::round_capacity(max_capacity)
            .max(config::capacity_for_len(self.len, self.load_factor).unwrap_or(self.capacity()));
        if self.capacity() > target {
            self.resize(target);
        }
    }

    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        for slot in self.slots.iter_mut() {
            slot.take();
        }
        for value in self.values.iter_mut() {
            *value = None;
        }
        self.len = 0;
    }

    /// Clears and, if the table is larger than `max_capacity`, reallocates
    /// it at that size.
    pub fn clear_to(&mut self, max_capacity: usize) {
        if self.capacity() <= max_capacity {
            self.clear();
            return;
        }
        let capacity = config::round_capacity(max_capacity);
        log::debug!(
            "clearing table and shrinking from {} to {} slots",
            self.capacity(),
            capacity
        );
        let (slots, values) = Self::allocate(capacity);
        self.slots = slots;
        self.values = values;
        self.len = 0;
        self.set_geometry(capacity);
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&T::Key, &mut V) -> bool) {
        let mut cursor = self.cursor();
        while let Some((k, v)) = cursor.next() {
            if !keep(k, v) {
                // `next` just returned an entry, so there is one to remove.
                let _ = cursor.remove();
            }
        }
    }

    /// A removing cursor over the table in slot order.
    pub fn cursor(&mut self) -> Cursor<'_, T, V, P> {
        let limit = self.capacity();
        Cursor {
            table: self,
            next: 0,
            limit,
            current: None,
        }
    }
}

impl<T, V, P> Clone for RawTable<T, V, P>
where
    T: Clone,
    V: Clone,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            slots: self.slots.clone(),
            values: self.values.clone(),
            len: self.len,
            load_factor: self.load_factor,
            threshold: self.threshold,
            mask: self.mask,
            shift: self.shift,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<T, V, P> fmt::Debug for RawTable<T, V, P>
where
    T: Slot,
    T::Key: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` in slot order.
pub struct Iter<'a, T, V> {
    slots: core::slice::Iter<'a, T>,
    values: core::slice::Iter<'a, Option<V>>,
    remaining: usize,
}

impl<'a, T: Slot, V> Iterator for Iter<'a, T, V> {
    type Item = (&'a T::Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (slot, value) in (&mut self.slots).zip(&mut self.values) {
            if let (Some(k), Some(v)) = (slot.key(), value.as_ref()) {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Slot, V> ExactSizeIterator for Iter<'_, T, V> {}

impl<T, V> Clone for Iter<'_, T, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            values: self.values.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(&K, &mut V)` in slot order.
pub struct IterMut<'a, T, V> {
    slots: core::slice::Iter<'a, T>,
    values: core::slice::IterMut<'a, Option<V>>,
    remaining: usize,
}

impl<'a, T: Slot, V> Iterator for IterMut<'a, T, V> {
    type Item = (&'a T::Key, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for (slot, value) in (&mut self.slots).zip(&mut self.values) {
            if let (Some(k), Some(v)) = (slot.key(), value.as_mut()) {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Slot, V> ExactSizeIterator for IterMut<'_, T, V> {}

/// Owning iterator over `(K, V)` in slot order.
pub struct IntoIter<T, V> {
    slots: std::vec::IntoIter<T>,
    values: std::vec::IntoIter<Option<V>>,
    remaining: usize,
}

impl<T: Slot, V> Iterator for IntoIter<T, V> {
    type Item = (T::Key, V);

    fn next(&mut self) -> Option<Self::Item> {
        for (mut slot, value) in (&mut self.slots).zip(&mut self.values) {
            if let (Some(k), Some(v)) = (slot.take(), value) {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Slot, V> ExactSizeIterator for IntoIter<T, V> {}

impl<T: Slot, V, P: KeyPolicy<T::Key, Slot = T>> IntoIterator for RawTable<T, V, P> {
    type Item = (T::Key, V);
    type IntoIter = IntoIter<T, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            slots: self.slots.into_vec().into_iter(),
            values: self.values.into_vec().into_iter(),
        }
    }
}

impl<'a, T: Slot, V, P: KeyPolicy<T::Key, Slot = T>> IntoIterator for &'a RawTable<T, V, P> {
    type Item = (&'a T::Key, &'a V);
    type IntoIter = Iter<'a, T, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks a table in slot order and can remove the entry it last returned.
///
/// Holding the cursor borrows the table mutably, so no other iteration or
/// mutation can observe the table while entries shift underneath it. After
/// each removal the cursor repositions itself from the slot where the
/// backward shift ended, so every entry is returned exactly once even when
/// the shifted chain wraps past the end of the table.
pub struct Cursor<'a, T, V, P> {
    table: &'a mut RawTable<T, V, P>,
    next: usize,
    // Slots at `limit..capacity` hold entries that wrapped around from the
    // front of the table after they were already returned.
    limit: usize,
    current: Option<usize>,
}

impl<T: Slot, V, P: KeyPolicy<T::Key, Slot = T>> Cursor<'_, T, V, P> {
    /// Advances to the next occupied slot.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&T::Key, &mut V)> {
        self.current = None;
        while self.next < self.limit {
            let i = self.next;
            self.next += 1;
            if !self.table.slots[i].is_vacant() {
                self.current = Some(i);
                break;
            }
        }
        let i = self.current?;
        let table = &mut *self.table;
        let key = table.slots[i].key()?;
        let value = table.values[i].as_mut()?;
        Some((key, value))
    }

    /// Removes the entry most recently returned by [`Cursor::next`].
    pub fn remove(&mut self) -> Result<(T::Key, V)> {
        let current = self.current.take().ok_or(Error::NoCurrentEntry)?;
        let removed = self
            .table
            .remove_at(current)
            .ok_or(Error::NoCurrentEntry)?;
        let end = if removed.end < current {
            removed.end + self.table.capacity()
        } else {
            removed.end
        };
        // The shift pulled one already-returned entry out of the tail zone.
        if self.limit <= end {
            self.limit -= 1;
        }
        // Whatever shifted into `current` has not been returned yet.
        self.next = current;
        Ok((removed.key, removed.value))
    }

    /// Entries left in the table, including ones already returned.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}
