//! Serde support (feature `serde`).
//!
//! Maps serialize as serde maps and sets as sequences; ordered variants keep
//! insertion order on the way out and rebuild it on the way in. Every
//! deserializer repopulates through `insert`, so duplicate keys in the
//! input resolve the same way repeated inserts do (last value wins).
//!
//! [`as_pairs`] is a `#[serde(with = ...)]` adapter that writes any map as a
//! flat `[k0, v0, k1, v1, ...]` sequence, for formats or consumers that
//! cannot take non-string map keys.

use crate::identity_map::IdentityMap;
use crate::object_map::ObjectMap;
use crate::object_set::ObjectSet;
use crate::ordered_map::OrderedMap;
use crate::ordered_set::OrderedSet;
use crate::policy::PrimitiveKey;
use crate::primitive_map::PrimitiveMap;
use crate::primitive_set::PrimitiveSet;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maps that can be written and rebuilt one key/value pair at a time.
pub trait PairMap: Default {
    type Key;
    type Value;

    fn pair_count(&self) -> usize;

    /// Calls `f` on every entry in iteration order, stopping at the first error.
    fn try_for_each_pair<E>(
        &self,
        f: impl FnMut(&Self::Key, &Self::Value) -> Result<(), E>,
    ) -> Result<(), E>;

    fn insert_pair(&mut self, key: Self::Key, value: Self::Value);
}

impl<K, V, S> PairMap for ObjectMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = V;

    fn pair_count(&self) -> usize {
        self.len()
    }

    fn try_for_each_pair<E>(
        &self,
        mut f: impl FnMut(&K, &V) -> Result<(), E>,
    ) -> Result<(), E> {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }

    fn insert_pair(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K, V, S> PairMap for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    type Key = K;
    type Value = V;

    fn pair_count(&self) -> usize {
        self.len()
    }

    fn try_for_each_pair<E>(
        &self,
        mut f: impl FnMut(&K, &V) -> Result<(), E>,
    ) -> Result<(), E> {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }

    fn insert_pair(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

impl<K: PrimitiveKey, V> PairMap for PrimitiveMap<K, V> {
    type Key = K;
    type Value = V;

    fn pair_count(&self) -> usize {
        self.len()
    }

    fn try_for_each_pair<E>(
        &self,
        mut f: impl FnMut(&K, &V) -> Result<(), E>,
    ) -> Result<(), E> {
        self.iter().try_for_each(|(k, v)| f(&k, v))
    }

    fn insert_pair(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
}

struct MapVisitor<M>(PhantomData<M>);

impl<'de, M> Visitor<'de> for MapVisitor<M>
where
    M: PairMap,
    M::Key: Deserialize<'de>,
    M::Value: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = M::default();
        while let Some((k, v)) = access.next_entry::<M::Key, M::Value>()? {
            map.insert_pair(k, v);
        }
        Ok(map)
    }
}

struct SeqVisitor<C, T>(PhantomData<(C, T)>);

impl<'de, C, T> Visitor<'de> for SeqVisitor<C, T>
where
    C: Default + Extend<T>,
    T: Deserialize<'de>,
{
    type Value = C;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = C::default();
        while let Some(item) = seq.next_element::<T>()? {
            items.extend(core::iter::once(item));
        }
        Ok(items)
    }
}

impl<K, V, S> Serialize for ObjectMap<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, K, V, S> Deserialize<'de> for ObjectMap<K, V, S>
where
    K: Hash + Eq + Deserialize<'de>,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

impl<K, V, S> Serialize for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone + Serialize,
    V: Serialize,
    S: BuildHasher,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, K, V, S> Deserialize<'de> for OrderedMap<K, V, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

impl<K, V> Serialize for PrimitiveMap<K, V>
where
    K: PrimitiveKey + Serialize,
    V: Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, K, V> Deserialize<'de> for PrimitiveMap<K, V>
where
    K: PrimitiveKey + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

/// Identity maps serialize their keys by value; there is no way to restore
/// the original allocations, so they are not deserializable.
impl<K, V> Serialize for IdentityMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<K: Serialize, S> Serialize for ObjectSet<K, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K, S> Deserialize<'de> for ObjectSet<K, S>
where
    K: Hash + Eq + Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor::<Self, K>(PhantomData))
    }
}

impl<K: Serialize, S> Serialize for OrderedSet<K, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K, S> Deserialize<'de> for OrderedSet<K, S>
where
    K: Hash + Eq + Clone + Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor::<Self, K>(PhantomData))
    }
}

impl<K: PrimitiveKey + Serialize> Serialize for PrimitiveSet<K> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K> Deserialize<'de> for PrimitiveSet<K>
where
    K: PrimitiveKey + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(SeqVisitor::<Self, K>(PhantomData))
    }
}

/// Flat `[k0, v0, k1, v1, ...]` encoding for any [`PairMap`].
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Scores {
///     #[serde(with = "merry_maps::serde_impls::as_pairs")]
///     by_id: IntMap<String>,
/// }
/// ```
pub mod as_pairs {
    use super::PairMap;
    use core::fmt;
    use core::marker::PhantomData;
    use serde::de::{self, SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<M, Ser>(map: &M, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        M: PairMap,
        M::Key: Serialize,
        M::Value: Serialize,
        Ser: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(map.pair_count() * 2))?;
        map.try_for_each_pair(|k, v| {
            seq.serialize_element(k)?;
            seq.serialize_element(v)
        })?;
        seq.end()
    }

    pub fn deserialize<'de, M, D>(deserializer: D) -> Result<M, D::Error>
    where
        M: PairMap,
        M::Key: Deserialize<'de>,
        M::Value: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct PairsVisitor<M>(PhantomData<M>);

        impl<'de, M> Visitor<'de> for PairsVisitor<M>
        where
            M: PairMap,
            M::Key: Deserialize<'de>,
            M::Value: Deserialize<'de>,
        {
            type Value = M;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a flat sequence of alternating keys and values")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut map = M::default();
                let mut read = 0;
                while let Some(key) = seq.next_element::<M::Key>()? {
                    let value = seq
                        .next_element::<M::Value>()?
                        .ok_or_else(|| de::Error::invalid_length(read + 1, &self))?;
                    map.insert_pair(key, value);
                    read += 2;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_seq(PairsVisitor(PhantomData))
    }
}
