//! Key capabilities the probing engine is parameterized by.
//!
//! A table needs three things from its key type: an empty sentinel for
//! vacant slots ([`Slot`]), an integer hash to feed placement, and an
//! equality test ([`KeyPolicy`]). Object keys use `Option` as the sentinel
//! and remember the hash they were inserted with, so resizing and
//! compaction never call back into user `Hash`. Primitive keys reserve `0`
//! as the sentinel and are their own hash; the wrappers keep key `0` in a
//! separate slot outside the table.

use core::fmt::Debug;
use core::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

/// Storage for one table slot: either vacant or holding a key.
pub trait Slot: Sized {
    type Key;

    fn vacant() -> Self;

    /// Slot holding `key`, inserted under `hash`.
    fn occupied(key: Self::Key, hash: u64) -> Self;

    fn key(&self) -> Option<&Self::Key>;

    /// Hash recorded at insertion. Meaningless for vacant slots.
    fn hash(&self) -> u64;

    /// Vacates the slot and returns its key.
    fn take(&mut self) -> Option<Self::Key>;

    #[inline]
    fn is_vacant(&self) -> bool {
        self.key().is_none()
    }
}

/// Slot for object keys: the key plus the hash it was placed with.
#[derive(Clone, Debug)]
pub struct Cached<K>(Option<(u64, K)>);

impl<K> Slot for Cached<K> {
    type Key = K;

    #[inline]
    fn vacant() -> Self {
        Cached(None)
    }

    #[inline]
    fn occupied(key: K, hash: u64) -> Self {
        Cached(Some((hash, key)))
    }

    #[inline]
    fn key(&self) -> Option<&K> {
        self.0.as_ref().map(|(_, k)| k)
    }

    #[inline]
    fn hash(&self) -> u64 {
        self.0.as_ref().map_or(0, |(h, _)| *h)
    }

    #[inline]
    fn take(&mut self) -> Option<K> {
        self.0.take().map(|(_, k)| k)
    }
}

/// Hash extraction and equality for keys of type `K`.
pub trait KeyPolicy<K> {
    type Slot: Slot<Key = K>;

    fn hash(&self, key: &K) -> u64;

    fn eq(&self, stored: &K, probe: &K) -> bool;
}

/// Value equality with hashes from a [`BuildHasher`].
#[derive(Clone, Debug, Default)]
pub struct Hashed<S>(pub S);

impl<K, S> KeyPolicy<K> for Hashed<S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Slot = Cached<K>;

    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.0.hash_one(key)
    }

    #[inline]
    fn eq(&self, stored: &K, probe: &K) -> bool {
        stored == probe
    }
}

/// Pointer-like keys whose identity is the address they point to.
pub trait Identity {
    fn address(&self) -> usize;
}

/// The address of the referent, without slice length or vtable.
///
/// References to zero-sized values carry no allocation of their own: two
/// distinct `&()` (or two elements of a `[(); N]`, or empty slices) may share
/// one address and then count as the same key. Use `Rc`/`Arc` when
/// zero-sized keys must stay distinct.
impl<T: ?Sized> Identity for &T {
    #[inline]
    fn address(&self) -> usize {
        *self as *const T as *const () as usize
    }
}

impl<T: ?Sized> Identity for Rc<T> {
    #[inline]
    fn address(&self) -> usize {
        Rc::as_ptr(self) as *const () as usize
    }
}

impl<T: ?Sized> Identity for Arc<T> {
    #[inline]
    fn address(&self) -> usize {
        Arc::as_ptr(self) as *const () as usize
    }
}

/// Reference identity: two keys match only if they point to the same
/// allocation. Addresses have degenerate low bits (alignment), which
/// Fibonacci placement absorbs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByIdentity;

impl<K: Identity> KeyPolicy<K> for ByIdentity {
    type Slot = Cached<K>;

    #[inline]
    fn hash(&self, key: &K) -> u64 {
        key.address() as u64
    }

    #[inline]
    fn eq(&self, stored: &K, probe: &K) -> bool {
        stored.address() == probe.address()
    }
}

/// Integer key types stored unboxed with `0` as the vacant sentinel.
pub trait PrimitiveKey: Copy + Eq + Hash + Debug + Slot<Key = Self> {
    const ZERO: Self;

    /// The key widened to 64 bits (sign-extended for signed types).
    fn widen(self) -> u64;
}

macro_rules! primitive_key {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl Slot for $t {
            type Key = $t;

            #[inline]
            fn vacant() -> Self {
                0
            }

            #[inline]
            fn occupied(key: $t, _hash: u64) -> Self {
                debug_assert!(key != 0, "key 0 is the vacant sentinel");
                key
            }

            #[inline]
            fn key(&self) -> Option<&$t> {
                if *self == 0 { None } else { Some(self) }
            }

            #[inline]
            fn hash(&self) -> u64 {
                self.widen()
            }

            #[inline]
            fn take(&mut self) -> Option<$t> {
                let k = core::mem::replace(self, 0);
                if k == 0 { None } else { Some(k) }
            }
        }

        impl PrimitiveKey for $t {
            const ZERO: Self = 0;

            #[inline]
            fn widen(self) -> u64 {
                self as $wide as u64
            }
        }
    )*};
}

primitive_key!(i32 => i64, i64 => i64, u32 => u64, u64 => u64);

/// Raw integer equality; the key itself is the hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct Raw;

impl<K: PrimitiveKey> KeyPolicy<K> for Raw {
    type Slot = K;

    #[inline]
    fn hash(&self, key: &K) -> u64 {
        key.widen()
    }

    #[inline]
    fn eq(&self, stored: &K, probe: &K) -> bool {
        stored == probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_keys_sign_extend() {
        assert_eq!((-1i32).widen(), u64::MAX);
        assert_eq!(7i32.widen(), 7);
        assert_eq!(u32::MAX.widen(), u32::MAX as u64);
    }

    /// Invariant: zero is the vacant sentinel for primitive slots.
    #[test]
    fn primitive_slot_sentinel() {
        let mut s = <i64 as Slot>::vacant();
        assert!(s.is_vacant());
        s = <i64 as Slot>::occupied(-9, 0);
        assert_eq!(s.key(), Some(&-9));
        assert_eq!(s.take(), Some(-9));
        assert!(s.is_vacant());
        assert_eq!(s.take(), None);
    }

    /// Invariant: identity is the address alone, so zero-sized referents at
    /// one address collide while `Rc` allocations stay apart.
    #[test]
    fn zero_sized_references_share_identity() {
        let units = [(), ()];
        let (a, b) = (&units[0], &units[1]);
        assert_eq!(a.address(), b.address());
        assert!(ByIdentity.eq(&a, &b));

        let (x, y) = (Rc::new(()), Rc::new(()));
        assert_ne!(x.address(), y.address());
        assert!(!ByIdentity.eq(&x, &y));
    }

    #[test]
    fn cached_slot_keeps_hash() {
        let mut s = Cached::occupied("k", 42);
        assert_eq!(s.hash(), 42);
        assert_eq!(s.key(), Some(&"k"));
        assert_eq!(s.take(), Some("k"));
        assert!(s.is_vacant());
    }

    #[test]
    fn identity_distinguishes_equal_values() {
        let a = Rc::new(String::from("same"));
        let b = Rc::new(String::from("same"));
        let a2 = a.clone();
        assert!(ByIdentity.eq(&a, &a2));
        assert!(!ByIdentity.eq(&a, &b));
        assert_eq!(
            KeyPolicy::<Rc<String>>::hash(&ByIdentity, &a),
            KeyPolicy::<Rc<String>>::hash(&ByIdentity, &a2)
        );
    }
}
