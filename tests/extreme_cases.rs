use merry_maps::{IdentityMap, ObjectMap, ObjectSet, TableConfig};
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

#[derive(Clone, Default)]
struct ZeroState;
struct ZeroHasher;
impl BuildHasher for ZeroState {
    type Hasher = ZeroHasher;
    fn build_hasher(&self) -> ZeroHasher {
        ZeroHasher
    }
}
impl Hasher for ZeroHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

/// Invariant: two thousand keys on a single probe chain survive growth,
/// removal and cursor removal.
#[test]
fn two_thousand_colliding_keys() {
    let mut m = ObjectMap::with_hasher(ZeroState);
    for k in -1000i32..1000 {
        assert_eq!(m.insert(k, -k), None);
    }
    assert_eq!(m.len(), 2000);
    for k in -1000i32..1000 {
        assert_eq!(m.get(&k), Some(&-k));
    }
    for k in (-1000i32..1000).filter(|k| k % 4 == 0) {
        assert_eq!(m.remove(&k), Some(-k));
    }
    let mut c = m.cursor();
    while let Some((&k, _)) = c.next() {
        if k % 4 != 0 && k % 2 == 0 {
            c.remove().unwrap();
        }
    }
    assert_eq!(m.len(), 1000);
    for k in -1000i32..1000 {
        assert_eq!(m.contains_key(&k), k % 2 != 0, "{k}");
    }
}

#[test]
fn minimum_capacity_tables_still_grow() {
    let mut s = ObjectSet::with_config_and_hasher(TableConfig::new(2, 0.25), ZeroState).unwrap();
    assert_eq!(s.capacity(), 2);
    for k in 0..64u8 {
        assert!(s.insert(k));
        assert!(s.len() < s.capacity());
    }
    for k in 0..64u8 {
        assert!(s.take(&k).is_some());
    }
    assert!(s.is_empty());
}

#[test]
fn high_load_factor_leaves_one_slot_free() {
    let mut m = ObjectMap::with_capacity_and_load_factor(16, 0.99).unwrap();
    for k in 0..15u64 {
        m.insert(k, ());
    }
    assert!(m.len() < m.capacity());
    for k in 0..15u64 {
        assert!(m.contains_key(&k));
    }
    assert!(!m.contains_key(&99));
}

/// Invariant: equal but distinct allocations are different identity keys.
#[test]
fn identity_keys_ignore_equality() {
    let a = Rc::new(String::from("same"));
    let b = Rc::new(String::from("same"));
    let mut m = IdentityMap::new();
    m.insert(Rc::clone(&a), 1);
    m.insert(Rc::clone(&b), 2);
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&a), Some(&1));
    assert_eq!(m.remove(&b), Some(2));
    assert_eq!(m.get(&Rc::new(String::from("same"))), None);
}
