#![cfg(test)]

// Property tests for ObjectMap kept inside the crate so they can check the
// engine's internal bookkeeping alongside the public surface.

use crate::object_map::ObjectMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so failures shrink toward earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    CursorRemove(usize),
    RetainAbove(i32),
    Shrink(usize),
    EnsureCapacity(usize),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,4}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            2 => idx.clone().prop_map(OpI::CursorRemove),
            1 => any::<i32>().prop_map(OpI::RetainAbove),
            1 => (0usize..64).prop_map(OpI::Shrink),
            1 => (0usize..64).prop_map(OpI::EnsureCapacity),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs one scenario against a std HashMap model. Invariants checked:
// - `insert` returns the replaced value exactly when the model had one.
// - `get`/`contains_key` parity, including borrowed `&str` lookups.
// - Cursor removal deletes exactly the targeted entry and visits each
//   entry once.
// - `len` parity and `len < capacity` after every operation.
// - Iteration yields the model's key/value pairs exactly once.
fn run<S: BuildHasher>(
    mut sut: ObjectMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.wrapping_add(d);
                }
                if let Some(v) = model.get_mut(&k) {
                    *v = v.wrapping_add(d);
                }
            }
            OpI::CursorRemove(i) => {
                let target = key_from(pool, i);
                let mut visits = 0;
                let mut removed = None;
                let mut c = sut.cursor();
                while let Some((k, _)) = c.next() {
                    visits += 1;
                    if *k == target {
                        removed = Some(c.remove().expect("cursor has a current entry"));
                    }
                }
                prop_assert_eq!(visits, model.len());
                prop_assert_eq!(removed, model.remove_entry(&target));
            }
            OpI::RetainAbove(t) => {
                sut.retain(|_, v| *v > t);
                model.retain(|_, v| *v > t);
            }
            OpI::Shrink(n) => {
                let before = sut.capacity();
                sut.shrink(n);
                prop_assert!(sut.capacity() <= before);
            }
            OpI::EnsureCapacity(n) => {
                let before = sut.capacity();
                sut.ensure_capacity(n);
                prop_assert!(sut.capacity() >= before);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
            OpI::Iterate => {
                let s: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(sut.iter().count(), s.len());
                prop_assert_eq!(s, m);
            }
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.len() < sut.capacity());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(ObjectMap::with_capacity(2).unwrap(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above with every key on one
// probe chain, so removal always exercises the backward shift.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let config = crate::config::TableConfig::new(4, 0.75);
        let sut = ObjectMap::with_config_and_hasher(config, ConstBuildHasher).unwrap();
        run(sut, &pool, ops)?;
    }
}
