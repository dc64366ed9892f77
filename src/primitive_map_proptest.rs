#![cfg(test)]

// Property tests for PrimitiveMap with keys drawn from a narrow range so
// `0`, negatives and repeated keys show up often.

use crate::primitive_map::IntIntMap;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, i32),
    Remove(i32),
    Get(i32),
    Increment(i32, i32),
    CursorRemoveOdd,
    Clear,
}

fn arb_key() -> impl Strategy<Value = i32> {
    prop_oneof![
        2 => Just(0),
        6 => -40i32..40,
        1 => any::<i32>(),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        6 => (arb_key(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => arb_key().prop_map(Op::Remove),
        2 => arb_key().prop_map(Op::Get),
        3 => (arb_key(), -5i32..5).prop_map(|(k, d)| Op::Increment(k, d)),
        1 => Just(Op::CursorRemoveOdd),
        1 => Just(Op::Clear),
    ];
    proptest::collection::vec(op, 1..150)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    // Property: PrimitiveMap agrees with a HashMap model on every result,
    // the zero key counts toward `len` and iterates first, and cursor
    // removal deletes exactly the entries it targets.
    #[test]
    fn prop_matches_model(ops in arb_ops()) {
        let mut sut = IntIntMap::with_capacity(2).unwrap();
        let mut model: HashMap<i32, i32> = HashMap::new();
        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(k), model.remove(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(k), model.get(&k));
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
                }
                Op::Increment(k, d) => {
                    let expected = model.get(&k).copied().unwrap_or(10);
                    model.insert(k, expected.wrapping_add(d));
                    prop_assert_eq!(sut.get_and_increment(k, 10, d), expected);
                }
                Op::CursorRemoveOdd => {
                    let mut c = sut.cursor();
                    while let Some((k, _)) = c.next() {
                        if k % 2 != 0 {
                            c.remove().unwrap();
                        }
                    }
                    model.retain(|k, _| k % 2 == 0);
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.has_zero(), model.contains_key(&0));
            if sut.has_zero() {
                prop_assert_eq!(sut.iter().next().map(|(k, _)| k), Some(0));
            }
        }
        let s: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k, *v)).collect();
        let m: BTreeMap<_, _> = model.into_iter().collect();
        prop_assert_eq!(s, m);
    }
}
