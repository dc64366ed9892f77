use merry_maps::{IntFloatMap, IntIntMap, IntMap, IntSet, LongMap, LongSet, PrimitiveMap};
use std::collections::HashMap;

#[test]
fn zero_key_round_trip() {
    let mut m: IntMap<&str> = IntMap::new();
    assert_eq!(m.insert(0, "a"), None);
    assert!(m.contains_key(0));
    assert_eq!(m.get(0), Some(&"a"));
    assert_eq!(m.remove(0), Some("a"));
    assert_eq!(m.get(0), None);
    assert!(m.is_empty());
}

#[test]
fn counting_with_get_and_increment() {
    let mut counts = IntIntMap::new();
    for word_len in [3, 0, 5, 3, 3, 0, 7] {
        counts.get_and_increment(word_len, 0, 1);
    }
    assert_eq!(counts.get(3), Some(&3));
    assert_eq!(counts.get(0), Some(&2));
    assert_eq!(counts.get(5), Some(&1));
    assert_eq!(counts.get_and_increment(7, 0, 10), 1);
    assert_eq!(counts.get(7), Some(&11));
    assert_eq!(counts.get_or(42, -1), -1);
}

#[test]
fn float_values_accumulate() {
    let mut m = IntFloatMap::new();
    assert_eq!(m.get_and_increment(-2, 0.5, 0.25), 0.5);
    assert_eq!(m.get_and_increment(-2, 0.5, 0.25), 0.75);
    assert_eq!(m.get(-2), Some(&1.0));
}

/// Invariant: a long mixed workload agrees with std's HashMap, including
/// across many resizes.
#[test]
fn long_mixed_run_matches_std() {
    let mut sut: LongMap<u64> = LongMap::with_capacity(2).unwrap();
    let mut model: HashMap<i64, u64> = HashMap::new();
    let mut x: u64 = 0x2545_F491_4F6C_DD1D;
    for step in 0..50_000u64 {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let key = ((x >> 33) % 4096) as i64 - 2048;
        match x % 5 {
            0 | 1 => assert_eq!(sut.insert(key, step), model.insert(key, step)),
            2 => assert_eq!(sut.remove(key), model.remove(&key)),
            3 => assert_eq!(sut.get(key), model.get(&key)),
            _ => assert_eq!(sut.contains_key(key), model.contains_key(&key)),
        }
    }
    assert_eq!(sut.len(), model.len());
    let mut pairs: Vec<_> = sut.into_iter().collect();
    pairs.sort_unstable();
    let mut expected: Vec<_> = model.into_iter().collect();
    expected.sort_unstable();
    assert_eq!(pairs, expected);
}

#[test]
fn extreme_keys_are_ordinary() {
    let mut m = PrimitiveMap::<i64, &str>::new();
    m.insert(i64::MIN, "min");
    m.insert(i64::MAX, "max");
    m.insert(-1, "minus one");
    m.insert(0, "zero");
    assert_eq!(m.len(), 4);
    assert_eq!(m.get(i64::MIN), Some(&"min"));
    assert_eq!(m.get(i64::MAX), Some(&"max"));
    assert_eq!(m.keys().next(), Some(0));
    let mut unsigned = PrimitiveMap::<u32, u32>::new();
    unsigned.insert(u32::MAX, 1);
    unsigned.insert(0, 2);
    assert_eq!(unsigned.iter().map(|(_, v)| *v).sum::<u32>(), 3);
}

#[test]
fn clear_to_drops_zero_and_shrinks() {
    let mut m: IntMap<i32> = (-500..500).map(|k| (k, k)).collect();
    assert!(m.has_zero());
    m.clear_to(16);
    assert!(!m.has_zero());
    assert!(m.is_empty());
    assert!(m.capacity() <= 16);
    m.insert(0, 1);
    assert_eq!(m.len(), 1);
}

#[test]
fn sets_follow_the_same_rules() {
    let mut s: LongSet = [0i64, 1, 2, 3].into_iter().collect();
    assert_eq!(s.len(), 4);
    assert!(s.contains(0));
    s.retain(|k| k != 0);
    assert!(!s.contains(0));
    assert_eq!(s.len(), 3);
    let mut ints = IntSet::with_capacity_and_load_factor(4, 0.5).unwrap();
    for k in -100..100 {
        ints.insert(k);
    }
    assert_eq!(ints.len(), 200);
    assert_eq!(ints.iter().next(), Some(0));
    assert!(ints.len() < ints.capacity());
}
