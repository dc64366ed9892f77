use merry_maps::{
    IdentityMap, IntIntMap, IntSet, LongMap, ObjectMap, ObjectSet, OrderedMap, OrderedSet,
};
use std::sync::{Arc, OnceLock};

fn assert_sync<T: Sync>() {}
fn assert_send<T: Send>() {}

#[test]
fn collections_are_send_and_sync() {
    assert_sync::<ObjectMap<u32, u32>>();
    assert_sync::<ObjectSet<String>>();
    assert_sync::<IdentityMap<Arc<str>, u8>>();
    assert_sync::<IntIntMap>();
    assert_sync::<LongMap<String>>();
    assert_sync::<IntSet>();
    assert_sync::<OrderedMap<String, u64>>();
    assert_sync::<OrderedSet<u16>>();
    assert_send::<ObjectMap<u32, u32>>();
    assert_send::<IntIntMap>();
}

/// Invariant: lookups from several threads at once see every entry and do
/// not trip the debug reentrancy guard.
#[test]
fn concurrent_readers_share_one_map() {
    let map: ObjectMap<String, usize> = (0..5_000).map(|i| (format!("k{i}"), i)).collect();
    let map = Arc::new(map);
    std::thread::scope(|s| {
        for t in 0..4 {
            let map = Arc::clone(&map);
            s.spawn(move || {
                for i in (t..5_000).step_by(4) {
                    assert_eq!(map.get(format!("k{i}").as_str()), Some(&i));
                }
                assert!(!map.contains_key("missing"));
            });
        }
    });
}

static SQUARES: OnceLock<IntIntMap> = OnceLock::new();

#[test]
fn map_can_live_in_a_static() {
    let squares = SQUARES.get_or_init(|| (-100..100).map(|k| (k, k * k)).collect());
    std::thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                for k in -100..100 {
                    assert_eq!(squares.get(k), Some(&(k * k)));
                }
            });
        }
    });
}
