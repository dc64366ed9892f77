#![cfg(feature = "serde")]

use merry_maps::{IdentityMap, IntMap, IntSet, ObjectMap, ObjectSet, OrderedMap, OrderedSet};
use serde::{Deserialize, Serialize};

#[test]
fn object_map_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let m: ObjectMap<String, Vec<u8>> = [("a".to_string(), vec![1, 2]), ("b".to_string(), vec![])]
        .into_iter()
        .collect();
    let json = serde_json::to_string(&m)?;
    let back: ObjectMap<String, Vec<u8>> = serde_json::from_str(&json)?;
    assert_eq!(back, m);
    Ok(())
}

#[test]
fn ordered_map_keeps_order_on_the_wire() -> Result<(), Box<dyn std::error::Error>> {
    let mut m = OrderedMap::new();
    m.insert("zeta".to_string(), 1);
    m.insert("alpha".to_string(), 2);
    m.insert("mid".to_string(), 3);
    let json = serde_json::to_string(&m)?;
    assert_eq!(json, r#"{"zeta":1,"alpha":2,"mid":3}"#);
    let back: OrderedMap<String, i32> = serde_json::from_str(&json)?;
    assert_eq!(back.ordered_keys(), m.ordered_keys());
    assert_eq!(back, m);
    Ok(())
}

#[test]
fn duplicate_keys_keep_the_last_value() -> Result<(), Box<dyn std::error::Error>> {
    let m: OrderedMap<String, i32> = serde_json::from_str(r#"{"a":1,"b":2,"a":3}"#)?;
    assert_eq!(m.ordered_keys(), &["a", "b"]);
    assert_eq!(m.get("a"), Some(&3));
    Ok(())
}

#[test]
fn primitive_collections_include_zero() -> Result<(), Box<dyn std::error::Error>> {
    let mut m: IntMap<String> = IntMap::new();
    m.insert(0, "zero".into());
    m.insert(-7, "minus seven".into());
    let json = serde_json::to_string(&m)?;
    assert!(json.starts_with(r#"{"0":"zero""#), "{json}");
    let back: IntMap<String> = serde_json::from_str(&json)?;
    assert_eq!(back, m);

    let s: IntSet = serde_json::from_str("[0, 3, 3, -1]")?;
    assert_eq!(s.len(), 3);
    assert!(s.contains(0));
    assert_eq!(serde_json::to_string(&s)?.chars().nth(1), Some('0'));
    Ok(())
}

#[test]
fn sets_serialize_as_sequences() -> Result<(), Box<dyn std::error::Error>> {
    let s: OrderedSet<u8> = [5, 1, 3].into_iter().collect();
    assert_eq!(serde_json::to_string(&s)?, "[5,1,3]");
    let o: ObjectSet<u8> = serde_json::from_str("[4, 4, 9]")?;
    assert_eq!(o.len(), 2);
    Ok(())
}

#[test]
fn identity_map_writes_keys_by_value() -> Result<(), Box<dyn std::error::Error>> {
    let name = String::from("k");
    let mut m = IdentityMap::new();
    m.insert(&name, 1);
    assert_eq!(serde_json::to_string(&m)?, r#"{"k":1}"#);
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct Scores {
    #[serde(with = "merry_maps::serde_impls::as_pairs")]
    by_id: IntMap<String>,
}

#[test]
fn flat_pairs_encoding() -> Result<(), Box<dyn std::error::Error>> {
    let mut by_id = IntMap::new();
    by_id.insert(0, "root".to_string());
    let json = serde_json::to_string(&Scores { by_id })?;
    assert_eq!(json, r#"{"by_id":[0,"root"]}"#);

    let back: Scores = serde_json::from_str(r#"{"by_id":[4,"four",0,"zero",4,"again"]}"#)?;
    assert_eq!(back.by_id.len(), 2);
    assert_eq!(back.by_id.get(4).map(String::as_str), Some("again"));

    let odd = serde_json::from_str::<Scores>(r#"{"by_id":[1,"one",2]}"#);
    assert!(odd.is_err());
    Ok(())
}
