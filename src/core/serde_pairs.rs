//! Serialize maps with structured keys as a list of `(key, value)` pairs
//!
//! JSON object keys must be strings, so maps keyed by coordinates or empire
//! pairs go through this module: `#[serde(with = "crate::core::serde_pairs")]`.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.iter())
}

pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
    D: Deserializer<'de>,
{
    let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
    Ok(pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize, PartialOrd, Ord, Eq, Clone, Copy)]
    struct Key {
        a: i32,
        b: i32,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super")]
        map: BTreeMap<Key, String>,
    }

    #[test]
    fn test_struct_keys_survive_json() {
        let mut map = BTreeMap::new();
        map.insert(Key { a: 1, b: -2 }, "x".to_string());
        map.insert(Key { a: 0, b: 5 }, "y".to_string());
        let holder = Holder { map };

        let json = serde_json::to_string(&holder).unwrap();
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }
}
