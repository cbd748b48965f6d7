//! The typed key/value dictionary a version 2.x tree stores its KDF
//! parameters in. Values keep their wire width: fixed-width integers or raw
//! byte strings, matching the KeePass variant dictionary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantValue {
    U32(u32),
    U64(u64),
    Bytes(Vec<u8>),
}

/// Typed getters return `None` on an absent key or a width mismatch; the
/// caller decides whether that means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDict {
    entries: BTreeMap<String, VariantValue>,
}

impl VariantDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_u32(&self, key: &str) -> Option<u32> {
        match self.entries.get(key) {
            Some(VariantValue::U32(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.entries.get(key) {
            Some(VariantValue::U64(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.entries.get(key) {
            Some(VariantValue::Bytes(v)) => Some(v),
            _ => None,
        }
    }

    pub fn set_u32(&mut self, key: &str, value: u32) {
        self.entries.insert(key.to_string(), VariantValue::U32(value));
    }

    pub fn set_u64(&mut self, key: &str, value: u64) {
        self.entries.insert(key.to_string(), VariantValue::U64(value));
    }

    pub fn set_bytes(&mut self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), VariantValue::Bytes(value));
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_typed_values() {
        let mut dict = VariantDict::new();
        dict.set_u32("P", 2);
        dict.set_u64("I", 3);
        dict.set_bytes("$UUID", vec![0xAA; 16]);

        assert_eq!(dict.get_u32("P"), Some(2));
        assert_eq!(dict.get_u64("I"), Some(3));
        assert_eq!(dict.get_bytes("$UUID"), Some(&[0xAA; 16][..]));
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn width_mismatch_reads_as_absent() {
        let mut dict = VariantDict::new();
        dict.set_u64("R", 60_000);

        assert_eq!(dict.get_u32("R"), None);
        assert_eq!(dict.get_u64("R"), Some(60_000));
    }

    #[test]
    fn absent_key_reads_as_none() {
        let dict = VariantDict::new();
        assert_eq!(dict.get_u64("R"), None);
        assert!(!dict.contains("R"));
    }

    #[test]
    fn remove_deletes_entry() {
        let mut dict = VariantDict::new();
        dict.set_u64("R", 1);
        dict.remove("R");
        assert!(dict.is_empty());
    }
}
