//! Translation cache keyed by question fingerprint.
//!
//! A repeated question against the same table costs exactly one language
//! model call per schema version. Entries never expire; the cache lives and
//! dies with the session and is cleared only on explicit reset.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Stable SHA-256 fingerprint of (question, table, schema version).
///
/// Each part is length-prefixed so distinct input pairs can never collapse
/// to the same byte stream. Folding the schema version in means every
/// registry refresh naturally invalidates older entries.
pub fn fingerprint(question: &str, table: &str, schema_version: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update((question.len() as u64).to_le_bytes());
    hasher.update(question.as_bytes());
    hasher.update((table.len() as u64).to_le_bytes());
    hasher.update(table.as_bytes());
    hasher.update(schema_version.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, String>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert or overwrite.
    pub fn store(&mut self, key: String, sql: String) {
        self.entries.insert(key, sql);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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
    fn test_fingerprint_deterministic() {
        let a = fingerprint("total sales by region", "sales", 1);
        let b = fingerprint("total sales by region", "sales", 1);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_sensitive_to_each_part() {
        let base = fingerprint("q", "t", 1);
        assert_ne!(base, fingerprint("q2", "t", 1));
        assert_ne!(base, fingerprint("q", "t2", 1));
        assert_ne!(base, fingerprint("q", "t", 2));
    }

    #[test]
    fn test_fingerprint_no_boundary_collision() {
        // "ab" + "c" vs "a" + "bc" must hash differently
        assert_ne!(fingerprint("ab", "c", 0), fingerprint("a", "bc", 0));
    }

    #[test]
    fn test_round_trip() {
        let mut cache = QueryCache::new();
        let key = fingerprint("show totals", "sales", 1);

        assert!(cache.lookup(&key).is_none());
        cache.store(key.clone(), "SELECT SUM(amount) FROM sales".to_string());
        assert_eq!(cache.lookup(&key), Some("SELECT SUM(amount) FROM sales"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let mut cache = QueryCache::new();
        cache.store("k".into(), "old".into());
        cache.store("k".into(), "new".into());
        assert_eq!(cache.lookup("k"), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cache = QueryCache::new();
        cache.store("a".into(), "1".into());
        cache.store("b".into(), "2".into());

        cache.remove("a");
        assert!(cache.lookup("a").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unknown_key_is_a_miss() {
        let cache = QueryCache::new();
        assert!(cache.lookup("no-such-key").is_none());
    }
}
