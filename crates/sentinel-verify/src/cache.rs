//! Fingerprinted response cache.
//!
//! Verification responses are cached by a SHA-256 fingerprint of the
//! (sorted namespace set, exact text) pair, so a page re-scanned after
//! a no-op mutation never costs a second round trip. Entries are
//! immutable once inserted; the cache is bounded by both a TTL and a
//! capacity with FIFO eviction.

use sentinel_core::RuleMatch;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of cached responses.
pub const DEFAULT_CAPACITY: usize = 256;

struct CacheEntry {
    matches: Vec<RuleMatch>,
    inserted_at: Instant,
}

/// Bounded TTL cache for verification responses.
///
/// Safe for concurrent lookups and inserts; a plain mutexed map is
/// sufficient because entries never change after insertion.
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    capacity: usize,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    insertion_order: VecDeque<String>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl ResponseCache {
    /// Create a cache with the given TTL and capacity bound.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            ttl,
            capacity,
        }
    }

    /// Compute the cache key for a (namespace set, text) pair.
    ///
    /// Namespaces are sorted before hashing so set ordering does not
    /// fragment the cache.
    #[must_use]
    pub fn fingerprint(namespaces: &[String], text: &str) -> String {
        let mut sorted: Vec<&str> = namespaces.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        for ns in &sorted {
            hasher.update(ns.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(text.as_bytes());

        let digest = hasher.finalize();
        digest.iter().fold(String::with_capacity(64), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }

    /// Look up a cached response, ignoring entries past their TTL.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<RuleMatch>> {
        let inner = self.inner.lock().ok()?;
        let entry = inner.entries.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.matches.clone())
    }

    /// Insert a response, evicting the oldest entry if at capacity.
    pub fn insert(&self, key: String, matches: Vec<RuleMatch>) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        if inner.entries.contains_key(&key) {
            return;
        }

        while inner.entries.len() >= self.capacity {
            match inner.insertion_order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.insertion_order.push_back(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                matches,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held (including expired ones not yet
    /// evicted by capacity pressure).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.entries.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{PiiCategory, Severity};

    fn sample_match() -> RuleMatch {
        RuleMatch {
            category: PiiCategory::Email,
            severity: Severity::Medium,
            rule_id: "email".to_string(),
            span_len: 16,
            verified: true,
        }
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let a = ResponseCache::fingerprint(
            &["us".to_string(), "comm".to_string()],
            "jane@example.com",
        );
        let b = ResponseCache::fingerprint(
            &["comm".to_string(), "us".to_string()],
            "jane@example.com",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_text_sensitive() {
        let ns = vec!["comm".to_string()];
        assert_ne!(
            ResponseCache::fingerprint(&ns, "a"),
            ResponseCache::fingerprint(&ns, "b")
        );
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ResponseCache::default();
        cache.insert("k1".to_string(), vec![sample_match()]);
        let hit = cache.get("k1").expect("cached entry");
        assert_eq!(hit.len(), 1);
        assert!(cache.get("k2").is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = ResponseCache::new(Duration::from_millis(0), 16);
        cache.insert("k1".to_string(), vec![sample_match()]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ResponseCache::new(DEFAULT_TTL, 2);
        cache.insert("k1".to_string(), vec![]);
        cache.insert("k2".to_string(), vec![]);
        cache.insert("k3".to_string(), vec![]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("k1").is_none(), "oldest entry should be evicted");
        assert!(cache.get("k3").is_some());
    }
}
