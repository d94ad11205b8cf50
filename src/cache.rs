use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// In-process TTL cache for memoizing JSON list responses.
///
/// Consulted by handlers only after the authorization guard has passed, so
/// an unauthenticated caller can never observe a cached authenticated
/// response. Mutating handlers call [`ResponseCache::invalidate`].
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, serde_json::Value)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().ok()?;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(value.clone())
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), (Instant::now(), value));
        }
    }

    /// Drop every cached entry. Called after any question-bank mutation.
    pub fn invalidate(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
