use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::pipeline::GameAnalytics;

/// Injected cache collaborator: a `(key) -> (value, expiry)` contract the
/// orchestration layer supplies. The engine itself stays a pure function;
/// whether and how long results live is the caller's policy.
pub trait AnalyticsCache: Send + Sync {
    fn get(&self, key: &str) -> Option<GameAnalytics>;
    fn put(&self, key: &str, value: GameAnalytics, ttl: Duration);
}

/// In-memory TTL cache. Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (GameAnalytics, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalyticsCache for MemoryCache {
    fn get(&self, key: &str) -> Option<GameAnalytics> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((_, expiry)) if *expiry <= Instant::now() => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }

    fn put(&self, key: &str, value: GameAnalytics, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
    }
}
