//! Audit logging with a bounded de-duplication window.
//!
//! Repeated identical actions (same actor, action, method, path) inside
//! the configured window are collapsed into one audit record. The cache
//! is an explicit component handed to the router as a dependency, with
//! lazy expiry on probe plus a periodic sweep; it is bounded so a noisy
//! actor cannot grow it without limit.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Composite identity of one auditable action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditKey {
    pub actor_id: Uuid,
    pub action: String,
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor_id: Uuid,
    pub action: String,
    pub method: String,
    pub path: String,
}

impl AuditEntry {
    pub fn new(
        actor_id: Uuid,
        action: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            action: action.into(),
            method: method.into(),
            path: path.into(),
        }
    }

    fn key(&self) -> AuditKey {
        AuditKey {
            actor_id: self.actor_id,
            action: self.action.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
        }
    }
}

/// Time-windowed set of recently seen audit keys.
pub struct AuditDedup {
    window: Duration,
    capacity: usize,
    seen: RwLock<HashMap<AuditKey, DateTime<Utc>>>,
}

impl AuditDedup {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self { window, capacity: capacity.max(1), seen: RwLock::new(HashMap::new()) }
    }

    /// Whether `key` is fresh at `now`. A fresh key is recorded; a key
    /// seen within the window is suppressed. Expired entries for the
    /// probed key are replaced in place.
    pub async fn check_and_record(&self, key: AuditKey, now: DateTime<Utc>) -> bool {
        let mut seen = self.seen.write().await;

        if let Some(last) = seen.get(&key) {
            if now - *last < self.window {
                return false;
            }
        }

        if seen.len() >= self.capacity && !seen.contains_key(&key) {
            Self::evict(&mut seen, now, self.window, self.capacity);
        }

        seen.insert(key, now);
        true
    }

    /// Drop expired entries; the periodic task calls this so a quiet
    /// process does not hold stale keys until the next probe.
    pub async fn sweep(&self, now: DateTime<Utc>) {
        let mut seen = self.seen.write().await;
        let window = self.window;
        seen.retain(|_, last| now - *last < window);
    }

    pub async fn len(&self) -> usize {
        self.seen.read().await.len()
    }

    fn evict(
        seen: &mut HashMap<AuditKey, DateTime<Utc>>,
        now: DateTime<Utc>,
        window: Duration,
        capacity: usize,
    ) {
        seen.retain(|_, last| now - *last < window);
        // Still full of live entries: drop the oldest to make room.
        while seen.len() >= capacity {
            let oldest = seen
                .iter()
                .min_by_key(|(_, last)| **last)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    seen.remove(&key);
                }
                None => break,
            }
        }
    }
}

/// Audit sink: emits deduplicated records through `tracing`.
pub struct AuditLogger {
    dedup: AuditDedup,
}

impl AuditLogger {
    pub fn new(dedup: AuditDedup) -> Self {
        Self { dedup }
    }

    /// Record an entry unless a duplicate was seen inside the window.
    /// Returns whether the entry was emitted.
    pub async fn record(&self, entry: AuditEntry) -> bool {
        let emitted = self.dedup.check_and_record(entry.key(), Utc::now()).await;
        if emitted {
            tracing::info!(
                target: "audit",
                actor = %entry.actor_id,
                action = %entry.action,
                method = %entry.method,
                path = %entry.path,
                "audit"
            );
        }
        emitted
    }

    pub async fn sweep(&self) {
        self.dedup.sweep(Utc::now()).await;
    }
}
