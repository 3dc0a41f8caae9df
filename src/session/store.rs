//! In-memory session store.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::observability::metrics;

/// An open annotator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: String,
    /// Seconds since epoch.
    pub created_at: u64,
    /// Seconds since epoch.
    pub expires_at: u64,
}

impl Session {
    pub fn is_active_at(&self, now: u64) -> bool {
        self.expires_at > now
    }
}

/// Outcome of a session lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Active(Session),
    Expired,
    Unknown,
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Thread-safe session storage shared by every request.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Open a new session for `user`.
    pub fn create(&self, user: &str) -> Session {
        self.create_at(user, now_secs())
    }

    pub fn create_at(&self, user: &str, now: u64) -> Session {
        self.purge_expired(now);
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user: user.to_string(),
            created_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
        };
        self.inner.insert(session.id.clone(), session.clone());
        metrics::record_active_sessions(self.inner.len());
        tracing::info!(user = %session.user, "Session opened");
        session
    }

    pub fn lookup(&self, id: &str) -> SessionLookup {
        self.lookup_at(id, now_secs())
    }

    /// Look up a session, evicting it if it has expired.
    pub fn lookup_at(&self, id: &str, now: u64) -> SessionLookup {
        let session = match self.inner.get(id) {
            Some(entry) => entry.value().clone(),
            None => return SessionLookup::Unknown,
        };

        if session.is_active_at(now) {
            SessionLookup::Active(session)
        } else {
            self.inner.remove(id);
            metrics::record_active_sessions(self.inner.len());
            SessionLookup::Expired
        }
    }

    /// Drop every session that has expired by `now`. Returns how many were removed.
    pub fn purge_expired(&self, now: u64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, session| session.is_active_at(now));
        let removed = before.saturating_sub(self.inner.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired sessions");
            metrics::record_active_sessions(self.inner.len());
        }
        removed
    }

    /// Close a session. Returns false if it was already gone.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.inner.remove(id).is_some();
        metrics::record_active_sessions(self.inner.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
