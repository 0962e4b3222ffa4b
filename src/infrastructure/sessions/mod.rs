//! In-Process Session Store
//!
//! Ephemeral token-to-identity bindings. Sessions live only for the
//! process lifetime and are shared across request tasks through a
//! concurrent map; no cross-process sharing is assumed.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Identity, Session};

/// One live session record.
#[derive(Debug, Clone)]
struct SessionEntry {
    user: String,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

/// Concurrent store of opaque tokens bound to authenticated identities.
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    idle_timeout: Duration,
}

impl SessionStore {
    /// Create a store whose sessions expire after `idle_timeout` without
    /// activity.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle_timeout,
        }
    }

    /// Issue a fresh opaque token bound to `user`.
    pub fn issue(&self, user: &str) -> Session {
        let now = Utc::now();
        let token = Uuid::new_v4().to_string();

        self.entries.insert(
            token.clone(),
            SessionEntry {
                user: user.to_string(),
                created_at: now,
                last_seen: now,
            },
        );

        Session {
            token,
            user: user.to_string(),
            created_at: now,
        }
    }

    /// Resolve a token to its identity, refreshing the idle timer.
    ///
    /// Expired entries are dropped on access and resolve to `None`.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let now = Utc::now();

        let expired = match self.entries.get_mut(token) {
            Some(mut entry) => {
                if now - entry.last_seen > self.idle_timeout {
                    true
                } else {
                    entry.last_seen = now;
                    return Some(Identity::new(entry.user.clone()));
                }
            }
            None => return None,
        };

        if expired {
            self.entries.remove(token);
        }
        None
    }

    /// Invalidate a token. Idempotent: revoking an absent or already
    /// revoked token succeeds silently.
    pub fn revoke(&self, token: &str) {
        self.entries.remove(token);
    }

    /// Invalidate every session bound to `user`. Used when the account
    /// itself is deleted.
    pub fn revoke_user(&self, user: &str) {
        self.entries.retain(|_, entry| entry.user != user);
    }

    /// Drop every idle-expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now - entry.last_seen <= self.idle_timeout);
        before - self.entries.len()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
