//! crates/medilog_core/src/session.rs
//!
//! Persists signed-in identities in a pluggable key-value store.

use crate::domain::User;
use crate::ports::{KeyValueStore, PortError, PortResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

const KEY_PREFIX: &str = "medilog-user";

#[derive(Serialize, Deserialize)]
struct StoredSession {
    user: User,
    expires_at: DateTime<Utc>,
}

/// Maps opaque session tokens to the serialized `User` they belong to.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(token: &str) -> String {
        format!("{}:{}", KEY_PREFIX, token)
    }

    /// Caches `user` under a fresh token and returns the token.
    pub async fn open(&self, user: &User) -> PortResult<String> {
        let token = Uuid::new_v4().to_string();
        let stored = StoredSession {
            user: user.clone(),
            expires_at: Utc::now() + self.ttl,
        };
        let value = serde_json::to_string(&stored)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(&Self::key(&token), &value).await?;
        Ok(token)
    }

    /// Returns the user for `token`, dropping entries that are expired or unreadable.
    pub async fn current(&self, token: &str) -> PortResult<Option<User>> {
        let key = Self::key(token);
        let Some(value) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredSession>(&value) {
            Ok(stored) if stored.expires_at > Utc::now() => Ok(Some(stored.user)),
            Ok(_) => {
                self.store.remove(&key).await?;
                Ok(None)
            }
            Err(e) => {
                warn!("Discarding unreadable session entry: {}", e);
                self.store.remove(&key).await?;
                Ok(None)
            }
        }
    }

    pub async fn close(&self, token: &str) -> PortResult<()> {
        self.store.remove(&Self::key(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::memory::InMemoryKeyValueStore;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Caregiver,
        }
    }

    #[tokio::test]
    async fn open_then_current_returns_the_same_user() {
        let sessions = SessionStore::new(Arc::new(InMemoryKeyValueStore::new()), Duration::days(30));
        let user = user();

        let token = sessions.open(&user).await.unwrap();

        assert_eq!(sessions.current(&token).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn close_forgets_the_session() {
        let sessions = SessionStore::new(Arc::new(InMemoryKeyValueStore::new()), Duration::days(30));
        let token = sessions.open(&user()).await.unwrap();

        sessions.close(&token).await.unwrap();

        assert_eq!(sessions.current(&token).await.unwrap(), None);
        // closing twice is harmless
        sessions.close(&token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_are_removed() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let sessions = SessionStore::new(kv.clone(), Duration::seconds(-1));
        let token = sessions.open(&user()).await.unwrap();

        assert_eq!(sessions.current(&token).await.unwrap(), None);
        assert_eq!(kv.get(&SessionStore::key(&token)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_entries_are_treated_as_absent() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.set("medilog-user:abc", "{not json").await.unwrap();
        let sessions = SessionStore::new(kv.clone(), Duration::days(1));

        assert_eq!(sessions.current("abc").await.unwrap(), None);
        assert_eq!(kv.get("medilog-user:abc").await.unwrap(), None);
    }
}
