//! crates/medilog_core/src/memory.rs
//!
//! In-memory implementations of the storage ports. Used by tests and by
//! local runs started with `DATABASE_URL=memory`.

use crate::domain::{Credential, Flashcard, Reminder, UserProfile};
use crate::ports::{DatabaseService, KeyValueStore, PortError, PortResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    credentials_by_email: Arc<RwLock<HashMap<String, Credential>>>,
    profiles: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
    flashcards: Arc<RwLock<HashMap<Uuid, Vec<Flashcard>>>>,
    reminders: Arc<RwLock<HashMap<Uuid, Vec<Reminder>>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_credential(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Credential> {
        let mut credentials = self.credentials_by_email.write().await;
        if credentials.contains_key(email) {
            return Err(PortError::Conflict(format!("Email {} already registered", email)));
        }
        let credential = Credential {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        credentials.insert(email.to_string(), credential.clone());
        Ok(credential)
    }

    async fn get_credential_by_email(&self, email: &str) -> PortResult<Credential> {
        self.credentials_by_email
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Credential for {} not found", email)))
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> PortResult<()> {
        self.profiles.write().await.insert(user_id, profile.clone());
        Ok(())
    }

    async fn list_flashcards(&self, owner: Uuid) -> PortResult<Vec<Flashcard>> {
        let mut cards = self
            .flashcards
            .read()
            .await
            .get(&owner)
            .cloned()
            .unwrap_or_default();
        cards.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(cards)
    }

    async fn save_flashcard(&self, owner: Uuid, flashcard: &Flashcard) -> PortResult<()> {
        self.flashcards
            .write()
            .await
            .entry(owner)
            .or_default()
            .push(flashcard.clone());
        Ok(())
    }

    async fn list_reminders(&self, owner: Uuid) -> PortResult<Vec<Reminder>> {
        Ok(self
            .reminders
            .read()
            .await
            .get(&owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_reminder(&self, owner: Uuid, reminder: &Reminder) -> PortResult<()> {
        self.reminders
            .write()
            .await
            .entry(owner)
            .or_default()
            .push(reminder.clone());
        Ok(())
    }

    async fn delete_reminder(&self, owner: Uuid, reminder_id: Uuid) -> PortResult<()> {
        let mut reminders = self.reminders.write().await;
        let list = reminders.entry(owner).or_default();
        let before = list.len();
        list.retain(|r| r.id != reminder_id);
        if list.len() == before {
            return Err(PortError::NotFound(format!("Reminder {} not found", reminder_id)));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
