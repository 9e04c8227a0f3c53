//! crates/medilog_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the document database, the sign-in provider, the
//! speech recognizer and the assistant backend.

use crate::domain::{
    ChatMessage, Credential, ExternalIdentity, Flashcard, Reminder, UserProfile,
};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Transcript fragments delivered by a speech recognizer, in arrival order.
pub type TranscriptStream = Pin<Box<dyn Stream<Item = PortResult<String>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Credentials ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_credential(&self, email: &str, hashed_password: &str)
        -> PortResult<Credential>;

    async fn get_credential_by_email(&self, email: &str) -> PortResult<Credential>;

    // --- Profiles (users/{id}) ---
    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<UserProfile>>;

    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> PortResult<()>;

    // --- Flashcards (users/{id}/flashcards/{id}) ---
    async fn list_flashcards(&self, owner: Uuid) -> PortResult<Vec<Flashcard>>;

    async fn save_flashcard(&self, owner: Uuid, flashcard: &Flashcard) -> PortResult<()>;

    // --- Reminders (users/{id}/reminders/{id}) ---
    async fn list_reminders(&self, owner: Uuid) -> PortResult<Vec<Reminder>>;

    async fn save_reminder(&self, owner: Uuid, reminder: &Reminder) -> PortResult<()>;

    /// Fails with `PortError::NotFound` when `owner` has no reminder `reminder_id`.
    async fn delete_reminder(&self, owner: Uuid, reminder_id: Uuid) -> PortResult<()>;
}

/// A persistent string key-value store, standing in for browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> PortResult<String>;
    /// Returns `Ok(false)` for a well-formed hash that does not match.
    async fn verify(&self, password: &str, hashed_password: &str) -> PortResult<bool>;
}

#[async_trait]
pub trait ExternalIdentityProvider: Send + Sync {
    /// Exchanges a provider-issued token for the identity it asserts.
    async fn verify(&self, token: &str) -> PortResult<ExternalIdentity>;
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Starts recognition. The stream ends when recognition ends or is dropped.
    async fn start(&self) -> PortResult<TranscriptStream>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> PortResult<String>;
}

#[async_trait]
pub trait ChatResponder: Send + Sync {
    /// Produces the assistant's reply to the latest message in `history`.
    async fn respond(&self, history: &[ChatMessage]) -> PortResult<String>;
}
