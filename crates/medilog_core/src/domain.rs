//! crates/medilog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives so they can be cached in the session
//! store and returned over HTTP, but are independent of any database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The access mode of a user. Fixed at profile creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Caregiver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Caregiver => "caregiver",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(Role::Patient),
            "caregiver" => Some(Role::Caregiver),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cached identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The authoritative profile document, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn into_user(self, id: Uuid) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
        }
    }
}

// Only used internally for login/register - contains sensitive data
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// The identity returned by an external sign-in provider.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// A titled text snippet representing a saved piece of medical information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

/// Input for a flashcard before fallbacks are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFlashcard {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
}

/// A scheduled medication entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub time: String,
    pub days: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReminder {
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub time: String,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat turn. Held in memory for the length of a conversation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
