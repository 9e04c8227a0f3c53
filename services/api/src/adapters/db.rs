//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` and `KeyValueStore` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medilog_core::domain::{Credential, Flashcard, Reminder, Role, UserProfile};
use medilog_core::ports::{DatabaseService, KeyValueStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CredentialRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialRecord {
    fn to_domain(self) -> Credential {
        Credential {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}
impl ProfileRecord {
    fn to_domain(self) -> PortResult<UserProfile> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| PortError::Unexpected(format!("Unknown role '{}'", self.role)))?;
        Ok(UserProfile {
            name: self.name,
            email: self.email,
            role,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct FlashcardRecord {
    id: Uuid,
    title: String,
    content: String,
    category: String,
    date: DateTime<Utc>,
}
impl FlashcardRecord {
    fn to_domain(self) -> Flashcard {
        Flashcard {
            id: self.id,
            title: self.title,
            content: self.content,
            category: self.category,
            date: self.date,
        }
    }
}

#[derive(FromRow)]
struct ReminderRecord {
    id: Uuid,
    medicine: String,
    dosage: String,
    frequency: String,
    time: String,
    days: Vec<String>,
    notes: Option<String>,
}
impl ReminderRecord {
    fn to_domain(self) -> Reminder {
        Reminder {
            id: self.id,
            medicine: self.medicine,
            dosage: self.dosage,
            frequency: self.frequency,
            time: self.time,
            days: self.days,
            notes: self.notes,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_credential(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Credential> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "INSERT INTO credentials (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Email {} already registered", email))
            }
            other => unexpected(other),
        })?;
        Ok(record.to_domain())
    }

    async fn get_credential_by_email(&self, email: &str) -> PortResult<Credential> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT user_id, email, hashed_password FROM credentials WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Credential for {} not found", email)),
            other => unexpected(other),
        })?;
        Ok(record.to_domain())
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<UserProfile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT name, email, role, created_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(ProfileRecord::to_domain).transpose()
    }

    async fn put_profile(&self, user_id: Uuid, profile: &UserProfile) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (user_id, name, email, role, created_at) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role",
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.role.as_str())
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_flashcards(&self, owner: Uuid) -> PortResult<Vec<Flashcard>> {
        let records = sqlx::query_as::<_, FlashcardRecord>(
            "SELECT id, title, content, category, date FROM flashcards WHERE owner_id = $1 ORDER BY date DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn save_flashcard(&self, owner: Uuid, flashcard: &Flashcard) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO flashcards (id, owner_id, title, content, category, date) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(flashcard.id)
        .bind(owner)
        .bind(&flashcard.title)
        .bind(&flashcard.content)
        .bind(&flashcard.category)
        .bind(flashcard.date)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_reminders(&self, owner: Uuid) -> PortResult<Vec<Reminder>> {
        let records = sqlx::query_as::<_, ReminderRecord>(
            "SELECT id, medicine, dosage, frequency, time, days, notes FROM reminders WHERE owner_id = $1 ORDER BY created_at ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn save_reminder(&self, owner: Uuid, reminder: &Reminder) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO reminders (id, owner_id, medicine, dosage, frequency, time, days, notes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(reminder.id)
        .bind(owner)
        .bind(&reminder.medicine)
        .bind(&reminder.dosage)
        .bind(&reminder.frequency)
        .bind(&reminder.time)
        .bind(&reminder.days)
        .bind(&reminder.notes)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_reminder(&self, owner: Uuid, reminder_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND owner_id = $2")
            .bind(reminder_id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Reminder {} not found", reminder_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
