//! crates/medilog_core/src/records.rs
//!
//! Per-user flashcard and reminder operations over the `DatabaseService` port.

use crate::domain::{Flashcard, NewFlashcard, NewReminder, Reminder};
use crate::ports::{DatabaseService, PortError};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const UNTITLED: &str = "Untitled";
pub const NO_CONTENT: &str = "No content available";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("At least one flashcard is required")]
    EmptyBatch,
    #[error("Reminder {0} not found")]
    ReminderNotFound(Uuid),
    #[error(transparent)]
    Port(#[from] PortError),
}

fn fallback(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone)]
pub struct RecordStore {
    db: Arc<dyn DatabaseService>,
}

impl RecordStore {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn list_flashcards(&self, owner: Uuid) -> Result<Vec<Flashcard>, RecordError> {
        Ok(self.db.list_flashcards(owner).await?)
    }

    pub async fn create_flashcard(
        &self,
        owner: Uuid,
        new: NewFlashcard,
    ) -> Result<Flashcard, RecordError> {
        let flashcard = Flashcard {
            id: Uuid::new_v4(),
            title: fallback(new.title, UNTITLED),
            content: fallback(new.content, NO_CONTENT),
            category: fallback(new.category, UNCATEGORIZED),
            date: Utc::now(),
        };
        self.db.save_flashcard(owner, &flashcard).await?;
        Ok(flashcard)
    }

    /// Saves each card in order; stops at the first failure.
    pub async fn create_flashcards(
        &self,
        owner: Uuid,
        batch: Vec<NewFlashcard>,
    ) -> Result<Vec<Flashcard>, RecordError> {
        if batch.is_empty() {
            return Err(RecordError::EmptyBatch);
        }
        let mut saved = Vec::with_capacity(batch.len());
        for new in batch {
            saved.push(self.create_flashcard(owner, new).await?);
        }
        Ok(saved)
    }

    pub async fn list_reminders(&self, owner: Uuid) -> Result<Vec<Reminder>, RecordError> {
        Ok(self.db.list_reminders(owner).await?)
    }

    pub async fn create_reminder(
        &self,
        owner: Uuid,
        new: NewReminder,
    ) -> Result<Reminder, RecordError> {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            medicine: new.medicine.trim().to_string(),
            dosage: new.dosage.trim().to_string(),
            frequency: new.frequency.trim().to_string(),
            time: new.time.trim().to_string(),
            days: new.days,
            notes: new
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        self.db.save_reminder(owner, &reminder).await?;
        Ok(reminder)
    }

    pub async fn delete_reminder(&self, owner: Uuid, reminder_id: Uuid) -> Result<(), RecordError> {
        self.db
            .delete_reminder(owner, reminder_id)
            .await
            .map_err(|e| match e {
                PortError::NotFound(_) => RecordError::ReminderNotFound(reminder_id),
                other => RecordError::Port(other),
            })
    }
}
