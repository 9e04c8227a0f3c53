//! crates/medilog_core/src/assistant.rs
//!
//! Keyword and template stand-ins for the assistant backend. They sit behind
//! the `ChatResponder` and `Summarizer` ports so a model-backed adapter can
//! replace them without touching callers.

use crate::domain::{ChatMessage, Role};
use crate::ports::{ChatResponder, PortResult, Summarizer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REPLY: &str = "I'm your MediLog assistant. How can I help you today?";

pub const MEDICATION_REPLY: &str = "MediLog can help you track your medications and set reminders. Would you like me to show you how to set up medication reminders?";
pub const RECORD_REPLY: &str = "You can record medical interactions using our voice-to-text feature. Just navigate to the 'Record Interaction' page from your dashboard and click the microphone button to start recording.";
pub const FLASHCARD_REPLY: &str = "MediLog's flashcard feature helps you remember important medical information. You can create flashcards manually or let our AI generate them from your medical records.";
pub const SEARCH_REPLY: &str = "You can search through your medical records using the Search feature. It allows you to filter by date, record type, and keywords to find exactly what you're looking for.";
pub const GREETING_REPLY: &str = "Hello! Welcome to MediLog. I'm here to help you navigate the app and answer any questions you might have.";
pub const THANKS_REPLY: &str = "You're welcome! If you have any other questions, feel free to ask anytime.";
pub const HELP_REPLY: &str = "I can help you with various aspects of MediLog, such as recording medical interactions, setting medication reminders, creating flashcards, or searching through your records. What would you like assistance with?";

/// Ordered: the first rule with any matching keyword wins.
const RULES: &[(&[&str], &str)] = &[
    (&["medication", "medicine"], MEDICATION_REPLY),
    (&["record", "voice"], RECORD_REPLY),
    (&["flashcard"], FLASHCARD_REPLY),
    (&["search"], SEARCH_REPLY),
    (&["hello", "hi"], GREETING_REPLY),
    (&["thank"], THANKS_REPLY),
    (&["help"], HELP_REPLY),
];

/// Picks the canned reply for a single message.
pub fn canned_reply(message: &str) -> &'static str {
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}

/// Answers the latest message only, after a fixed artificial delay.
#[derive(Debug, Clone)]
pub struct KeywordChatResponder {
    delay: Duration,
}

impl KeywordChatResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ChatResponder for KeywordChatResponder {
    async fn respond(&self, history: &[ChatMessage]) -> PortResult<String> {
        tokio::time::sleep(self.delay).await;
        let reply = history
            .last()
            .map(|m| canned_reply(&m.content))
            .unwrap_or(DEFAULT_REPLY);
        Ok(reply.to_string())
    }
}

//=========================================================================================
// Summaries
//=========================================================================================

/// Fields typed on the manual-entry form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_age: Option<u32>,
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

impl ManualEntry {
    /// True when no field carries any text.
    pub fn is_blank(&self) -> bool {
        [&self.symptoms, &self.diagnosis, &self.medications, &self.notes]
            .iter()
            .all(|f| or_default(f, "").is_empty())
    }

    /// Renders the visit template. Patient fields only apply to caregivers.
    pub fn render(&self, author: Role) -> String {
        let body = format!(
            "Patient presented with {}.\nAssessment indicates {}.\nRecommended treatment includes {}.\nFollow-up appointment scheduled in 2 weeks.",
            or_default(&self.symptoms, "symptoms that include fatigue and headaches"),
            or_default(&self.diagnosis, "possible hypertension"),
            or_default(&self.medications, "regular monitoring and lifestyle changes"),
        );

        let name = or_default(&self.patient_name, "");
        match author {
            Role::Caregiver if !name.is_empty() => match self.patient_age {
                Some(age) => format!("Patient: {} (age {})\n{}", name, age, body),
                None => format!("Patient: {}\n{}", name, body),
            },
            Role::Caregiver | Role::Patient => body,
        }
    }
}

/// Builds a summary from the fixed visit template.
#[derive(Debug, Clone)]
pub struct TemplateSummarizer {
    delay: Duration,
}

impl TemplateSummarizer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

fn opening_sentence(text: &str) -> &str {
    let text = text.trim();
    text.find(|c: char| matches!(c, '.' | '?' | '!'))
        .map(|end| &text[..=end])
        .unwrap_or(text)
}

#[async_trait]
impl Summarizer for TemplateSummarizer {
    async fn summarize(&self, text: &str) -> PortResult<String> {
        tokio::time::sleep(self.delay).await;
        Ok(format!(
            "Transcript begins: \"{}\"\n{}",
            opening_sentence(text),
            ManualEntry::default().render(Role::Patient)
        ))
    }
}

//=========================================================================================
// Flashcard suggestions
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
#[error("No content to generate flashcards from")]
pub struct EmptyContent;

/// Proposes the fixed set of study cards for any non-empty content.
#[derive(Debug, Clone)]
pub struct FlashcardSuggester {
    delay: Duration,
}

impl FlashcardSuggester {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn suggest(&self, content: &str) -> Result<Vec<FlashcardDraft>, EmptyContent> {
        if content.trim().is_empty() {
            return Err(EmptyContent);
        }
        tokio::time::sleep(self.delay).await;

        let drafts = [
            (
                "Blood Pressure",
                "Normal range: 120/80 mmHg. Your current reading: 130/85 mmHg.",
            ),
            (
                "Medication Schedule",
                "Take Lisinopril 10mg once daily in the morning with food.",
            ),
            (
                "Follow-up Appointment",
                "Schedule a follow-up in 3 months for blood pressure monitoring.",
            ),
        ];
        Ok(drafts
            .into_iter()
            .map(|(title, content)| FlashcardDraft {
                title: title.to_string(),
                content: content.to_string(),
            })
            .collect())
    }
}
