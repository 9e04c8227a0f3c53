//! crates/medilog_core/src/capture.rs
//!
//! The record-capture flow: a recording toggle that feeds a transcript, and
//! the summarize-then-save step that turns text into a flashcard.

use crate::assistant::ManualEntry;
use crate::domain::{Flashcard, NewFlashcard, Role};
use crate::ports::{PortError, SpeechRecognizer, Summarizer};
use crate::records::{RecordError, RecordStore};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub const SUMMARY_TITLE: &str = "Generated Summary";
pub const VISIT_SUMMARY_TITLE: &str = "Visit Summary";
pub const SUMMARY_CATEGORY: &str = "Summaries";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Speech recognition is not supported")]
    Unsupported,
    #[error("Please record or enter text before generating a summary")]
    EmptyTranscript,
    #[error("A summary is already being generated")]
    Busy,
    #[error(transparent)]
    Port(#[from] PortError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

//=========================================================================================
// Recording
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

struct ActiveRecording {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// One recording toggle. Each start subscribes to the recognizer once; the
/// subscription is cancelled on stop and on drop.
pub struct RecordingSession {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    transcript: Arc<RwLock<String>>,
    active: Option<ActiveRecording>,
}

impl RecordingSession {
    /// `recognizer` is `None` when the capability is missing.
    pub fn new(recognizer: Option<Arc<dyn SpeechRecognizer>>) -> Self {
        Self {
            recognizer,
            transcript: Arc::new(RwLock::new(String::new())),
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub async fn transcript(&self) -> String {
        self.transcript.read().await.clone()
    }

    /// Replaces the transcript, as when the user edits it by hand.
    pub async fn set_transcript(&self, text: impl Into<String>) {
        *self.transcript.write().await = text.into();
    }

    pub async fn toggle(&mut self) -> Result<RecordingState, CaptureError> {
        match self.active.take() {
            Some(active) => {
                active.token.cancel();
                if let Err(e) = active.task.await {
                    warn!("Transcript subscriber ended abnormally: {}", e);
                }
                info!("Recording stopped");
                Ok(RecordingState::Idle)
            }
            None => {
                let recognizer = self.recognizer.as_ref().ok_or(CaptureError::Unsupported)?;
                let mut stream = recognizer.start().await?;
                let token = CancellationToken::new();
                let transcript = self.transcript.clone();
                let child = token.clone();

                let task = tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            _ = child.cancelled() => break,
                            next = stream.next() => match next {
                                Some(Ok(words)) => append(&transcript, &words).await,
                                Some(Err(e)) => {
                                    warn!("Speech recognition error: {}", e);
                                    break;
                                }
                                None => break,
                            },
                        }
                    }
                });

                self.active = Some(ActiveRecording { token, task });
                info!("Recording started");
                Ok(RecordingState::Recording)
            }
        }
    }
}

async fn append(transcript: &RwLock<String>, words: &str) {
    let words = words.trim();
    if words.is_empty() {
        return;
    }
    let mut transcript = transcript.write().await;
    if !transcript.is_empty() {
        transcript.push(' ');
    }
    transcript.push_str(words);
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
    }
}

//=========================================================================================
// Summarizing
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Idle,
    Summarizing,
    Summarized(String),
}

/// The result of a successful summary: the text and the flashcard it was saved as.
#[derive(Debug, Clone)]
pub struct SavedSummary {
    pub summary: String,
    pub flashcard: Flashcard,
}

pub struct SummaryFlow {
    summarizer: Arc<dyn Summarizer>,
    records: RecordStore,
    state: SummaryState,
}

impl SummaryFlow {
    pub fn new(summarizer: Arc<dyn Summarizer>, records: RecordStore) -> Self {
        Self {
            summarizer,
            records,
            state: SummaryState::Idle,
        }
    }

    pub fn state(&self) -> &SummaryState {
        &self.state
    }

    /// Summarizes `text` and saves it under the owner's "Summaries".
    pub async fn generate_summary(
        &mut self,
        owner: Uuid,
        text: &str,
    ) -> Result<SavedSummary, CaptureError> {
        if text.trim().is_empty() {
            return Err(CaptureError::EmptyTranscript);
        }
        if self.state == SummaryState::Summarizing {
            return Err(CaptureError::Busy);
        }

        self.state = SummaryState::Summarizing;
        let result = self.summarize_and_save(owner, text).await;
        self.state = match &result {
            Ok(saved) => SummaryState::Summarized(saved.summary.clone()),
            Err(e) => {
                warn!("Failed to generate summary: {}", e);
                SummaryState::Idle
            }
        };
        result
    }

    async fn summarize_and_save(
        &self,
        owner: Uuid,
        text: &str,
    ) -> Result<SavedSummary, CaptureError> {
        let summary = self.summarizer.summarize(text).await?;
        let flashcard = self.save(owner, SUMMARY_TITLE, &summary).await?;
        Ok(SavedSummary { summary, flashcard })
    }

    /// Renders a manual entry through the visit template and saves it.
    pub async fn generate_from_entry(
        &mut self,
        owner: Uuid,
        author: Role,
        entry: &ManualEntry,
    ) -> Result<SavedSummary, CaptureError> {
        if entry.is_blank() {
            return Err(CaptureError::EmptyTranscript);
        }
        let summary = entry.render(author);
        match self.save(owner, VISIT_SUMMARY_TITLE, &summary).await {
            Ok(flashcard) => {
                self.state = SummaryState::Summarized(summary.clone());
                Ok(SavedSummary { summary, flashcard })
            }
            Err(e) => {
                self.state = SummaryState::Idle;
                Err(e.into())
            }
        }
    }

    async fn save(&self, owner: Uuid, title: &str, summary: &str) -> Result<Flashcard, RecordError> {
        self.records
            .create_flashcard(
                owner,
                NewFlashcard {
                    title: title.to_string(),
                    content: summary.to_string(),
                    category: SUMMARY_CATEGORY.to_string(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::TemplateSummarizer;
    use crate::memory::InMemoryDatabase;
    use crate::testing::{BrokenSummarizer, ChannelRecognizer};
    use std::time::Duration;

    #[tokio::test]
    async fn toggle_without_capability_leaves_state_unchanged() {
        let mut session = RecordingSession::new(None);

        assert!(matches!(session.toggle().await, Err(CaptureError::Unsupported)));
        assert_eq!(session.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn recording_subscribes_once_and_unsubscribes_on_stop() {
        let recognizer = ChannelRecognizer::default();
        let mut session = RecordingSession::new(Some(Arc::new(recognizer.clone())));

        assert_eq!(session.toggle().await.unwrap(), RecordingState::Recording);
        assert!(recognizer.say("blood pressure").await);
        assert!(recognizer.say("was high").await);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // transcript changes never re-subscribe
        assert_eq!(recognizer.starts(), 1);
        assert_eq!(session.transcript().await, "blood pressure was high");

        assert_eq!(session.toggle().await.unwrap(), RecordingState::Idle);
        assert!(!recognizer.is_listening().await);

        session.toggle().await.unwrap();
        assert_eq!(recognizer.starts(), 2);
    }

    #[tokio::test]
    async fn dropping_a_recording_cancels_the_subscription() {
        let recognizer = ChannelRecognizer::default();
        let mut session = RecordingSession::new(Some(Arc::new(recognizer.clone())));
        session.toggle().await.unwrap();

        drop(session);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!recognizer.is_listening().await);
    }

    fn flow(summarizer: Arc<dyn Summarizer>) -> (SummaryFlow, RecordStore) {
        let records = RecordStore::new(Arc::new(InMemoryDatabase::new()));
        (SummaryFlow::new(summarizer, records.clone()), records)
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_leaving_idle() {
        let (mut flow, _) = flow(Arc::new(TemplateSummarizer::new(Duration::ZERO)));

        assert!(matches!(
            flow.generate_summary(Uuid::new_v4(), "   ").await,
            Err(CaptureError::EmptyTranscript)
        ));
        assert_eq!(flow.state(), &SummaryState::Idle);
    }

    #[tokio::test]
    async fn summary_is_saved_as_a_flashcard() {
        let (mut flow, records) = flow(Arc::new(TemplateSummarizer::new(Duration::ZERO)));
        let owner = Uuid::new_v4();

        let saved = flow.generate_summary(owner, "Visited the clinic.").await.unwrap();

        assert_eq!(flow.state(), &SummaryState::Summarized(saved.summary.clone()));
        let cards = records.list_flashcards(owner).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, SUMMARY_TITLE);
        assert_eq!(cards[0].category, SUMMARY_CATEGORY);
        assert_eq!(cards[0].content, saved.summary);
    }

    #[tokio::test]
    async fn failures_reset_to_idle_and_save_nothing() {
        let (mut flow, records) = flow(Arc::new(BrokenSummarizer));
        let owner = Uuid::new_v4();

        assert!(flow.generate_summary(owner, "text").await.is_err());
        assert_eq!(flow.state(), &SummaryState::Idle);
        assert!(records.list_flashcards(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn manual_entries_are_rendered_and_saved() {
        let (mut flow, records) = flow(Arc::new(BrokenSummarizer));
        let owner = Uuid::new_v4();
        let entry = ManualEntry {
            symptoms: Some("a cough".to_string()),
            ..Default::default()
        };

        let saved = flow
            .generate_from_entry(owner, Role::Patient, &entry)
            .await
            .unwrap();

        assert!(saved.summary.starts_with("Patient presented with a cough."));
        assert_eq!(records.list_flashcards(owner).await.unwrap()[0].title, VISIT_SUMMARY_TITLE);
        assert!(matches!(
            flow.generate_from_entry(owner, Role::Patient, &ManualEntry::default()).await,
            Err(CaptureError::EmptyTranscript)
        ));
    }
}
