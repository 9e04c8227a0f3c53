pub mod assistant;
pub mod auth;
pub mod capture;
pub mod domain;
pub mod memory;
pub mod navigation;
pub mod ports;
pub mod records;
pub mod session;

#[cfg(test)]
mod testing;

pub use auth::{AuthError, AuthGateway, AuthOutcome};
pub use capture::{CaptureError, RecordingSession, RecordingState, SavedSummary, SummaryFlow, SummaryState};
pub use domain::{
    ChatMessage, ChatRole, Credential, ExternalIdentity, Flashcard, NewFlashcard, NewReminder,
    Reminder, Role, User, UserProfile,
};
pub use ports::{
    ChatResponder, DatabaseService, ExternalIdentityProvider, KeyValueStore, PasswordHasher,
    PortError, PortResult, SpeechRecognizer, Summarizer, TranscriptStream,
};
pub use records::{RecordError, RecordStore};
pub use session::SessionStore;
