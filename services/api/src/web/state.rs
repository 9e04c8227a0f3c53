//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use medilog_core::assistant::{FlashcardSuggester, KeywordChatResponder, TemplateSummarizer};
use medilog_core::ports::{
    ChatResponder, DatabaseService, ExternalIdentityProvider, KeyValueStore, PasswordHasher,
    Summarizer,
};
use medilog_core::{AuthGateway, RecordStore, SessionStore, SummaryFlow};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthGateway,
    pub records: RecordStore,
    pub summarizer: Arc<dyn Summarizer>,
    pub chat: Arc<dyn ChatResponder>,
    pub suggester: FlashcardSuggester,
}

impl AppState {
    /// Wires the core services over the given adapters, using the keyword and
    /// template assistants.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        kv: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn PasswordHasher>,
        external: Option<Arc<dyn ExternalIdentityProvider>>,
    ) -> Self {
        let sessions = SessionStore::new(kv, config.session_ttl);
        Self {
            auth: AuthGateway::new(db.clone(), sessions, hasher, external),
            records: RecordStore::new(db),
            summarizer: Arc::new(TemplateSummarizer::new(config.summary_delay)),
            chat: Arc::new(KeywordChatResponder::new(config.chat_delay)),
            suggester: FlashcardSuggester::new(config.summary_delay),
            config,
        }
    }

    /// A fresh summary flow for one request.
    pub fn summary_flow(&self) -> SummaryFlow {
        SummaryFlow::new(self.summarizer.clone(), self.records.clone())
    }
}
