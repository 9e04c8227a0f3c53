//! Stub collaborators shared by the unit tests.

use crate::domain::ExternalIdentity;
use crate::ports::{
    ExternalIdentityProvider, PasswordHasher, PortError, PortResult, SpeechRecognizer,
    Summarizer, TranscriptStream,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Stores passwords as-is. Never use outside tests.
pub struct PlainTextHasher;

#[async_trait]
impl PasswordHasher for PlainTextHasher {
    async fn hash(&self, password: &str) -> PortResult<String> {
        Ok(password.to_string())
    }

    async fn verify(&self, password: &str, hashed_password: &str) -> PortResult<bool> {
        Ok(password == hashed_password)
    }
}

/// Accepts exactly one token.
pub struct StaticIdentityProvider {
    token: String,
    identity: ExternalIdentity,
}

impl StaticIdentityProvider {
    pub fn new(token: &str, subject: &str, email: &str, name: &str) -> Self {
        Self {
            token: token.to_string(),
            identity: ExternalIdentity {
                subject: subject.to_string(),
                email: Some(email.to_string()),
                display_name: Some(name.to_string()),
            },
        }
    }
}

#[async_trait]
impl ExternalIdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> PortResult<ExternalIdentity> {
        if token == self.token {
            Ok(self.identity.clone())
        } else {
            Err(PortError::Unauthorized)
        }
    }
}

/// A recognizer fed by the test through an mpsc sender.
///
/// Each `start` hands out the receiver of a fresh channel and counts the call.
#[derive(Clone, Default)]
pub struct ChannelRecognizer {
    starts: Arc<AtomicUsize>,
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<PortResult<String>>>>>,
}

impl ChannelRecognizer {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub async fn say(&self, words: &str) -> bool {
        match self.sender.lock().await.as_ref() {
            Some(tx) => tx.send(Ok(words.to_string())).is_ok(),
            None => false,
        }
    }

    /// True while the subscriber still holds the receiving end.
    pub async fn is_listening(&self) -> bool {
        self.sender
            .lock()
            .await
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }
}

#[async_trait]
impl SpeechRecognizer for ChannelRecognizer {
    async fn start(&self) -> PortResult<TranscriptStream> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().await = Some(tx);
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

/// A summarizer that always fails.
pub struct BrokenSummarizer;

#[async_trait]
impl Summarizer for BrokenSummarizer {
    async fn summarize(&self, _text: &str) -> PortResult<String> {
        Err(PortError::Unexpected("summarizer offline".to_string()))
    }
}
