// Per-session conversation history kept in process memory

use crate::types::{ChatMessage, Role};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Default)]
struct Session {
    messages: Vec<ChatMessage>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    by_id: HashMap<String, Session>,
    clock: u64,
}

/// Bounded in-memory chat history keyed by session id.
///
/// Each session keeps at most `max_messages` messages, and at most
/// `max_sessions` sessions are kept; the least recently written one is
/// dropped to make room.
pub struct ConversationStore {
    sessions: RwLock<Sessions>,
    max_messages: usize,
    max_sessions: usize,
}

impl ConversationStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_messages,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .await
            .by_id
            .get(session_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default()
    }

    /// Append messages, dropping the oldest beyond `max_messages`
    pub async fn append(&self, session_id: &str, messages: Vec<ChatMessage>) {
        let mut sessions = self.sessions.write().await;
        sessions.clock += 1;
        let now = sessions.clock;

        if !sessions.by_id.contains_key(session_id) && sessions.by_id.len() >= self.max_sessions {
            let oldest = sessions
                .by_id
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(session = %oldest, "Evicting least recently used session");
                sessions.by_id.remove(&oldest);
            }
        }

        let session = sessions.by_id.entry(session_id.to_string()).or_default();
        session.last_used = now;
        let history = &mut session.messages;
        history.extend(messages);

        if history.len() > self.max_messages {
            let excess = history.len() - self.max_messages;
            history.drain(..excess);
        }

        // A history handed to the model must open with a user turn
        while history.first().is_some_and(|m| m.role == Role::Assistant) {
            history.remove(0);
        }
    }

    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.by_id.remove(session_id);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }
}
