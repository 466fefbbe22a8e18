//! Session management for the visible chat transcript

use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;

use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// One question/answer exchange. Immutable once created; turns are appended
/// to a session, never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
}

/// Per-visitor session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
    pub created_at: u64,
    pub last_activity: u64,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        let now = now_unix();

        Self {
            session_id: Uuid::new_v4().to_string(),
            turns: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    #[must_use]
    pub fn is_expired(&self, timeout_secs: u64) -> bool {
        now_unix() - self.last_activity > timeout_secs
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Session store with automatic cleanup of idle sessions.
///
/// Sessions are keyed server-side; the browser only holds a signed cookie
/// carrying the session id. Within a live session the turn list is uncapped
/// and append-only; idle sessions are evicted wholesale by the sweep task.
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionState>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(session_timeout_secs: u64) -> Self {
        let sessions = Arc::new(DashMap::new());

        // Start cleanup task
        let sessions_clone = sessions.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Self::cleanup_expired_sessions(&sessions_clone, session_timeout_secs);
            }
        });

        Self { sessions }
    }

    /// Create a fresh session with a new id
    #[must_use]
    pub fn create_session(&self) -> SessionState {
        let session = SessionState::new();
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    #[must_use]
    pub fn get_session(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Append one turn to an existing session. Returns false when the session
    /// is unknown (expired or from before a restart).
    pub fn append_turn(&self, session_id: &str, turn: ConversationTurn) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => {
                session.turns.push(turn);
                session.last_activity = now_unix();
                true
            }
            None => false,
        }
    }

    pub fn delete_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn cleanup_expired_sessions(sessions: &DashMap<String, SessionState>, timeout_secs: u64) {
        let expired: Vec<String> = sessions
            .iter()
            .filter(|entry| entry.value().is_expired(timeout_secs))
            .map(|entry| entry.key().clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            tracing::info!("Cleaned up expired session: {}", session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_creation() {
        let store = SessionStore::new(3600);
        let session = store.create_session();

        assert!(!session.session_id.is_empty());
        assert_eq!(session.turns.len(), 0);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_append_turn_is_append_only() {
        let store = SessionStore::new(3600);
        let session = store.create_session();
        let id = session.session_id;

        assert!(store.append_turn(
            &id,
            ConversationTurn {
                query: "First?".to_string(),
                response: "One.".to_string(),
            },
        ));
        assert!(store.append_turn(
            &id,
            ConversationTurn {
                query: "Second?".to_string(),
                response: "Two.".to_string(),
            },
        ));

        let session = store.get_session(&id).unwrap();
        assert_eq!(session.turns.len(), 2);
        // Prior turns are preserved unchanged, in order
        assert_eq!(session.turns[0].query, "First?");
        assert_eq!(session.turns[0].response, "One.");
        assert_eq!(session.turns[1].query, "Second?");
    }

    #[tokio::test]
    async fn test_append_to_unknown_session_fails() {
        let store = SessionStore::new(3600);

        assert!(!store.append_turn(
            "no-such-session",
            ConversationTurn {
                query: "q".to_string(),
                response: "a".to_string(),
            },
        ));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(3600);
        let a = store.create_session();
        let b = store.create_session();

        store.append_turn(
            &a.session_id,
            ConversationTurn {
                query: "only in a".to_string(),
                response: "yes".to_string(),
            },
        );

        assert_eq!(store.get_session(&a.session_id).unwrap().turns.len(), 1);
        assert_eq!(store.get_session(&b.session_id).unwrap().turns.len(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_cleanup() {
        let store = SessionStore::new(3600);
        let session = store.create_session();
        let id = session.session_id;

        // Force the session into the past
        store.sessions.get_mut(&id).unwrap().last_activity = 0;
        SessionStore::cleanup_expired_sessions(&store.sessions, 3600);

        assert!(store.get_session(&id).is_none());
    }
}
