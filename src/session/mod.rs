//! Research session lifecycle management.
//!
//! A session is one research-goal execution context, identified by a unique
//! token, with its own status, activity log, and search cache. The registry
//! is the process-wide source of truth for session state; it lives only in
//! memory and is lost on restart.
//!
//! # State Machine
//!
//! ```text
//! pending -> running -> completed
//!                    -> error
//! ```
//!
//! Terminal states are final. The job task owning a session performs exactly
//! one terminal write; the registry refuses regressions instead of mutating.

/// Per-session append-only activity ledger.
pub mod activity_log;

pub use activity_log::ActivityLog;

use crate::types::{AppError, Result, SessionStatus};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Generate a collision-resistant session identifier.
///
/// The `research_` prefix keeps ids self-describing in logs and client code.
pub fn new_session_id() -> String {
    format!("research_{}", Uuid::new_v4())
}

#[derive(Debug, Clone)]
struct SessionRecord {
    status: SessionStatus,
    result: Option<serde_json::Value>,
    error_message: Option<String>,
}

/// Point-in-time view of a session, readable mid-flight.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

/// Process-wide mapping from session id to job status and outcome.
///
/// All mutation goes through the transition methods below; the whole map is
/// guarded by a single `RwLock` (contention is low: one writer task per
/// session plus polling readers).
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new session in the `pending` state.
    pub fn create(&self, session_id: &str) {
        let mut sessions = self.sessions.write();
        sessions.insert(
            session_id.to_string(),
            SessionRecord {
                status: SessionStatus::Pending,
                result: None,
                error_message: None,
            },
        );
    }

    /// Mark a session as running. Called once by the owning job task.
    pub fn set_running(&self, session_id: &str) {
        self.transition(session_id, SessionStatus::Running, None, None);
    }

    /// Record the terminal `completed` state with the job's result.
    pub fn set_completed(&self, session_id: &str, result: serde_json::Value) {
        self.transition(session_id, SessionStatus::Completed, Some(result), None);
    }

    /// Record the terminal `error` state with a human-readable message.
    pub fn set_error(&self, session_id: &str, message: &str) {
        self.transition(
            session_id,
            SessionStatus::Error,
            None,
            Some(message.to_string()),
        );
    }

    fn transition(
        &self,
        session_id: &str,
        next: SessionStatus,
        result: Option<serde_json::Value>,
        error_message: Option<String>,
    ) {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(session_id) {
            Some(record) if record.status.is_terminal() => {
                tracing::warn!(
                    session_id,
                    current = ?record.status,
                    attempted = ?next,
                    "refusing state transition out of a terminal session state"
                );
            }
            Some(record) => {
                record.status = next;
                record.result = result;
                record.error_message = error_message;
            }
            None => {
                tracing::warn!(session_id, "state transition for unknown session");
            }
        }
    }

    /// Read the current state of a session, including mid-flight.
    pub fn get(&self, session_id: &str) -> Result<SessionSnapshot> {
        let sessions = self.sessions.read();
        sessions
            .get(session_id)
            .map(|record| SessionSnapshot {
                status: record.status,
                result: record.result.clone(),
                error_message: record.error_message.clone(),
            })
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Number of sessions held (for observability; sessions are never evicted).
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_uniqueness() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("research_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let registry = SessionRegistry::new();
        assert!(registry.get("missing").is_err());
    }

    #[test]
    fn test_lifecycle_happy_path() {
        let registry = SessionRegistry::new();
        registry.create("s1");

        let snap = registry.get("s1").unwrap();
        assert_eq!(snap.status, SessionStatus::Pending);
        assert!(snap.result.is_none());

        registry.set_running("s1");
        assert_eq!(registry.get("s1").unwrap().status, SessionStatus::Running);

        registry.set_completed("s1", serde_json::json!({"findings": "x"}));
        let snap = registry.get("s1").unwrap();
        assert_eq!(snap.status, SessionStatus::Completed);
        assert_eq!(snap.result.unwrap()["findings"], "x");
        assert!(snap.error_message.is_none());
    }

    #[test]
    fn test_error_path_sets_message_not_result() {
        let registry = SessionRegistry::new();
        registry.create("s1");
        registry.set_running("s1");
        registry.set_error("s1", "runtime exploded");

        let snap = registry.get("s1").unwrap();
        assert_eq!(snap.status, SessionStatus::Error);
        assert!(snap.result.is_none());
        assert_eq!(snap.error_message.as_deref(), Some("runtime exploded"));
    }

    #[test]
    fn test_terminal_states_are_final() {
        let registry = SessionRegistry::new();
        registry.create("s1");
        registry.set_running("s1");
        registry.set_completed("s1", serde_json::json!("done"));

        // Attempts to leave a terminal state are ignored.
        registry.set_error("s1", "late failure");
        let snap = registry.get("s1").unwrap();
        assert_eq!(snap.status, SessionStatus::Completed);
        assert_eq!(snap.result.unwrap(), serde_json::json!("done"));
        assert!(snap.error_message.is_none());

        registry.set_running("s1");
        assert_eq!(registry.get("s1").unwrap().status, SessionStatus::Completed);
    }

    #[test]
    fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();
        registry.create("a");
        registry.create("b");
        registry.set_running("a");
        registry.set_error("b", "failed");

        assert_eq!(registry.get("a").unwrap().status, SessionStatus::Running);
        assert_eq!(registry.get("b").unwrap().status, SessionStatus::Error);
        assert_eq!(registry.len(), 2);
    }
}
