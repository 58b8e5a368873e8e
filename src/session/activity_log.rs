//! Append-only per-session activity ledger.
//!
//! Entries record which agent did what and with what outcome so that clients
//! can observe progress while a job is still running. Entries are never
//! edited or removed; ordering within a session is insertion order.

use crate::types::ActivityLogEntry;
use chrono::Local;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-wide activity log, keyed by session id.
///
/// Safe to call from any task: appends take the write lock for the whole map,
/// which keeps per-session insertion order intact without per-entry locks.
pub struct ActivityLog {
    entries: RwLock<HashMap<String, Vec<ActivityLogEntry>>>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Append an entry to a session's log, stamping it with the current
    /// wall-clock time at second resolution.
    pub fn append(&self, session_id: &str, agent: &str, action: &str, result: &str) {
        let entry = ActivityLogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            agent: agent.to_string(),
            action: action.to_string(),
            result: result.to_string(),
        };

        tracing::info!(session_id, agent, action, result, "activity");

        let mut entries = self.entries.write();
        entries.entry(session_id.to_string()).or_default().push(entry);
    }

    /// All entries for a session, in append order.
    ///
    /// Returns an empty vec both for sessions with no entries and for unknown
    /// sessions; callers distinguish the two via the session registry.
    pub fn entries(&self, session_id: &str) -> Vec<ActivityLogEntry> {
        self.entries
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }
}
