//! Session management for sqlrunner-rest
//!
//! Sessions keep per-client state between requests. Each session:
//! - Has a unique id
//! - Holds at most one uploaded dataset, replaced wholesale on upload
//! - Records query history (most recent first) and named saved queries
//! - Has a last-activity timestamp for timeout cleanup

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::{Dataset, Result, SqlRunnerError};

/// History entries kept per session
pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub query: String,
    /// RFC 3339 timestamp of the run
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedQuery {
    pub name: String,
    pub query: String,
}

/// State owned by one client
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// The uploaded file, if any
    pub dataset: Option<Dataset>,
    pub history: Vec<HistoryEntry>,
    pub saved: Vec<SavedQuery>,
    /// Last activity timestamp for timeout tracking
    pub last_activity: Instant,
}

impl Session {
    /// Create a new session with a generated id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..12].to_string(),
            dataset: None,
            history: Vec::new(),
            saved: Vec::new(),
            last_activity: Instant::now(),
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Check if session has expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }

    fn record(&mut self, query: &str) {
        self.history.insert(
            0,
            HistoryEntry {
                query: query.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.history.truncate(MAX_HISTORY);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Manages all active sessions
pub struct SessionManager {
    /// Active sessions indexed by session ID
    sessions: RwLock<HashMap<String, Session>>,
    /// Session inactivity timeout
    timeout: Duration,
}

impl SessionManager {
    /// Create a new session manager with the specified timeout
    pub fn new(timeout_minutes: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout: Duration::from_secs(timeout_minutes * 60),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .read()
            .map_err(|e| SqlRunnerError::InternalError(format!("Session lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .write()
            .map_err(|e| SqlRunnerError::InternalError(format!("Session lock poisoned: {}", e)))
    }

    /// Apply `f` to a live session, refreshing its activity timestamp
    fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut sessions = self.write()?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SqlRunnerError::SessionNotFound(id.to_string()))?;
        session.touch();
        Ok(f(session))
    }

    /// Create a new session and return its ID
    pub fn create_session(&self) -> Result<String> {
        let session = Session::new();
        let id = session.id.clone();
        self.write()?.insert(id.clone(), session);
        Ok(id)
    }

    /// Snapshot of a session, updating its last activity
    pub fn get_session(&self, id: &str) -> Result<Session> {
        self.with_session(id, |s| s.clone())
    }

    /// Copy of the session's dataset, `None` when nothing is uploaded
    pub fn dataset(&self, id: &str) -> Result<Option<Dataset>> {
        self.with_session(id, |s| s.dataset.clone())
    }

    /// Replace the session's dataset with a newly ingested one
    pub fn replace_dataset(&self, id: &str, dataset: Dataset) -> Result<()> {
        self.with_session(id, |s| s.dataset = Some(dataset))
    }

    /// Drop the session's dataset (source switched away from the file)
    pub fn clear_dataset(&self, id: &str) -> Result<bool> {
        self.with_session(id, |s| s.dataset.take().is_some())
    }

    /// Prepend a query run to the session's history
    pub fn record_history(&self, id: &str, query: &str) -> Result<()> {
        self.with_session(id, |s| s.record(query))
    }

    pub fn history(&self, id: &str) -> Result<Vec<HistoryEntry>> {
        self.with_session(id, |s| s.history.clone())
    }

    /// Save a named query; an existing entry with the same name is replaced
    pub fn save_query(&self, id: &str, name: &str, query: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SqlRunnerError::ValidationError(
                "Saved query name must not be empty".to_string(),
            ));
        }

        self.with_session(id, |s| {
            let entry = SavedQuery {
                name: name.to_string(),
                query: query.to_string(),
            };
            match s.saved.iter_mut().find(|q| q.name == entry.name) {
                Some(existing) => *existing = entry,
                None => s.saved.push(entry),
            }
        })
    }

    pub fn saved_queries(&self, id: &str) -> Result<Vec<SavedQuery>> {
        self.with_session(id, |s| s.saved.clone())
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    /// IDs of all expired sessions
    pub fn expired_sessions(&self) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .iter()
            .filter(|(_, s)| s.is_expired(self.timeout))
            .map(|(id, _)| id.clone())
            .collect())
    }

    /// Remove expired sessions, returning how many were dropped
    pub fn remove_expired(&self) -> Result<usize> {
        let mut sessions = self.write()?;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.timeout));
        Ok(before - sessions.len())
    }

    /// Check if a session exists
    pub fn session_exists(&self, id: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    /// Get session count (for health check)
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Get the timeout duration
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest_bytes;
    use std::thread::sleep;

    fn dataset(name: &str) -> Dataset {
        ingest_bytes(name, b"a,b\n1,2\n").unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new();
        assert_eq!(session.id.len(), 12);
        assert!(session.dataset.is_none());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_session_manager_create_delete() {
        let manager = SessionManager::new(30);
        let id = manager.create_session().unwrap();
        assert!(manager.session_exists(&id).unwrap());
        assert_eq!(manager.session_count().unwrap(), 1);

        assert!(manager.delete_session(&id).unwrap());
        assert!(!manager.session_exists(&id).unwrap());
        assert!(!manager.delete_session(&id).unwrap());
    }

    #[test]
    fn test_unknown_session() {
        let manager = SessionManager::new(30);
        assert!(matches!(
            manager.dataset("missing").unwrap_err(),
            SqlRunnerError::SessionNotFound(_)
        ));
    }

    #[test]
    fn test_dataset_is_replaced_wholesale() {
        let manager = SessionManager::new(30);
        let id = manager.create_session().unwrap();
        assert!(manager.dataset(&id).unwrap().is_none());

        manager.replace_dataset(&id, dataset("first.csv")).unwrap();
        manager.replace_dataset(&id, dataset("second.csv")).unwrap();
        assert_eq!(manager.dataset(&id).unwrap().unwrap().name, "second.csv");

        assert!(manager.clear_dataset(&id).unwrap());
        assert!(manager.dataset(&id).unwrap().is_none());
        assert!(!manager.clear_dataset(&id).unwrap());
    }

    #[test]
    fn test_history_most_recent_first_and_capped() {
        let manager = SessionManager::new(30);
        let id = manager.create_session().unwrap();

        for i in 0..(MAX_HISTORY + 5) {
            manager.record_history(&id, &format!("SELECT {}", i)).unwrap();
        }

        let history = manager.history(&id).unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].query, format!("SELECT {}", MAX_HISTORY + 4));
        assert!(!history[0].timestamp.is_empty());
    }

    #[test]
    fn test_saved_queries() {
        let manager = SessionManager::new(30);
        let id = manager.create_session().unwrap();

        manager.save_query(&id, "all", "SELECT * FROM t").unwrap();
        manager.save_query(&id, "adults", "SELECT * FROM t WHERE age > 17").unwrap();
        manager.save_query(&id, "all", "SELECT a FROM t").unwrap();

        let saved = manager.saved_queries(&id).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].query, "SELECT a FROM t");

        assert!(matches!(
            manager.save_query(&id, "  ", "SELECT 1").unwrap_err(),
            SqlRunnerError::ValidationError(_)
        ));
    }

    #[test]
    fn test_session_expiry() {
        let manager = SessionManager::new(0); // 0 minute timeout = immediate expiry
        let id = manager.create_session().unwrap();

        // Session should be expired immediately (0 timeout)
        sleep(Duration::from_millis(10));

        let expired = manager.expired_sessions().unwrap();
        assert_eq!(expired, vec![id]);

        assert_eq!(manager.remove_expired().unwrap(), 1);
        assert_eq!(manager.session_count().unwrap(), 0);
    }
}
