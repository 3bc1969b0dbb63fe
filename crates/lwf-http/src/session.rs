//! Server-side sessions keyed by a cookie.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use password_hash::rand_core::{OsRng, RngCore};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "LWFSESSID";

/// Flash message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug)]
struct SessionState {
    id: String,
    data: HashMap<String, serde_json::Value>,
    notifications: Vec<(NotificationLevel, String)>,
    expire_date: DateTime<Utc>,
}

/// A session.
///
/// Clones share the same data, so a handler writing to the session of its
/// request is seen by the kernel once the handler returns.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    /// Default session lifetime.
    pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

    /// Creates an empty session with a fresh id.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                id: generate_session_id(),
                data: HashMap::new(),
                notifications: Vec::new(),
                expire_date: Utc::now() + Duration::days(Self::DEFAULT_EXPIRY_DAYS),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session id (64 character hex string).
    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    /// Replaces the id, keeping the data. Used after a login.
    pub fn regenerate_id(&self) {
        self.write().id = generate_session_id();
    }

    /// Gets a value, or `None` if absent or of another shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read()
            .data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set<T: Serialize>(&self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.write().data.insert(key.to_string(), value);
        Ok(())
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().data.contains_key(key)
    }

    /// Removes a value, returning it.
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.write().data.remove(key)
    }

    /// Drops all values and notifications.
    pub fn clear(&self) {
        let mut state = self.write();
        state.data.clear();
        state.notifications.clear();
    }

    /// A copy of every stored value.
    pub fn all(&self) -> HashMap<String, serde_json::Value> {
        self.read().data.clone()
    }

    pub fn expire_date(&self) -> DateTime<Utc> {
        self.read().expire_date
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.read().expire_date
    }

    /// Pushes the expiry `days` from now.
    pub fn extend(&self, days: i64) {
        self.write().expire_date = Utc::now() + Duration::days(days);
    }

    pub fn add_notification(&self, level: NotificationLevel, message: impl Into<String>) {
        self.write().notifications.push((level, message.into()));
    }

    pub fn has_notification(&self) -> bool {
        !self.read().notifications.is_empty()
    }

    /// Pending notifications, removed from the session when `purge` is set.
    pub fn notifications(&self, purge: bool) -> Vec<(NotificationLevel, String)> {
        if purge {
            std::mem::take(&mut self.write().notifications)
        } else {
            self.read().notifications.clone()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session storage.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts and stores a new session.
    pub fn start(&self) -> Session {
        let session = Session::new();
        self.save(&session);
        tracing::debug!("session started");
        session
    }

    /// Finds a live session by id. An expired session is dropped.
    pub fn load(&self, id: &str) -> Option<Session> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()?;
        if session.is_expired() {
            self.delete(id);
            return None;
        }
        Some(session)
    }

    /// The session for `id`, or a new one when `id` is unknown.
    pub fn load_or_start(&self, id: Option<&str>) -> Session {
        id.and_then(|id| self.load(id))
            .unwrap_or_else(|| self.start())
    }

    /// Stores a session under its current id.
    pub fn save(&self, session: &Session) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id(), session.clone());
    }

    /// Stores a session whose id changed, dropping the old entry.
    pub fn rekey(&self, old_id: &str, session: &Session) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(old_id);
        sessions.insert(session.id(), session.clone());
    }

    pub fn delete(&self, id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Drops expired sessions, returning how many went.
    pub fn clear_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generation() {
        let first = generate_session_id();
        let second = generate_session_id();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_session_data() {
        let session = Session::new();
        session.set("cart", vec![3, 5]).unwrap();
        session.set("name", "alice").unwrap();

        assert!(session.has("cart"));
        assert_eq!(session.get::<Vec<u32>>("cart"), Some(vec![3, 5]));
        assert_eq!(session.get::<u32>("name"), None);
        assert_eq!(session.all().len(), 2);

        assert_eq!(session.remove("cart"), Some(serde_json::json!([3, 5])));
        assert!(!session.has("cart"));

        session.clear();
        assert!(session.all().is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let session = Session::new();
        let copy = session.clone();
        copy.set("seen", true).unwrap();
        assert_eq!(session.get::<bool>("seen"), Some(true));

        let id = session.id();
        copy.regenerate_id();
        assert_ne!(session.id(), id);
        assert_eq!(session.get::<bool>("seen"), Some(true));
    }

    #[test]
    fn test_notifications() {
        let session = Session::new();
        assert!(!session.has_notification());
        session.add_notification(NotificationLevel::Success, "saved");
        session.add_notification(NotificationLevel::Error, "but slowly");

        assert_eq!(session.notifications(false).len(), 2);
        let flashed = session.notifications(true);
        assert_eq!(flashed[0], (NotificationLevel::Success, "saved".to_string()));
        assert!(!session.has_notification());
    }

    #[test]
    fn test_session_expiration() {
        let session = Session::new();
        assert!(!session.is_expired());

        session.extend(-1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_store() {
        let store = SessionStore::new();
        let session = store.start();
        let id = session.id();
        assert_eq!(store.len(), 1);
        assert!(store.load(&id).is_some());
        assert!(store.load("unknown").is_none());

        let other = store.load_or_start(Some("unknown"));
        assert_ne!(other.id(), id);
        assert_eq!(store.load_or_start(Some(&id)).id(), id);
        assert_eq!(store.len(), 2);

        session.regenerate_id();
        store.rekey(&id, &session);
        assert!(store.load(&id).is_none());
        assert!(store.load(&session.id()).is_some());

        other.extend(-1);
        assert_eq!(store.clear_expired(), 1);
        assert!(store.delete(&session.id()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_session_is_not_loaded() {
        let store = SessionStore::new();
        let session = store.start();
        session.extend(-1);
        assert!(store.load(&session.id()).is_none());
        assert!(store.is_empty());
    }
}
