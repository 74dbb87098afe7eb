//! Accounting session tracking.
//!
//! Sessions live in memory from Accounting-Start (or the first packet that
//! implies one) until Accounting-Stop. The store is shared by both
//! listeners, so all access goes through a concurrent map.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session already tracked: {sid} via {nas}")]
    DuplicateSession { sid: String, nas: String },
}

/// Current wall-clock time as Unix seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Identity of one live session.
///
/// The pair matters: two NAS devices can hand out the same
/// Acct-Session-Id, and folding them together would let one device's Stop
/// tear down the other's session.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SessionKey {
    pub sid: String,
    pub nas: String,
}

impl SessionKey {
    pub fn new(sid: impl Into<String>, nas: impl Into<String>) -> Self {
        SessionKey {
            sid: sid.into(),
            nas: nas.into(),
        }
    }
}

/// One accounting session between Start and Stop.
///
/// The engine fills the fixed fields in as lifecycle packets arrive;
/// `extra` is free space for policy handlers.
#[derive(Debug, Clone)]
pub struct Session {
    /// Derived session id
    pub sid: String,
    /// NAS the session belongs to
    pub nas: String,
    /// Start time, Unix seconds. Reconstructed from Acct-Session-Time when
    /// a Stop arrives for a session whose Start was never seen.
    pub started: Option<u64>,
    /// Stop time, Unix seconds
    pub stopped: Option<u64>,
    /// Acct-Input-Octets from the Stop packet
    pub input_octets: Option<u32>,
    /// Acct-Output-Octets from the Stop packet
    pub output_octets: Option<u32>,
    /// Acct-Terminate-Cause from the Stop packet
    pub terminate_cause: Option<u32>,
    /// User-Name
    pub username: Option<String>,
    /// Tunnel-Client-Endpoint, the client's address as the NAS saw it
    pub client_ip: Option<String>,
    /// Tunnel-Assignment-ID
    pub tunnel: Option<String>,
    /// Accumulated Vendor-Specific payload
    pub vsa: Option<String>,
    /// Framed-IP-Address assigned to the client
    pub framed_ip: Option<Ipv4Addr>,
    /// Ad hoc fields owned by policy handlers
    pub extra: HashMap<String, String>,
}

impl Session {
    /// Create an empty session for the given identity.
    pub fn new(sid: impl Into<String>, nas: impl Into<String>) -> Self {
        Session {
            sid: sid.into(),
            nas: nas.into(),
            started: None,
            stopped: None,
            input_octets: None,
            output_octets: None,
            terminate_cause: None,
            username: None,
            client_ip: None,
            tunnel: None,
            vsa: None,
            framed_ip: None,
            extra: HashMap::new(),
        }
    }

    /// The store key for this session.
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.sid.clone(), self.nas.clone())
    }

    /// Seconds between start and stop, when both are known.
    pub fn duration(&self) -> Option<u64> {
        match (self.started, self.stopped) {
            (Some(started), Some(stopped)) => Some(stopped.saturating_sub(started)),
            _ => None,
        }
    }
}

/// In-memory store of live sessions.
///
/// At most one session exists per `(sid, nas)` pair; `add` refuses a
/// second. Mutation goes through `update`, which runs the closure while
/// holding the entry's shard lock, so the closure must not call back into
/// the store.
pub struct SessionStore {
    sessions: DashMap<SessionKey, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: DashMap::new(),
        }
    }

    /// Whether a session is tracked for the pair.
    pub fn has(&self, sid: &str, nas: &str) -> bool {
        self.sessions.contains_key(&SessionKey::new(sid, nas))
    }

    /// Track a new session. Fails if the pair is already tracked.
    pub fn add(&self, session: Session) -> Result<(), SessionError> {
        match self.sessions.entry(session.key()) {
            Entry::Occupied(_) => Err(SessionError::DuplicateSession {
                sid: session.sid,
                nas: session.nas,
            }),
            Entry::Vacant(entry) => {
                entry.insert(session);
                Ok(())
            }
        }
    }

    /// A copy of the tracked session, if any.
    pub fn get(&self, sid: &str, nas: &str) -> Option<Session> {
        self.sessions
            .get(&SessionKey::new(sid, nas))
            .map(|entry| entry.value().clone())
    }

    /// Stop tracking and return the session, if it was tracked.
    pub fn remove(&self, sid: &str, nas: &str) -> Option<Session> {
        self.sessions
            .remove(&SessionKey::new(sid, nas))
            .map(|(_, session)| session)
    }

    /// Mutate the tracked session in place. Returns false when the pair is
    /// not tracked. The closure runs under the entry lock.
    pub(crate) fn update<F>(&self, sid: &str, nas: &str, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        match self.sessions.get_mut(&SessionKey::new(sid, nas)) {
            Some(mut entry) => {
                f(entry.value_mut());
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every tracked session.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Copies of all live sessions, in no particular order.
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_get_remove() {
        let store = SessionStore::new();
        assert!(!store.has("abc", "10.0.0.1"));

        let mut session = Session::new("abc", "10.0.0.1");
        session.username = Some("bob".to_string());
        store.add(session).unwrap();

        assert!(store.has("abc", "10.0.0.1"));
        assert_eq!(store.len(), 1);
        let found = store.get("abc", "10.0.0.1").unwrap();
        assert_eq!(found.username.as_deref(), Some("bob"));

        let removed = store.remove("abc", "10.0.0.1").unwrap();
        assert_eq!(removed.sid, "abc");
        assert!(!store.has("abc", "10.0.0.1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_refuses_duplicate_pair() {
        let store = SessionStore::new();
        store.add(Session::new("abc", "10.0.0.1")).unwrap();

        let result = store.add(Session::new("abc", "10.0.0.1"));
        assert!(matches!(
            result,
            Err(SessionError::DuplicateSession { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_sid_different_nas_are_distinct() {
        let store = SessionStore::new();
        store.add(Session::new("abc", "10.0.0.1")).unwrap();
        store.add(Session::new("abc", "10.0.0.2")).unwrap();

        assert_eq!(store.len(), 2);
        store.remove("abc", "10.0.0.1").unwrap();
        assert!(!store.has("abc", "10.0.0.1"));
        assert!(store.has("abc", "10.0.0.2"));
    }

    #[test]
    fn test_pair_key_does_not_smear() {
        // "ab" + "c10.0.0.1" must not collide with "abc" + "10.0.0.1"
        let store = SessionStore::new();
        store.add(Session::new("abc", "10.0.0.1")).unwrap();
        assert!(!store.has("ab", "c10.0.0.1"));
        assert!(!store.has("abc1", "0.0.0.1"));
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = SessionStore::new();
        store.add(Session::new("abc", "10.0.0.1")).unwrap();

        let updated = store.update("abc", "10.0.0.1", |session| {
            session.started = Some(1_700_000_000);
            session.extra.insert("plan".to_string(), "gold".to_string());
        });
        assert!(updated);

        let session = store.get("abc", "10.0.0.1").unwrap();
        assert_eq!(session.started, Some(1_700_000_000));
        assert_eq!(session.extra.get("plan").map(String::as_str), Some("gold"));

        assert!(!store.update("missing", "10.0.0.1", |_| {}));
    }

    #[test]
    fn test_session_duration() {
        let mut session = Session::new("abc", "10.0.0.1");
        assert_eq!(session.duration(), None);
        session.started = Some(1_700_000_000);
        session.stopped = Some(1_700_000_120);
        assert_eq!(session.duration(), Some(120));
    }

    #[test]
    fn test_snapshot_and_clear() {
        let store = SessionStore::new();
        store.add(Session::new("a", "10.0.0.1")).unwrap();
        store.add(Session::new("b", "10.0.0.1")).unwrap();

        let mut sids: Vec<_> = store
            .snapshot()
            .into_iter()
            .map(|session| session.sid)
            .collect();
        sids.sort();
        assert_eq!(sids, vec!["a", "b"]);

        store.clear();
        assert!(store.is_empty());
    }
}
