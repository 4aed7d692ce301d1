//! services/portal/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory session stores
//! that hold course viewers and roster composers between requests.

use crate::adapters::{RestApiAdapter, RosterImageRenderer};
use crate::config::Config;
use crate::web::middleware::AccessToken;
use ministry_core::{CourseViewer, RosterComposer};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Unauthenticated client; handlers derive per-caller clients from it.
    pub api: RestApiAdapter,
    pub renderer: Arc<RosterImageRenderer>,
    pub viewers: Arc<SessionStore<ViewerSession>>,
    pub rosters: Arc<SessionStore<RosterComposer>>,
}

//=========================================================================================
// Per-Session State
//=========================================================================================

/// A course viewer together with the client authorised for its owner.
pub struct ViewerSession {
    pub viewer: CourseViewer,
    pub api: RestApiAdapter,
}

/// Why a session could not be handed out.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionAccess {
    NotFound,
    /// The session was opened with a different bearer token.
    Forbidden,
    /// Another request on the same session has not finished yet.
    Busy,
}

struct Entry<T> {
    owner: String,
    last_access: std::sync::Mutex<Instant>,
    value: Arc<Mutex<T>>,
}

impl<T> Entry<T> {
    fn idle_for(&self, now: Instant) -> Duration {
        let last = *self
            .last_access
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        now.saturating_duration_since(last)
    }

    fn touch(&self) {
        *self
            .last_access
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }
}

/// Ephemeral sessions keyed by id. Each session is behind its own lock so a
/// slow remote call only blocks requests for that session, and each one is
/// bound to the token that opened it.
pub struct SessionStore<T> {
    sessions: RwLock<HashMap<Uuid, Entry<T>>>,
}

impl<T> Default for SessionStore<T> {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> SessionStore<T> {
    pub fn insert(&self, owner: &AccessToken, value: T) -> Uuid {
        let id = Uuid::new_v4();
        let entry = Entry {
            owner: owner.0.clone(),
            last_access: std::sync::Mutex::new(Instant::now()),
            value: Arc::new(Mutex::new(value)),
        };
        self.write().insert(id, entry);
        id
    }

    /// Locks a session without waiting. A session already in use is reported
    /// as `Busy` instead of queueing a second mutation behind the first.
    pub fn try_acquire(
        &self,
        id: Uuid,
        caller: &AccessToken,
    ) -> Result<OwnedMutexGuard<T>, SessionAccess> {
        let session = {
            let sessions = self
                .sessions
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let entry = sessions.get(&id).ok_or(SessionAccess::NotFound)?;
            if entry.owner != caller.0 {
                return Err(SessionAccess::Forbidden);
            }
            entry.touch();
            entry.value.clone()
        };
        session.try_lock_owned().map_err(|_| SessionAccess::Busy)
    }

    pub fn remove(&self, id: Uuid, caller: &AccessToken) -> Result<(), SessionAccess> {
        let mut sessions = self.write();
        let entry = sessions.get(&id).ok_or(SessionAccess::NotFound)?;
        if entry.owner != caller.0 {
            return Err(SessionAccess::Forbidden);
        }
        sessions.remove(&id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Drops sessions idle for at least `max_idle`. A session whose lock is
    /// held by a running request is kept. Returns how many were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.idle_for(now) < max_idle || entry.value.try_lock().is_err()
        });
        before - sessions.len()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Entry<T>>> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//=========================================================================================
// Idle Session Sweeper
//=========================================================================================

/// Periodically drops viewer and roster sessions that have been idle longer
/// than the configured timeout.
pub fn spawn_session_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let max_idle = state.config.session_idle_timeout;
    let period = (max_idle / 4).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let viewers = state.viewers.evict_idle(max_idle);
            let rosters = state.rosters.evict_idle(max_idle);
            if viewers + rosters > 0 {
                info!(
                    viewers,
                    rosters,
                    open_viewers = state.viewers.len(),
                    open_rosters = state.rosters.len(),
                    "Evicted idle sessions"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> AccessToken {
        AccessToken(value.to_string())
    }

    #[tokio::test]
    async fn concurrent_use_of_one_session_is_reported_busy() {
        let store = SessionStore::default();
        let owner = token("owner");
        let id = store.insert(&owner, RosterComposer::new("Obreiros"));

        let guard = store.try_acquire(id, &owner).unwrap();
        assert_eq!(store.try_acquire(id, &owner).err(), Some(SessionAccess::Busy));
        drop(guard);

        assert!(store.try_acquire(id, &owner).is_ok());
    }

    #[tokio::test]
    async fn removed_sessions_are_not_found() {
        let store = SessionStore::default();
        let owner = token("owner");
        let id = store.insert(&owner, RosterComposer::new("Obreiros"));
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(id, &owner), Ok(()));
        assert_eq!(store.remove(id, &owner), Err(SessionAccess::NotFound));
        assert_eq!(store.try_acquire(id, &owner).err(), Some(SessionAccess::NotFound));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn other_tokens_cannot_use_or_close_a_session() {
        let store = SessionStore::default();
        let id = store.insert(&token("owner"), RosterComposer::new("Obreiros"));
        let stranger = token("x");

        assert_eq!(store.try_acquire(id, &stranger).err(), Some(SessionAccess::Forbidden));
        assert_eq!(store.remove(id, &stranger), Err(SessionAccess::Forbidden));
        assert_eq!(store.len(), 1);
        assert!(store.try_acquire(id, &token("owner")).is_ok());
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let store = SessionStore::default();
        let owner = token("owner");
        let id = store.insert(&owner, RosterComposer::new("Obreiros"));

        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 1);

        assert_eq!(store.evict_idle(Duration::ZERO), 1);
        assert_eq!(store.try_acquire(id, &owner).err(), Some(SessionAccess::NotFound));
    }

    #[tokio::test]
    async fn sessions_in_use_survive_eviction() {
        let store = SessionStore::default();
        let owner = token("owner");
        let id = store.insert(&owner, RosterComposer::new("Obreiros"));

        let guard = store.try_acquire(id, &owner).unwrap();
        assert_eq!(store.evict_idle(Duration::ZERO), 0);
        drop(guard);
        assert_eq!(store.evict_idle(Duration::ZERO), 1);
    }
}
