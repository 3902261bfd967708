use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;
use warble_types::models::{SessionHandle, SessionState, UserId};

use crate::error::{Result, StoreError};

/// Narrow view onto the web layer's session storage: the identity layer
/// only ever reads or writes the user id and the login flag.
pub trait SessionSlots: Send + Sync {
    fn read(&self, handle: SessionHandle) -> SessionState;

    /// Writing the default state releases the slot.
    fn write(&self, handle: SessionHandle, state: SessionState);
}

/// Default lifetime of a session slot.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct Slot {
    state: SessionState,
    expires_at: Instant,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local slot table keyed by session handle. A slot expires `ttl`
/// after it was last written; expired slots read as logged out and are
/// swept on the next write.
pub struct MemorySessions {
    slots: RwLock<HashMap<SessionHandle, Slot>>,
    ttl: Duration,
}

impl Default for MemorySessions {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Each write is a single insert or remove plus a sweep, so a poisoned map is still consistent.
impl SessionSlots for MemorySessions {
    fn read(&self, handle: SessionHandle) -> SessionState {
        let now = Instant::now();
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.state)
            .unwrap_or_default()
    }

    fn write(&self, handle: SessionHandle, state: SessionState) {
        let now = Instant::now();
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);

        let before = slots.len();
        slots.retain(|_, slot| slot.is_live(now));
        if slots.len() < before {
            debug!(expired = before - slots.len(), "Swept expired sessions");
        }

        if state == SessionState::default() {
            slots.remove(&handle);
        } else {
            slots.insert(
                handle,
                Slot {
                    state,
                    expires_at: now + self.ttl,
                },
            );
        }
    }
}

/// Binds session handles to user ids.
pub struct SessionBinder<S> {
    slots: S,
}

impl<S: SessionSlots> SessionBinder<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn bind(&self, handle: SessionHandle, user_id: UserId) {
        self.slots.write(
            handle,
            SessionState {
                user_id: Some(user_id),
                logged_in: true,
            },
        );
        debug!(session = %handle, user_id, "Session bound");
    }

    pub fn unbind(&self, handle: SessionHandle) {
        self.slots.write(handle, SessionState::default());
        debug!(session = %handle, "Session unbound");
    }

    pub fn resolve(&self, handle: SessionHandle) -> Option<UserId> {
        self.slots.read(handle).user_id
    }

    pub fn require_authenticated(&self, handle: SessionHandle) -> Result<UserId> {
        match self.slots.read(handle) {
            SessionState {
                user_id: Some(id),
                logged_in: true,
            } => Ok(id),
            _ => Err(StoreError::NotAuthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_then_resolve() {
        let binder = SessionBinder::new(MemorySessions::new());
        let handle = SessionHandle::new();

        assert_eq!(binder.resolve(handle), None);
        binder.bind(handle, 3);
        assert_eq!(binder.resolve(handle), Some(3));
        assert_eq!(binder.require_authenticated(handle).unwrap(), 3);
    }

    #[test]
    fn unbind_clears_identity_and_slot() {
        let binder = SessionBinder::new(MemorySessions::new());
        let handle = SessionHandle::new();
        binder.bind(handle, 3);
        assert_eq!(binder.slots().len(), 1);

        binder.unbind(handle);
        assert_eq!(binder.resolve(handle), None);
        assert!(matches!(
            binder.require_authenticated(handle),
            Err(StoreError::NotAuthenticated)
        ));
        assert!(binder.slots().is_empty());
    }

    #[test]
    fn logged_out_flag_blocks_access() {
        let binder = SessionBinder::new(MemorySessions::new());
        let handle = SessionHandle::new();
        binder.slots().write(
            handle,
            SessionState {
                user_id: Some(9),
                logged_in: false,
            },
        );

        assert_eq!(binder.resolve(handle), Some(9));
        assert!(binder.require_authenticated(handle).is_err());
    }

    #[test]
    fn expired_session_is_not_authenticated() {
        let binder = SessionBinder::new(MemorySessions::with_ttl(Duration::ZERO));
        let handle = SessionHandle::new();
        binder.bind(handle, 4);

        assert_eq!(binder.resolve(handle), None);
        assert!(matches!(
            binder.require_authenticated(handle),
            Err(StoreError::NotAuthenticated)
        ));
        assert!(binder.slots().is_empty());
    }

    #[test]
    fn writes_sweep_expired_slots() {
        let sessions = MemorySessions::with_ttl(Duration::ZERO);
        for user_id in 0..5 {
            sessions.write(
                SessionHandle::new(),
                SessionState {
                    user_id: Some(user_id),
                    logged_in: true,
                },
            );
        }

        // Only the slot just written can be left in the map
        assert!(sessions.slots.read().unwrap().len() <= 1);
    }

    #[test]
    fn live_session_survives_within_ttl() {
        let binder = SessionBinder::new(MemorySessions::with_ttl(Duration::from_secs(60)));
        let handle = SessionHandle::new();
        binder.bind(handle, 4);

        assert_eq!(binder.slots().ttl(), Duration::from_secs(60));
        assert_eq!(binder.require_authenticated(handle).unwrap(), 4);
    }

    #[test]
    fn sessions_are_independent() {
        let binder = SessionBinder::new(MemorySessions::new());
        let (a, b) = (SessionHandle::new(), SessionHandle::new());
        binder.bind(a, 1);
        binder.bind(b, 2);
        binder.unbind(a);

        assert_eq!(binder.resolve(a), None);
        assert_eq!(binder.resolve(b), Some(2));
    }
}
