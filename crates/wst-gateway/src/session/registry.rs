//! Registry of live tunnel sessions

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use wst_core::{SessionId, SessionState};

/// Tracks every tunnel session that has not yet closed
pub struct SessionRegistry {
    /// Sessions indexed by session ID
    sessions: DashMap<SessionId, Arc<SessionHandle>>,
    /// Next session ID to allocate
    next_id: AtomicU64,
}

/// Shared view of one tunnel session
pub struct SessionHandle {
    /// Session ID
    pub id: SessionId,
    /// Browser peer address
    pub peer: SocketAddr,
    /// When the upgrade request arrived
    pub started_at: Instant,
    state: AtomicU8,
}

impl SessionHandle {
    fn new(id: SessionId, peer: SocketAddr) -> Self {
        Self {
            id,
            peer,
            started_at: Instant::now(),
            state: AtomicU8::new(SessionState::Connecting as u8),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst)).unwrap_or(SessionState::Closed)
    }

    /// Move to `next`; backwards or repeated transitions are ignored
    ///
    /// Returns whether the state changed.
    pub fn advance(&self, next: SessionState) -> bool {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            let Some(state) = SessionState::from_u8(current) else {
                return false;
            };
            if !state.can_advance_to(next) {
                return false;
            }
            match self.state.compare_exchange(
                current,
                next as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    tracing::debug!(session = %self.id, from = %state, to = %next, "Session state changed");
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }
}

/// Deregisters its session when dropped
pub struct SessionGuard {
    handle: Arc<SessionHandle>,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    /// The guarded session
    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    /// Session ID
    pub fn id(&self) -> SessionId {
        self.handle.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.handle.advance(SessionState::Closed);
        self.registry.sessions.remove(&self.handle.id);
        tracing::debug!(
            session = %self.handle.id,
            live = self.registry.len(),
            "Session deregistered"
        );
    }
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new session unless `limit` sessions are already live
    pub fn try_register(
        self: &Arc<Self>,
        peer: SocketAddr,
        limit: Option<usize>,
    ) -> Option<SessionGuard> {
        if let Some(limit) = limit {
            if self.sessions.len() >= limit {
                return None;
            }
        }

        let id = SessionId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let handle = Arc::new(SessionHandle::new(id, peer));
        self.sessions.insert(id, Arc::clone(&handle));

        Some(SessionGuard {
            handle,
            registry: Arc::clone(self),
        })
    }

    /// Get a session by ID
    pub fn get(&self, id: SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.get(&id).map(|r| Arc::clone(&r))
    }

    /// List all live sessions
    pub fn list(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.iter().map(|r| Arc::clone(&r)).collect()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
