//! In-memory session store. Nothing here is ever written to disk or sent anywhere.
//!
//! Handlers `get` an owned copy, drive it through one event, then either `replace` it
//! or `clear` it once the interview is over. Sessions left untouched for longer than
//! the idle timeout are evicted, on access and by a periodic sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::interview::session::SessionState;

/// Upper bound on how long an abandoned session can wait for the sweep.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct Entry {
    session: SessionState,
    touched: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Inserts or replaces the session under its own id.
    pub async fn put(&self, session: SessionState) {
        let entry = Entry {
            touched: Instant::now(),
            session,
        };
        self.sessions
            .write()
            .await
            .insert(entry.session.id(), entry);
    }

    /// Writes the session back only if it is still held.
    /// Returns false when it was cleared or evicted in the meantime.
    pub async fn replace(&self, session: SessionState) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id()) {
            Some(entry) => {
                entry.session = session;
                entry.touched = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the session and marks it as active.
    /// An idle session is evicted instead.
    pub async fn get(&self, session_id: Uuid) -> Option<SessionState> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&session_id)?;
        if entry.touched.elapsed() >= self.idle_timeout {
            sessions.remove(&session_id);
            info!("Session {} evicted after idling", session_id);
            return None;
        }
        entry.touched = Instant::now();
        Some(entry.session.clone())
    }

    /// Drops the session. Returns whether it existed.
    pub async fn clear(&self, session_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&session_id).is_some();
        if removed {
            debug!("Session {} cleared from memory", session_id);
        }
        removed
    }

    /// Drops every session, returning how many were held.
    pub async fn clear_all(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Drops every session idle for at least the timeout, returning how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched.elapsed() < self.idle_timeout);
        before - sessions.len()
    }

    /// Spawns the background task that periodically evicts idle sessions.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let store = self.clone();
        let period = self.idle_timeout.min(MAX_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
