//! Live wizard sessions, keyed by an opaque session id.
//!
//! Sessions are created when the wizard starts and removed on abandon or a
//! successful submission. Each one sits behind its own mutex, so requests
//! against the same session are serialized while different sessions proceed
//! independently. Idle sessions are swept whenever a new one is created.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tutorhub_core::wizard::session::WizardSession;
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<WizardSession>>;

pub struct WizardRegistry {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    ttl: chrono::Duration,
}

impl WizardRegistry {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a new session, sweeping idle ones first.
    pub async fn insert(&self, session: WizardSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.write().await;
        let swept = sweep_expired(&mut sessions, self.ttl);
        if swept > 0 {
            tracing::info!(swept, "Expired wizard sessions removed");
        }
        sessions.insert(id, Arc::clone(&shared));
        shared
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session. Returns `false` if it was not registered.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Remove sessions idle for longer than `ttl`. A session that is locked is
/// in use and is kept.
fn sweep_expired(sessions: &mut HashMap<Uuid, SharedSession>, ttl: chrono::Duration) -> usize {
    let now = Utc::now();
    let before = sessions.len();
    sessions.retain(|_, session| match session.try_lock() {
        Ok(guard) => !guard.is_expired(now, ttl),
        Err(_) => true,
    });
    before - sessions.len()
}
