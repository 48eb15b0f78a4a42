//! Session Management
//!
//! Per-session state holders. Every interactive session owns exactly one
//! state value; nothing is shared between sessions, and actions inside one
//! session are serialized through its own async mutex.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{LlmError, Result};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A session and the state it carries
#[derive(Clone, Debug)]
pub struct Session<S> {
    /// Unique identifier
    pub id: SessionId,

    /// Domain state owned by this session
    pub state: S,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl<S: Default> Session<S> {
    /// Create a new session with fresh state
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: S::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<S: Default> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Session<S> {
    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Shared handle to one session; lock it for the whole duration of an action.
pub type SessionHandle<S> = Arc<Mutex<Session<S>>>;

/// In-memory session store, strictly partitioned by session ID
pub struct MemorySessionStore<S> {
    sessions: RwLock<HashMap<SessionId, SessionHandle<S>>>,
}

impl<S: Default> Default for MemorySessionStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Default> MemorySessionStore<S> {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session with default state
    pub fn create(&self) -> Result<(SessionId, SessionHandle<S>)> {
        let session = Session::<S>::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.insert(id.clone(), Arc::clone(&handle));
        tracing::debug!(session = %id, "Session created");

        Ok((id, handle))
    }

    /// Look up a session handle
    pub fn get(&self, id: &SessionId) -> Result<SessionHandle<S>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| LlmError::SessionNotFound(id.to_string()))
    }

    /// End a session; returns whether it existed
    pub fn remove(&self, id: &SessionId) -> Result<bool> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let existed = sessions.remove(id).is_some();
        if existed {
            tracing::debug!(session = %id, "Session removed");
        }
        Ok(existed)
    }

    /// Drop sessions idle for longer than `max_idle`; returns how many went
    ///
    /// A session whose lock is held is mid-action and always kept.
    pub fn sweep_idle(&self, max_idle: Duration) -> Result<usize> {
        let max_idle = chrono::Duration::from_std(max_idle)
            .map_err(|_| LlmError::Session("idle limit out of range".into()))?;
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let before = sessions.len();

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.updated_at >= cutoff,
            Err(_) => true,
        });

        let swept = before - sessions.len();
        if swept > 0 {
            tracing::info!(swept, remaining = sessions.len(), "Idle sessions expired");
        }
        Ok(swept)
    }

    /// Number of live sessions
    pub fn len(&self) -> Result<usize> {
        Ok(self.sessions.read().map_err(|_| poisoned())?.len())
    }

    /// Check if empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> LlmError {
    LlmError::Session("session map lock poisoned".into())
}
