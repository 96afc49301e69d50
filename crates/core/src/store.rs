use std::{collections::HashMap, sync::Arc};

use nemia_shared::Turn;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
  Facts, Session,
  persistence::{PersistError, SessionPersistence, Snapshot},
};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("session {0} not found")]
  NotFound(String),
}

/// Held while a request mutates one session. Requests for other sessions
/// are not blocked.
pub type SessionGuard = OwnedMutexGuard<()>;

/// In-memory session map mirrored to a [`SessionPersistence`] adapter.
///
/// Entries are created lazily and never removed.
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Session>>,
  locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
  persistence: Arc<dyn SessionPersistence>,
  flush_lock: Mutex<()>,
}

impl SessionStore {
  pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
    Self::with_sessions(persistence, HashMap::new())
  }

  fn with_sessions(
    persistence: Arc<dyn SessionPersistence>,
    sessions: HashMap<String, Session>,
  ) -> Self {
    Self {
      sessions: RwLock::new(sessions),
      locks: Mutex::new(HashMap::new()),
      persistence,
      flush_lock: Mutex::new(()),
    }
  }

  /// Build the store from whatever the adapter holds.
  pub async fn load(persistence: Arc<dyn SessionPersistence>) -> Result<Self, PersistError> {
    let snapshot = persistence.load().await?;
    tracing::info!(sessions = snapshot.len(), "loaded sessions");
    Ok(Self::with_sessions(persistence, snapshot.into_iter().collect()))
  }

  /// Wait for exclusive mutation rights on `id`.
  pub async fn lock(&self, id: &str) -> SessionGuard {
    let lock = {
      let mut locks = self.locks.lock().await;
      Arc::clone(locks.entry(id.to_owned()).or_default())
    };
    lock.lock_owned().await
  }

  #[cfg(test)]
  pub(crate) async fn lock_count(&self) -> usize {
    self.locks.lock().await.len()
  }

  pub async fn get_or_create(&self, id: &str) -> Session {
    let mut sessions = self.sessions.write().await;
    sessions.entry(id.to_owned()).or_default().clone()
  }

  pub async fn get(&self, id: &str) -> Option<Session> {
    self.sessions.read().await.get(id).cloned()
  }

  pub async fn contains(&self, id: &str) -> bool {
    self.sessions.read().await.contains_key(id)
  }

  /// History of a known session. Never creates one.
  pub async fn history(&self, id: &str) -> Option<Vec<Turn>> {
    self
      .sessions
      .read()
      .await
      .get(id)
      .map(|session| session.history.clone())
  }

  /// Merge extracted identity into the session and return the result.
  pub async fn remember(&self, id: &str, name: Option<String>, facts: Facts) -> Session {
    let mut sessions = self.sessions.write().await;
    let session = sessions.entry(id.to_owned()).or_default();
    session.remember(name, facts);
    session.clone()
  }

  /// Append the user entry and then the bot entry in one step.
  pub async fn apply_turn(&self, id: &str, user_text: &str, bot_text: &str) {
    let mut sessions = self.sessions.write().await;
    sessions
      .entry(id.to_owned())
      .or_default()
      .push_turn(user_text, bot_text);
  }

  /// Clear history, keeping name and facts. Unknown ids are left untouched.
  pub async fn reset(&self, id: &str) -> Result<Session, StoreError> {
    let mut sessions = self.sessions.write().await;
    let session = sessions
      .get_mut(id)
      .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
    session.clear_history();
    Ok(session.clone())
  }

  pub async fn snapshot(&self) -> Snapshot {
    self
      .sessions
      .read()
      .await
      .iter()
      .map(|(id, session)| (id.clone(), session.clone()))
      .collect()
  }

  /// Write the full state through the adapter.
  ///
  /// Failures are logged only; in-memory state stays authoritative until
  /// the next successful flush.
  pub async fn flush(&self) {
    let _guard = self.flush_lock.lock().await;
    let snapshot = self.snapshot().await;

    match self.persistence.save(&snapshot).await {
      Ok(()) => tracing::debug!(sessions = snapshot.len(), "sessions saved"),
      Err(err) => tracing::error!("failed to save sessions: {err}"),
    }
  }
}
