//! Durable storage for the whole session map.
//!
//! The store hands over a full snapshot after every mutation; adapters
//! overwrite whatever they held before.

use std::{
  collections::BTreeMap,
  io,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};

use crate::Session;

pub type Snapshot = BTreeMap<String, Session>;

#[derive(Debug, Error)]
pub enum PersistError {
  #[error("IO error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionPersistence: Send + Sync {
  async fn load(&self) -> Result<Snapshot, PersistError>;

  async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Pretty-printed JSON document mapping session id to session.
///
/// Writes go to a sibling temp file which is synced and then renamed over
/// the target, so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  #[must_use]
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn temp_path(&self) -> PathBuf {
    let mut name = self
      .path
      .file_name()
      .map(|n| n.to_os_string())
      .unwrap_or_else(|| "sessions.json".into());
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

#[async_trait]
impl SessionPersistence for JsonFileStore {
  async fn load(&self) -> Result<Snapshot, PersistError> {
    let content = match fs::read_to_string(&self.path).await {
      Ok(content) => content,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::new()),
      Err(err) => return Err(err.into()),
    };

    if content.trim().is_empty() {
      return Ok(Snapshot::new());
    }

    Ok(serde_json::from_str(&content)?)
  }

  async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
    let content = serde_json::to_vec_pretty(snapshot)?;

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).await?;
    }

    let temp = self.temp_path();
    let mut file = fs::File::create(&temp).await?;
    file.write_all(&content).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp, &self.path).await?;
    Ok(())
  }
}

/// Keeps the last snapshot in memory. Used when nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
  snapshot: Mutex<Snapshot>,
}

impl MemoryPersistence {
  pub fn new(snapshot: Snapshot) -> Self {
    Self {
      snapshot: Mutex::new(snapshot),
    }
  }

  pub async fn snapshot(&self) -> Snapshot {
    self.snapshot.lock().await.clone()
  }
}

#[async_trait]
impl SessionPersistence for MemoryPersistence {
  async fn load(&self) -> Result<Snapshot, PersistError> {
    Ok(self.snapshot().await)
  }

  async fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
    *self.snapshot.lock().await = snapshot.clone();
    Ok(())
  }
}
