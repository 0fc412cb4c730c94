use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::snapshot::GameSnapshot;

/// Where in-progress games are parked between sessions
///
/// `load` never fails: a missing, corrupted or outdated snapshot is reported
/// as `None` so the caller simply starts a fresh game.
pub trait SnapshotStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<()>;

    fn load(&mut self) -> Option<GameSnapshot>;

    fn clear(&mut self) -> Result<()>;
}

/// Snapshot kept as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let json = snapshot.to_json()?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write snapshot to {:?}", self.path))?;
        Ok(())
    }

    fn load(&mut self) -> Option<GameSnapshot> {
        if !self.path.exists() {
            return None;
        }

        let parsed = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot from {:?}", self.path))
            .and_then(|json| GameSnapshot::from_json(&json));

        match parsed {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(
                    path = ?self.path,
                    error = %format!("{:#}", err),
                    "discarding unusable snapshot"
                );
                if let Err(err) = self.clear() {
                    warn!(error = %format!("{:#}", err), "failed to remove unusable snapshot");
                }
                None
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove snapshot {:?}", self.path))?;
        }
        Ok(())
    }
}

/// In-process store; keeps the serialized form so loads go through the same
/// validation as the file store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored text, as if written by an earlier session
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.json.is_none()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        self.json = Some(snapshot.to_json()?);
        Ok(())
    }

    fn load(&mut self) -> Option<GameSnapshot> {
        let json = self.json.as_deref()?;
        match GameSnapshot::from_json(json) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %format!("{:#}", err), "discarding unusable snapshot");
                self.json = None;
                None
            }
        }
    }

    fn clear(&mut self) -> Result<()> {
        self.json = None;
        Ok(())
    }
}
