//! Serializable picture of an in-progress game
//!
//! Snapshots are versioned with a plain integer. Anything that does not carry
//! the current version is rejected rather than migrated.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::game::{Camera, Direction, Food, Position, TerrainType};

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Schema version for compatibility checking
    pub version: u32,
    pub score: u32,
    /// Segments, head first
    pub segments: Vec<Position>,
    pub food: Vec<Food>,
    pub direction: Direction,
    /// Game time in seconds
    pub elapsed_secs: f64,
    /// Pixels per tile at save time
    pub grid_size: u32,
    pub world_width: u32,
    pub world_height: u32,
    pub camera: Camera,
    pub terrain: TerrainType,
}

impl GameSnapshot {
    /// Check the snapshot is something the engine can resume from
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.version == SNAPSHOT_VERSION,
            "unsupported snapshot version {} (expected {})",
            self.version,
            SNAPSHOT_VERSION
        );
        ensure!(!self.segments.is_empty(), "snapshot has no segments");
        ensure!(
            self.world_width > 0 && self.world_height > 0,
            "snapshot world is empty"
        );
        ensure!(
            self.elapsed_secs.is_finite() && self.elapsed_secs >= 0.0,
            "snapshot elapsed time is invalid"
        );
        ensure!(
            self.camera.x.is_finite() && self.camera.y.is_finite(),
            "snapshot camera is not finite"
        );

        let in_world = |p: &Position| {
            p.is_finite()
                && p.x >= 0.0
                && p.y >= 0.0
                && p.x < self.world_width as f32
                && p.y < self.world_height as f32
        };
        if let Some(bad) = self.segments.iter().find(|p| !in_world(p)) {
            bail!("snapshot segment {:?} lies outside the world", bad);
        }
        if let Some(bad) = self.food.iter().find(|f| !in_world(&f.position)) {
            bail!("snapshot food {:?} lies outside the world", bad.position);
        }
        Ok(())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize snapshot")
    }

    /// Parse and validate a snapshot.
    ///
    /// The version is checked before the full schema so an old save reports
    /// a version mismatch instead of a confusing field error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("Snapshot is not valid JSON")?;
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .context("Snapshot has no version field")?;
        ensure!(
            version == u64::from(SNAPSHOT_VERSION),
            "unsupported snapshot version {} (expected {})",
            version,
            SNAPSHOT_VERSION
        );

        let snapshot: GameSnapshot =
            serde_json::from_value(value).context("Failed to deserialize snapshot")?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
