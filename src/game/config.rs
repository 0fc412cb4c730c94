use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the simulation core
///
/// Every tunable the engine reads lives here so a JSON override file can
/// adjust feel without recompiling. Distances are in grid units, times in
/// milliseconds unless a field says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the world in grid units
    pub world_width: u32,
    /// Height of the world in grid units
    pub world_height: u32,
    /// Pixels per tile, used to derive the viewport from canvas size
    pub grid_size: u32,
    /// Visible width in grid units
    pub viewport_width: u32,
    /// Visible height in grid units
    pub viewport_height: u32,
    /// Number of segments the snake starts with
    pub initial_snake_length: usize,

    // Movement
    /// Base head speed in grid units per second
    pub base_speed: f32,
    /// Multiplier while turbo is held
    pub turbo_multiplier: f32,
    /// Multiplier during the slow window after turbo release
    pub slow_multiplier: f32,
    /// Length of the slow window
    pub slow_duration_ms: f32,
    /// Distance from a grid cell within which a queued turn commits
    pub turn_epsilon: f32,
    /// Arc length between consecutive body segments
    pub segment_spacing: f32,
    /// Upper bound for a single tick's delta
    pub max_delta_ms: f32,
    /// Minimum arc length between recorded trail points
    pub trail_step: f32,
    /// Extra trail points kept beyond what the longest snake needs
    pub path_margin: usize,

    // Collision
    /// Head-to-food distance that counts as eating
    pub consumption_radius: f32,
    /// Head-to-body distance that counts as a self hit
    pub self_collision_radius: f32,
    /// Leading segments ignored by the self-collision test
    pub self_collision_skip: usize,

    // Camera
    /// Per-frame interpolation factor at the reference frame rate
    pub camera_smoothing: f32,
    /// Frame rate the smoothing factor was tuned at
    pub camera_reference_fps: f32,

    // Food
    /// Strict placement attempts before the fallback scan
    pub food_spawn_attempts: usize,
    /// Minimum distance between food and any obstacle
    pub food_obstacle_clearance: f32,
    pub normal_food_value: u32,
    pub golden_food_chance: f64,
    pub golden_food_value: u32,
    pub special_food_chance: f64,
    pub special_food_value: u32,
    /// Chance that a spawn places one more item
    pub extra_food_chance: f64,
    /// Hard cap on simultaneous food items
    pub max_food_items: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 80,
            world_height: 120,
            grid_size: 16,
            viewport_width: 20,
            viewport_height: 30,
            initial_snake_length: 3,
            base_speed: 4.0,
            turbo_multiplier: 2.0,
            slow_multiplier: 0.5,
            slow_duration_ms: 400.0,
            turn_epsilon: 0.1,
            segment_spacing: 1.0,
            max_delta_ms: 250.0,
            trail_step: 0.25,
            path_margin: 128,
            consumption_radius: 0.4,
            self_collision_radius: 0.4,
            self_collision_skip: 3,
            camera_smoothing: 0.1,
            camera_reference_fps: 60.0,
            food_spawn_attempts: 100,
            food_obstacle_clearance: 2.0,
            normal_food_value: 1,
            golden_food_chance: 0.1,
            golden_food_value: 5,
            special_food_chance: 0.0,
            special_food_value: 10,
            extra_food_chance: 0.1,
            max_food_items: 5,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom world size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            world_width: width,
            world_height: height,
            ..Default::default()
        }
    }

    /// Create a small world for testing
    pub fn small() -> Self {
        Self::new(20, 20)
    }

    /// Create a large world
    pub fn large() -> Self {
        Self::new(160, 240)
    }

    /// Load a JSON override file; missing fields fall back to defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to parse game config")?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid game config {:?}: {}", path, e))?;
        Ok(config)
    }

    /// Number of trail points the snake keeps in a world of the given size.
    ///
    /// Enough to cover a snake filling every cell: one point per `trail_step`
    /// of its arc length plus one corner per cell.
    pub fn path_capacity(&self, world_width: u32, world_height: u32) -> usize {
        let cells = (world_width as usize) * (world_height as usize);
        let ratio = (self.segment_spacing / self.trail_step).ceil();
        let points_per_segment = if ratio.is_finite() && ratio >= 1.0 {
            ratio as usize
        } else {
            1
        };
        cells * (points_per_segment + 1) + self.path_margin
    }

    /// Validate configuration parameters
    ///
    /// Returns `Err` with a message naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), String> {
        if self.world_width == 0 || self.world_height == 0 {
            return Err(format!(
                "world must be non-empty, got {}x{}",
                self.world_width, self.world_height
            ));
        }
        if self.grid_size == 0 {
            return Err("grid_size must be positive".to_string());
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            ));
        }
        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }
        if self.initial_snake_length as u32 > self.world_width / 2 {
            return Err(format!(
                "initial_snake_length {} does not fit in a world {} wide",
                self.initial_snake_length, self.world_width
            ));
        }

        let positive = [
            ("base_speed", self.base_speed),
            ("turbo_multiplier", self.turbo_multiplier),
            ("slow_multiplier", self.slow_multiplier),
            ("turn_epsilon", self.turn_epsilon),
            ("segment_spacing", self.segment_spacing),
            ("trail_step", self.trail_step),
            ("max_delta_ms", self.max_delta_ms),
            ("consumption_radius", self.consumption_radius),
            ("self_collision_radius", self.self_collision_radius),
            ("camera_reference_fps", self.camera_reference_fps),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }

        if !(self.slow_duration_ms.is_finite() && self.slow_duration_ms >= 0.0) {
            return Err(format!(
                "slow_duration_ms must be non-negative, got {}",
                self.slow_duration_ms
            ));
        }
        if self.trail_step > self.segment_spacing {
            return Err(format!(
                "trail_step {} must not exceed segment_spacing {}",
                self.trail_step, self.segment_spacing
            ));
        }
        if self.turn_epsilon >= 0.5 {
            return Err(format!(
                "turn_epsilon must be below 0.5, got {}",
                self.turn_epsilon
            ));
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(format!(
                "camera_smoothing must be in (0, 1], got {}",
                self.camera_smoothing
            ));
        }

        let chances = [
            ("golden_food_chance", self.golden_food_chance),
            ("special_food_chance", self.special_food_chance),
            ("extra_food_chance", self.extra_food_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }
        if self.golden_food_chance + self.special_food_chance > 1.0 {
            return Err("golden and special chances must sum to at most 1".to_string());
        }
        if self.max_food_items == 0 {
            return Err("max_food_items must be at least 1".to_string());
        }

        Ok(())
    }
}
