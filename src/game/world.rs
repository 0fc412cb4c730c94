//! World model collaborator
//!
//! The engine only ever queries the world; it never mutates it. A world is
//! fixed for the duration of one episode and swapped out on `start_game`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Terrain theme identifier carried through snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    #[default]
    Grasslands,
    Forest,
    Desert,
    Maze,
    Snowy,
    Hellscape,
}

/// Integer grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub x: i32,
    pub y: i32,
}

impl GridIndex {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Queries the engine makes against the world
pub trait WorldModel {
    /// Width in grid units
    fn width(&self) -> u32;

    /// Height in grid units
    fn height(&self) -> u32;

    /// True for obstacle cells and for anything outside the grid
    fn is_blocked(&self, x: i32, y: i32) -> bool;

    /// True if any obstacle lies strictly closer than `radius`
    fn is_near_obstacle(&self, x: i32, y: i32, radius: f32) -> bool;

    fn terrain(&self) -> TerrainType;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i32 && y < self.height() as i32
    }
}

/// Description of a world to build for one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    pub terrain: TerrainType,
    pub obstacles: Vec<GridIndex>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(80, 120)
    }
}

impl WorldConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            terrain: TerrainType::default(),
            obstacles: Vec::new(),
        }
    }

    pub fn with_terrain(mut self, terrain: TerrainType) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = GridIndex>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    /// Scatter `count` single-cell rocks at random.
    ///
    /// The row the snake starts on is left clear so a fresh game never opens
    /// facing a wall.
    pub fn scatter_obstacles<R: Rng + ?Sized>(mut self, count: usize, rng: &mut R) -> Self {
        if self.width == 0 || self.height == 0 {
            return self;
        }
        let spawn_row = (self.height / 2) as i32;
        let mut placed: HashSet<GridIndex> = self.obstacles.iter().copied().collect();
        let max_tries = count.saturating_mul(20);

        let mut tries = 0;
        let mut added = 0;
        while added < count && tries < max_tries {
            tries += 1;
            let cell = GridIndex::new(
                rng.gen_range(0..self.width as i32),
                rng.gen_range(0..self.height as i32),
            );
            if (cell.y - spawn_row).abs() <= 1 || !placed.insert(cell) {
                continue;
            }
            self.obstacles.push(cell);
            added += 1;
        }
        self
    }
}

/// Hash-set backed world
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: u32,
    height: u32,
    terrain: TerrainType,
    obstacles: HashSet<GridIndex>,
}

impl GridWorld {
    pub fn obstacles(&self) -> impl Iterator<Item = &GridIndex> {
        self.obstacles.iter()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        WorldConfig::default().into()
    }
}

impl From<WorldConfig> for GridWorld {
    fn from(config: WorldConfig) -> Self {
        let obstacles = config
            .obstacles
            .into_iter()
            .filter(|c| {
                c.x >= 0 && c.y >= 0 && c.x < config.width as i32 && c.y < config.height as i32
            })
            .collect();
        Self {
            width: config.width,
            height: config.height,
            terrain: config.terrain,
            obstacles,
        }
    }
}

impl WorldModel for GridWorld {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_blocked(&self, x: i32, y: i32) -> bool {
        !self.in_bounds(x, y) || self.obstacles.contains(&GridIndex::new(x, y))
    }

    fn is_near_obstacle(&self, x: i32, y: i32, radius: f32) -> bool {
        // Only cells inside the radius box can qualify
        let reach = radius.ceil().max(0.0) as i32;
        if self.obstacles.len() < ((2 * reach + 1) * (2 * reach + 1)) as usize {
            return self.obstacles.iter().any(|o| {
                let dx = (o.x - x) as f32;
                let dy = (o.y - y) as f32;
                dx.hypot(dy) < radius
            });
        }
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if (dx as f32).hypot(dy as f32) < radius
                    && self.obstacles.contains(&GridIndex::new(x + dx, y + dy))
                {
                    return true;
                }
            }
        }
        false
    }

    fn terrain(&self) -> TerrainType {
        self.terrain
    }
}
