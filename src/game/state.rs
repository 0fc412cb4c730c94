use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::path::PathRecorder;
use super::world::GridIndex;

/// A continuous position in grid units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move `distance` units in a direction
    pub fn moved_in_direction(&self, direction: Direction, distance: f32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * distance, dy * distance)
    }

    pub fn distance(&self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(&self, other: Position, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Nearest grid cell
    pub fn rounded(&self) -> GridIndex {
        GridIndex::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// True if this position is in transit over `cell`
    pub fn touches_cell(&self, cell: GridIndex) -> bool {
        let xs = [self.x.floor() as i32, self.x.ceil() as i32];
        let ys = [self.y.floor() as i32, self.y.ceil() as i32];
        xs.contains(&cell.x) && ys.contains(&cell.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<GridIndex> for Position {
    fn from(cell: GridIndex) -> Self {
        Self::new(cell.x as f32, cell.y as f32)
    }
}

/// Kind of food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    Normal,
    Golden,
    Special,
}

/// A consumable food item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
    pub value: u32,
}

/// Camera position in grid units (top-left of the viewport)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
}

/// Game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// The snake: its segments and the trail they are sampled from
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub segments: Vec<Position>,
    /// Current direction of movement, `None` before the first game
    pub direction: Option<Direction>,
    /// Direction to take at the next grid-aligned point
    pub pending_direction: Option<Direction>,
    /// Recorded head trail
    pub path: PathRecorder,
}

impl Snake {
    /// Create a snake laid out straight behind `head`
    pub fn new(
        head: Position,
        direction: Direction,
        length: usize,
        spacing: f32,
        path_capacity: usize,
    ) -> Self {
        let (dx, dy) = direction.delta();
        let segments: Vec<Position> = (0..length.max(1))
            .map(|i| head.moved_by(-dx * spacing * i as f32, -dy * spacing * i as f32))
            .collect();
        let path = PathRecorder::seeded(path_capacity, &segments);

        Self {
            segments,
            direction: Some(direction),
            pending_direction: None,
            path,
        }
    }

    /// Rebuild a snake from persisted segments
    pub fn from_segments(
        segments: Vec<Position>,
        direction: Direction,
        path_capacity: usize,
    ) -> Self {
        let path = PathRecorder::seeded(path_capacity, &segments);
        Self {
            segments,
            direction: Some(direction),
            pending_direction: None,
            path,
        }
    }

    /// Placeholder used before the first game starts
    pub fn empty(path_capacity: usize) -> Self {
        Self {
            segments: Vec::new(),
            direction: None,
            pending_direction: None,
            path: PathRecorder::new(path_capacity),
        }
    }

    /// Get the head position
    pub fn head(&self) -> Option<Position> {
        self.segments.first().copied()
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Option<Position> {
        self.segments.last().copied()
    }

    /// Append a segment on top of the tail; the next layout pass spreads it out
    pub fn grow(&mut self) {
        if let Some(tail) = self.tail() {
            self.segments.push(tail);
        }
    }

    /// Check if any segment is over the cell
    pub fn occupies(&self, cell: GridIndex) -> bool {
        self.segments.iter().any(|s| s.touches_cell(cell))
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Type of collision that ended a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Head left the world
    Wall,
    /// Head entered a blocked cell
    Obstacle,
    /// Head hit its own body
    SelfCollision,
}

/// Complete mutable game state owned by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Vec<Food>,
    pub camera: Camera,
    pub status: GameStatus,
    pub score: u32,
    /// Game time in seconds, advanced only while playing
    pub elapsed_secs: f64,
}

impl GameState {
    pub fn new(snake: Snake) -> Self {
        Self {
            snake,
            food: Vec::new(),
            camera: Camera::default(),
            status: GameStatus::Menu,
            score: 0,
            elapsed_secs: 0.0,
        }
    }

    pub fn length(&self) -> usize {
        self.snake.len()
    }
}
