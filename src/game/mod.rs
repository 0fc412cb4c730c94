//! Core simulation for the continuous-motion snake
//!
//! Everything here is free of I/O, timers and rendering. A host drives the
//! engine by calling `tick` with elapsed milliseconds and reads state back.

pub mod action;
pub mod camera;
pub mod collision;
pub mod config;
pub mod engine;
pub mod events;
pub mod food;
pub mod path;
pub mod speed;
pub mod state;
pub mod world;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use camera::{CameraController, ViewportBounds};
pub use config::GameConfig;
pub use engine::{GameEngine, TickReport};
pub use events::{EventBus, GameEvent};
pub use food::FoodManager;
pub use path::PathRecorder;
pub use speed::{SpeedController, SpeedPhase};
pub use state::{Camera, CollisionType, Food, FoodKind, GameState, GameStatus, Position, Snake};
pub use world::{GridIndex, GridWorld, TerrainType, WorldConfig, WorldModel};
