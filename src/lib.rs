//! Hungry Noodle - continuous-motion snake simulation
//!
//! This library provides:
//! - The simulation core: movement, trail sampling, food, collision, camera (game module)
//! - Versioned snapshots and where to keep them (persistence module)
//! - Session statistics (metrics module)
//! - Fixed-step and headless drivers (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod persistence;
