use crate::game::{GameEngine, GameStatus, TickReport, WorldModel};

/// Turns uneven frame times into fixed-size engine ticks
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepper {
    step_ms: f32,
    max_frame_ms: f32,
    accumulator: f32,
}

impl FixedStepper {
    pub const DEFAULT_STEP_MS: f32 = 1000.0 / 60.0;
    pub const DEFAULT_MAX_FRAME_MS: f32 = 250.0;

    pub fn new(step_ms: f32, max_frame_ms: f32) -> Self {
        Self {
            step_ms: step_ms.max(1.0),
            max_frame_ms: max_frame_ms.max(step_ms),
            accumulator: 0.0,
        }
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    /// Time banked toward the next tick
    pub fn pending_ms(&self) -> f32 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Feed one frame's worth of wall time and run every tick it pays for.
    ///
    /// Frames longer than the clamp are cut short so a stall never turns into
    /// a burst of catch-up ticks. Nothing accumulates while the game is not
    /// running, and ticking stops as soon as a tick ends the game.
    pub fn advance<W: WorldModel>(
        &mut self,
        engine: &mut GameEngine<W>,
        frame_ms: f32,
    ) -> Vec<TickReport> {
        if engine.status() != GameStatus::Playing {
            self.reset();
            return Vec::new();
        }
        if frame_ms.is_nan() || frame_ms <= 0.0 {
            return Vec::new();
        }

        self.accumulator += frame_ms.min(self.max_frame_ms);
        let mut reports = Vec::new();
        while self.accumulator >= self.step_ms {
            self.accumulator -= self.step_ms;
            let report = engine.tick(self.step_ms);
            let over = report.is_game_over();
            reports.push(report);
            if over || engine.status() != GameStatus::Playing {
                self.reset();
                break;
            }
        }
        reports
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP_MS, Self::DEFAULT_MAX_FRAME_MS)
    }
}
