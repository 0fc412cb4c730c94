/// Speed multiplier phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedPhase {
    Normal,
    Turbo,
    /// Deceleration window after turbo release, with time left in ms
    Slow { remaining_ms: f32 },
}

/// Tracks turbo and the slow-down window that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedController {
    phase: SpeedPhase,
    turbo_multiplier: f32,
    slow_multiplier: f32,
    slow_duration_ms: f32,
}

impl SpeedController {
    pub fn new(turbo_multiplier: f32, slow_multiplier: f32, slow_duration_ms: f32) -> Self {
        Self {
            phase: SpeedPhase::Normal,
            turbo_multiplier,
            slow_multiplier,
            slow_duration_ms,
        }
    }

    pub fn phase(&self) -> SpeedPhase {
        self.phase
    }

    pub fn is_turbo(&self) -> bool {
        self.phase == SpeedPhase::Turbo
    }

    /// Turbo pressed; cancels any pending slow window
    pub fn activate_turbo(&mut self) {
        self.phase = SpeedPhase::Turbo;
    }

    /// Turbo released; opens the slow window
    pub fn deactivate_turbo(&mut self) {
        if self.phase != SpeedPhase::Turbo {
            return;
        }
        self.phase = if self.slow_duration_ms > 0.0 {
            SpeedPhase::Slow {
                remaining_ms: self.slow_duration_ms,
            }
        } else {
            SpeedPhase::Normal
        };
    }

    pub fn reset(&mut self) {
        self.phase = SpeedPhase::Normal;
    }

    /// Multiplier for a tick of `delta_ms`, consuming that much of the slow window
    pub fn multiplier(&mut self, delta_ms: f32) -> f32 {
        match self.phase {
            SpeedPhase::Normal => 1.0,
            SpeedPhase::Turbo => self.turbo_multiplier,
            SpeedPhase::Slow { remaining_ms } => {
                let remaining_ms = remaining_ms - delta_ms.max(0.0);
                self.phase = if remaining_ms > 0.0 {
                    SpeedPhase::Slow { remaining_ms }
                } else {
                    SpeedPhase::Normal
                };
                self.slow_multiplier
            }
        }
    }
}
