//! Headless driver
//!
//! Runs the engine without a screen, either flat out over a fixed amount of
//! game time or paced against the wall clock on a tokio interval. Input comes
//! from [`WanderInput`], a random walker that turns and toggles turbo.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::stepper::FixedStepper;
use crate::game::{Action, Direction, GameEngine, GameStatus, WorldModel};
use crate::metrics::SessionStats;

/// Settings for a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessConfig {
    /// Game time to simulate, or wall time to run for in real time
    pub duration: Duration,
    /// Game seconds between automatic saves
    pub autosave_secs: f64,
    /// Chance per frame of requesting a turn
    pub turn_chance: f64,
    /// Chance per frame of pressing or releasing turbo
    pub turbo_chance: f64,
    /// Start a fresh game after each game over instead of stopping
    pub restart_on_game_over: bool,
    /// Try the store before starting a fresh game
    pub resume: bool,
    pub seed: Option<u64>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            autosave_secs: 5.0,
            turn_chance: 0.02,
            turbo_chance: 0.005,
            restart_on_game_over: true,
            resume: false,
            seed: None,
        }
    }
}

/// Random input source: occasional turns and turbo presses
#[derive(Debug, Clone)]
pub struct WanderInput {
    rng: StdRng,
    turn_chance: f64,
    turbo_chance: f64,
    turbo: bool,
}

impl WanderInput {
    pub fn new(rng: StdRng, turn_chance: f64, turbo_chance: f64) -> Self {
        Self {
            rng,
            turn_chance: turn_chance.clamp(0.0, 1.0),
            turbo_chance: turbo_chance.clamp(0.0, 1.0),
            turbo: false,
        }
    }

    /// Actions for one frame
    pub fn next_actions(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.rng.gen_bool(self.turn_chance) {
            let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
            actions.push(Action::Turn(direction));
        }
        if self.rng.gen_bool(self.turbo_chance) {
            self.turbo = !self.turbo;
            actions.push(if self.turbo {
                Action::TurboOn
            } else {
                Action::TurboOff
            });
        }
        actions
    }
}

pub struct HeadlessMode<W: WorldModel> {
    engine: GameEngine<W>,
    stepper: FixedStepper,
    input: WanderInput,
    stats: Rc<RefCell<SessionStats>>,
    settings: HeadlessConfig,
    last_save_secs: f64,
}

impl<W: WorldModel> HeadlessMode<W> {
    pub fn new(mut engine: GameEngine<W>, settings: HeadlessConfig) -> Self {
        let stats = Rc::new(RefCell::new(SessionStats::new()));
        let sink = Rc::clone(&stats);
        engine.subscribe(move |event| sink.borrow_mut().on_event(event));

        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let input = WanderInput::new(rng, settings.turn_chance, settings.turbo_chance);

        Self {
            engine,
            stepper: FixedStepper::default(),
            input,
            stats,
            settings,
            last_save_secs: 0.0,
        }
    }

    pub fn engine(&self) -> &GameEngine<W> {
        &self.engine
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }

    /// Simulate `duration` of game time as fast as possible
    pub fn run_simulated(&mut self) -> Result<SessionStats> {
        self.begin();
        let frame_ms = self.stepper.step_ms();
        let total_ms = self.settings.duration.as_secs_f64() * 1000.0;
        let mut simulated_ms = 0.0;

        while simulated_ms < total_ms {
            simulated_ms += f64::from(frame_ms);
            if !self.frame(frame_ms) {
                break;
            }
        }
        Ok(self.finish())
    }

    /// Run against the wall clock until `duration` passes or Ctrl+C
    pub async fn run_realtime(&mut self) -> Result<SessionStats> {
        self.begin();

        let mut frame_timer = interval(Duration::from_secs_f32(self.stepper.step_ms() / 1000.0));
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = tokio::time::sleep(self.settings.duration);
        tokio::pin!(deadline);
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    let frame_ms = now.duration_since(last_frame).as_secs_f32() * 1000.0;
                    last_frame = now;
                    if !self.frame(frame_ms) {
                        break;
                    }
                }

                _ = &mut deadline => break,

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
        }

        Ok(self.finish())
    }

    fn begin(&mut self) {
        if self.settings.resume && self.engine.resume_from_store() {
            info!(
                score = self.engine.score(),
                length = self.engine.length(),
                "resuming saved game"
            );
            self.engine.resume();
        } else {
            self.engine.restart();
        }
        self.last_save_secs = self.engine.elapsed_secs();
        self.stepper.reset();
    }

    /// One frame of input and simulation. Returns false once the run is over.
    fn frame(&mut self, frame_ms: f32) -> bool {
        for action in self.input.next_actions() {
            self.engine.apply(action);
        }
        self.stepper.advance(&mut self.engine, frame_ms);

        match self.engine.status() {
            GameStatus::Playing => {
                let elapsed = self.engine.elapsed_secs();
                self.stats.borrow_mut().update(elapsed);
                if elapsed - self.last_save_secs >= self.settings.autosave_secs {
                    self.autosave();
                }
                true
            }
            GameStatus::GameOver if self.settings.restart_on_game_over => {
                self.engine.restart();
                self.last_save_secs = 0.0;
                true
            }
            GameStatus::GameOver => false,
            GameStatus::Menu | GameStatus::Paused => true,
        }
    }

    fn autosave(&mut self) {
        self.last_save_secs = self.engine.elapsed_secs();
        match self.engine.save_snapshot() {
            Ok(()) => debug!(elapsed_secs = self.last_save_secs, "autosaved"),
            Err(err) => warn!(error = %format!("{:#}", err), "autosave failed"),
        }
    }

    fn finish(&mut self) -> SessionStats {
        if self.engine.status() == GameStatus::Playing {
            self.autosave();
        }

        let stats = self.stats();
        info!(
            games = stats.games_played,
            high_score = stats.high_score,
            best_length = stats.best_length,
            food = stats.food_eaten,
            play_time = %stats.format_time(),
            "session finished"
        );
        stats
    }
}
