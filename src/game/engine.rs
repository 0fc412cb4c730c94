use anyhow::{ensure, Result};
use tracing::{debug, info, trace, warn};

use super::{
    action::{Action, Direction},
    camera::{CameraController, ViewportBounds},
    collision,
    config::GameConfig,
    events::{EventBus, GameEvent},
    food::FoodManager,
    speed::SpeedController,
    state::{Camera, CollisionType, Food, GameState, GameStatus, Position, Snake},
    world::{GridIndex, GridWorld, WorldConfig, WorldModel},
};
use crate::persistence::{GameSnapshot, SnapshotStore, SNAPSHOT_VERSION};

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// Events emitted this tick, in order
    pub events: Vec<GameEvent>,
    /// Collision that ended the game, if any
    pub collision: Option<CollisionType>,
}

impl TickReport {
    pub fn ate_food(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, GameEvent::FoodEaten { .. }))
    }

    pub fn is_game_over(&self) -> bool {
        self.collision.is_some()
    }
}

/// The simulation core
///
/// Owns the snake, food, camera and status. The world is only ever queried.
/// Nothing here blocks or schedules; an outer loop calls [`GameEngine::tick`].
pub struct GameEngine<W: WorldModel = GridWorld> {
    config: GameConfig,
    world: W,
    state: GameState,
    speed: SpeedController,
    food_manager: FoodManager,
    camera: CameraController,
    events: EventBus,
    store: Option<Box<dyn SnapshotStore>>,
}

impl GameEngine<GridWorld> {
    /// Engine over an empty world sized from the config
    pub fn new(config: GameConfig) -> Self {
        let food_manager = FoodManager::from_entropy(&config);
        Self::with_default_world(config, food_manager)
    }

    /// Same as [`GameEngine::new`] with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let food_manager = FoodManager::with_seed(&config, seed);
        Self::with_default_world(config, food_manager)
    }

    fn with_default_world(config: GameConfig, food_manager: FoodManager) -> Self {
        let world = GridWorld::from(WorldConfig::new(config.world_width, config.world_height));
        let camera = CameraController::new(
            config.viewport_width,
            config.viewport_height,
            config.camera_smoothing,
            config.camera_reference_fps,
        );
        Self::with_parts(config, world, food_manager, camera)
    }
}

impl<W: WorldModel> GameEngine<W> {
    /// Assemble an engine from its collaborators
    pub fn with_parts(
        config: GameConfig,
        world: W,
        food_manager: FoodManager,
        camera: CameraController,
    ) -> Self {
        let speed = SpeedController::new(
            config.turbo_multiplier,
            config.slow_multiplier,
            config.slow_duration_ms,
        );
        let capacity = path_capacity(&config, &world);
        Self {
            config,
            world,
            state: GameState::new(Snake::empty(capacity)),
            speed,
            food_manager,
            camera,
            events: EventBus::new(),
            store: None,
        }
    }

    /// Swap the world used by the next game
    pub fn with_world(mut self, world: impl Into<W>) -> Self {
        self.world = world.into();
        self.state.snake = Snake::empty(path_capacity(&self.config, &self.world));
        self
    }

    /// Attach the store that holds in-progress games
    pub fn with_store(mut self, store: Box<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register an observer for every emitted event
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.events.subscribe(observer);
    }

    // ---- Queries ----

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn segments(&self) -> &[Position] {
        &self.state.snake.segments
    }

    pub fn length(&self) -> usize {
        self.state.snake.len()
    }

    pub fn food(&self) -> &[Food] {
        &self.state.food
    }

    pub fn camera(&self) -> Camera {
        self.state.camera
    }

    pub fn direction(&self) -> Option<Direction> {
        self.state.snake.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.state.snake.pending_direction
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.state.elapsed_secs
    }

    pub fn is_turbo(&self) -> bool {
        self.speed.is_turbo()
    }

    pub fn viewport_bounds(&self) -> ViewportBounds {
        self.camera
            .bounds(self.state.camera, self.world.width(), self.world.height())
    }

    // ---- Control ----

    /// Begin a new game on `world`
    pub fn start_game(&mut self, world: impl Into<W>) {
        self.world = world.into();
        self.restart();
    }

    /// Begin a new game on the current world
    pub fn restart(&mut self) {
        self.initialize();
        info!(
            width = self.world.width(),
            height = self.world.height(),
            terrain = ?self.world.terrain(),
            "game started"
        );
        self.set_status(GameStatus::Playing);
    }

    /// Back to the menu with a fresh board
    pub fn reset_game(&mut self) {
        self.initialize();
        self.set_status(GameStatus::Menu);
    }

    pub fn pause(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.set_status(GameStatus::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state.status == GameStatus::Paused {
            self.set_status(GameStatus::Playing);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state.status {
            GameStatus::Playing => self.pause(),
            GameStatus::Paused => self.resume(),
            GameStatus::Menu | GameStatus::GameOver => {}
        }
    }

    /// Queue a turn for the next grid-aligned point.
    ///
    /// Reversals and repeats of the current direction are ignored.
    pub fn change_direction(&mut self, requested: Direction) {
        let snake = &mut self.state.snake;
        match snake.direction {
            None => snake.pending_direction = Some(requested),
            Some(current) if current == requested || current.is_opposite(requested) => {}
            Some(_) => snake.pending_direction = Some(requested),
        }
    }

    pub fn activate_turbo(&mut self) {
        self.speed.activate_turbo();
    }

    pub fn deactivate_turbo(&mut self) {
        self.speed.deactivate_turbo();
    }

    /// Route an abstract input to the matching control
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Turn(direction) => self.change_direction(direction),
            Action::TurboOn => self.activate_turbo(),
            Action::TurboOff => self.deactivate_turbo(),
            Action::TogglePause => self.toggle_pause(),
        }
    }

    /// Derive the viewport from a canvas size in pixels
    pub fn resize_viewport(&mut self, width_px: u32, height_px: u32) {
        let grid = self.config.grid_size.max(1);
        self.camera.set_viewport_size(width_px / grid, height_px / grid);
        self.state.camera = self.camera.clamp_to_world(
            self.state.camera,
            self.world.width(),
            self.world.height(),
        );
    }

    pub fn set_camera_smoothness(&mut self, factor: f32) {
        self.camera.set_smoothing(factor);
    }

    // ---- Simulation ----

    /// Advance the simulation by `delta_ms` of game time.
    ///
    /// Does nothing unless playing. Non-positive or NaN deltas are dropped,
    /// oversized ones are clamped to `max_delta_ms`.
    pub fn tick(&mut self, delta_ms: f32) -> TickReport {
        if self.state.status != GameStatus::Playing {
            return TickReport::default();
        }
        let Some(delta_ms) = sanitize_delta(delta_ms, self.config.max_delta_ms) else {
            trace!(delta_ms, "dropping degenerate tick");
            return TickReport::default();
        };

        let mut report = TickReport::default();
        match self.advance(delta_ms, &mut report.events) {
            Some(cause) => {
                report.collision = Some(cause);
                self.end_game(cause, &mut report.events);
            }
            None => {
                self.state.elapsed_secs += f64::from(delta_ms) / 1000.0;
                if let Some(head) = self.state.snake.head() {
                    self.state.camera = self.camera.follow(
                        self.state.camera,
                        head,
                        delta_ms,
                        self.world.width(),
                        self.world.height(),
                    );
                }
            }
        }

        for event in &report.events {
            self.events.publish(event);
        }
        report
    }

    /// Move the head and lay out the body, then resolve food and self collision.
    ///
    /// The body is laid out before food is placed so replacements avoid the
    /// cells the snake covers after this tick. Self collision is then
    /// tested against the freshly laid-out body, skipping its leading segments.
    fn advance(&mut self, delta_ms: f32, events: &mut Vec<GameEvent>) -> Option<CollisionType> {
        let head = self.state.snake.head()?;
        let direction = match self.state.snake.direction {
            Some(direction) => direction,
            None => {
                let direction = self.state.snake.pending_direction.take()?;
                self.state.snake.direction = Some(direction);
                direction
            }
        };

        let multiplier = self.speed.multiplier(delta_ms);
        let distance = self.config.base_speed * multiplier * delta_ms / 1000.0;
        let mut candidate = head.moved_in_direction(direction, distance);
        let mut turned = false;
        trace!(x = candidate.x, y = candidate.y, distance, "head step");

        if collision::out_of_bounds(candidate, self.world.width(), self.world.height()) {
            return Some(CollisionType::Wall);
        }
        let cell = self.clamped_cell(candidate);
        if self.world.is_blocked(cell.x, cell.y) {
            return Some(CollisionType::Obstacle);
        }

        // Turns only happen on grid points so the body never cuts corners
        if let Some(next) = self.state.snake.pending_direction {
            let epsilon = self.config.turn_epsilon;
            if (candidate.x - cell.x as f32).abs() < epsilon
                && (candidate.y - cell.y as f32).abs() < epsilon
            {
                candidate = Position::from(cell);
                turned = true;
                self.state.snake.direction = Some(next);
                self.state.snake.pending_direction = None;
                trace!(?next, x = cell.x, y = cell.y, "turn committed");
            }
        }

        let snake = &mut self.state.snake;
        if turned {
            snake.path.record_corner(candidate);
        } else {
            snake.path.record(candidate);
        }
        snake.segments[0] = candidate;
        snake.path.layout(&mut snake.segments, self.config.segment_spacing);

        let eaten = self.food_manager.consume(
            candidate,
            &self.world,
            &self.state.snake,
            &mut self.state.food,
        );
        for food in eaten {
            self.state.score += food.value;
            self.state.snake.grow();
            debug!(
                kind = ?food.kind,
                value = food.value,
                score = self.state.score,
                length = self.state.snake.len(),
                "food eaten"
            );
            events.push(GameEvent::FoodEaten {
                food,
                score: self.state.score,
            });
        }

        if collision::hits_body(
            candidate,
            &self.state.snake.segments,
            self.config.self_collision_skip,
            self.config.self_collision_radius,
        ) {
            return Some(CollisionType::SelfCollision);
        }
        None
    }

    /// Rounded cell of an in-bounds position, kept inside the grid
    fn clamped_cell(&self, pos: Position) -> GridIndex {
        let cell = pos.rounded();
        GridIndex::new(
            cell.x.clamp(0, self.world.width() as i32 - 1),
            cell.y.clamp(0, self.world.height() as i32 - 1),
        )
    }

    fn end_game(&mut self, cause: CollisionType, events: &mut Vec<GameEvent>) {
        let from = self.state.status;
        self.state.status = GameStatus::GameOver;
        self.speed.reset();
        info!(
            ?cause,
            score = self.state.score,
            length = self.state.snake.len(),
            elapsed_secs = self.state.elapsed_secs,
            "game over"
        );

        events.push(GameEvent::StatusChanged {
            from,
            to: GameStatus::GameOver,
        });
        events.push(GameEvent::GameOver {
            score: self.state.score,
            length: self.state.snake.len(),
            elapsed_secs: self.state.elapsed_secs,
            cause,
        });

        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.clear() {
                warn!(error = %format!("{:#}", err), "failed to clear saved game");
            }
        }
    }

    fn set_status(&mut self, to: GameStatus) {
        let from = self.state.status;
        if from == to {
            return;
        }
        self.state.status = to;
        info!(?from, ?to, "status changed");
        self.events.publish(&GameEvent::StatusChanged { from, to });
    }

    fn initialize(&mut self) {
        let (width, height) = (self.world.width(), self.world.height());
        let head = Position::new((width / 2) as f32, (height / 2) as f32);
        let mut snake = Snake::new(
            head,
            Direction::Right,
            self.config.initial_snake_length,
            self.config.segment_spacing,
            path_capacity(&self.config, &self.world),
        );
        snake.path.set_min_step(self.config.trail_step);

        self.state.snake = snake;
        self.state.food.clear();
        self.state.score = 0;
        self.state.elapsed_secs = 0.0;
        self.speed.reset();
        self.state.camera = self.camera.snap(head, width, height);

        let placed = self
            .food_manager
            .spawn(&self.world, &self.state.snake, &mut self.state.food);
        debug!(count = placed.len(), "initial food placed");
    }

    // ---- Persistence ----

    /// Capture everything needed to resume this game
    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            score: self.state.score,
            segments: self.state.snake.segments.clone(),
            food: self.state.food.clone(),
            direction: self.state.snake.direction.unwrap_or(Direction::Right),
            elapsed_secs: self.state.elapsed_secs,
            grid_size: self.config.grid_size,
            world_width: self.world.width(),
            world_height: self.world.height(),
            camera: self.state.camera,
            terrain: self.world.terrain(),
        }
    }

    /// Resume a saved game on the current world.
    ///
    /// The snapshot must match this world's dimensions. On success the game is
    /// left paused; on failure nothing changes.
    pub fn restore_from_snapshot(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        snapshot.validate()?;
        ensure!(
            snapshot.world_width == self.world.width()
                && snapshot.world_height == self.world.height(),
            "snapshot world {}x{} does not match current world {}x{}",
            snapshot.world_width,
            snapshot.world_height,
            self.world.width(),
            self.world.height()
        );
        if snapshot.terrain != self.world.terrain() {
            warn!(
                saved = ?snapshot.terrain,
                current = ?self.world.terrain(),
                "restoring snapshot onto a different terrain"
            );
        }

        self.state.snake = Snake::from_segments(
            snapshot.segments.clone(),
            snapshot.direction,
            path_capacity(&self.config, &self.world),
        );
        self.state.snake.path.set_min_step(self.config.trail_step);
        self.state.food = snapshot.food.clone();
        self.state.score = snapshot.score;
        self.state.elapsed_secs = snapshot.elapsed_secs;
        self.state.camera = self.camera.clamp_to_world(
            snapshot.camera,
            self.world.width(),
            self.world.height(),
        );
        if snapshot.grid_size > 0 {
            self.config.grid_size = snapshot.grid_size;
        }
        self.speed.reset();

        info!(
            score = snapshot.score,
            length = snapshot.segments.len(),
            "snapshot restored"
        );
        self.set_status(GameStatus::Paused);
        Ok(())
    }

    /// Write the current game to the attached store, if any
    pub fn save_snapshot(&mut self) -> Result<()> {
        let snapshot = self.to_snapshot();
        if let Some(store) = self.store.as_mut() {
            store.save(&snapshot)?;
        }
        Ok(())
    }

    /// Resume from the attached store.
    ///
    /// Returns false when there is nothing usable to resume; an unusable
    /// snapshot is cleared from the store.
    pub fn resume_from_store(&mut self) -> bool {
        let Some(snapshot) = self.store.as_mut().and_then(|store| store.load()) else {
            return false;
        };
        match self.restore_from_snapshot(&snapshot) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %format!("{:#}", err), "discarding saved game");
                if let Some(store) = self.store.as_mut() {
                    if let Err(err) = store.clear() {
                        warn!(error = %format!("{:#}", err), "failed to clear saved game");
                    }
                }
                false
            }
        }
    }
}

fn path_capacity<W: WorldModel>(config: &GameConfig, world: &W) -> usize {
    config.path_capacity(world.width(), world.height())
}

/// Reject NaN and non-positive deltas, clamp stalls
fn sanitize_delta(delta_ms: f32, max_delta_ms: f32) -> Option<f32> {
    if delta_ms.is_nan() || delta_ms <= 0.0 {
        return None;
    }
    Some(delta_ms.min(max_delta_ms))
}
