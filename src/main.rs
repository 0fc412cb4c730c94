use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use hungry_noodle::game::{GameConfig, GameEngine, GridWorld, TerrainType, WorldConfig};
use hungry_noodle::modes::{HeadlessConfig, HeadlessMode};
use hungry_noodle::persistence::JsonFileStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hungry_noodle")]
#[command(version, about = "Continuous-motion snake simulation")]
struct Cli {
    /// How to drive the simulation
    #[arg(long, default_value = "simulate")]
    mode: Mode,

    /// JSON file overriding game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// World width in grid units (overrides the config file)
    #[arg(long)]
    width: Option<u32>,

    /// World height in grid units (overrides the config file)
    #[arg(long)]
    height: Option<u32>,

    /// Seconds to run for (game time when simulating, wall time in real time)
    #[arg(long, default_value = "60")]
    seconds: u64,

    /// Seed for food placement, obstacles and input
    #[arg(long)]
    seed: Option<u64>,

    /// Number of obstacle cells to scatter
    #[arg(long, default_value = "0")]
    obstacles: usize,

    /// Terrain theme
    #[arg(long, default_value = "grasslands")]
    terrain: Terrain,

    /// Where to keep the in-progress game
    #[arg(long)]
    save: Option<PathBuf>,

    /// Resume the game kept at --save
    #[arg(long, requires = "save")]
    resume: bool,

    /// Stop after the first game over
    #[arg(long)]
    single_game: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Run flat out over simulated time
    Simulate,
    /// Run paced against the wall clock until done or Ctrl+C
    Realtime,
}

#[derive(Clone, Copy, ValueEnum)]
enum Terrain {
    Grasslands,
    Forest,
    Desert,
    Maze,
    Snowy,
    Hellscape,
}

impl From<Terrain> for TerrainType {
    fn from(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Grasslands => TerrainType::Grasslands,
            Terrain::Forest => TerrainType::Forest,
            Terrain::Desert => TerrainType::Desert,
            Terrain::Maze => TerrainType::Maze,
            Terrain::Snowy => TerrainType::Snowy,
            Terrain::Hellscape => TerrainType::Hellscape,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    // Build game configuration from file and CLI arguments
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.world_width = width;
    }
    if let Some(height) = cli.height {
        config.world_height = height;
    }
    config
        .validate()
        .map_err(|e| anyhow!("Invalid game settings: {}", e))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let world: GridWorld = WorldConfig::new(config.world_width, config.world_height)
        .with_terrain(cli.terrain.into())
        .scatter_obstacles(cli.obstacles, &mut rng)
        .into();
    info!(
        width = config.world_width,
        height = config.world_height,
        obstacles = world.obstacle_count(),
        "world ready"
    );

    let mut engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    }
    .with_world(world);
    if let Some(path) = &cli.save {
        engine = engine.with_store(Box::new(JsonFileStore::new(path)));
    }

    let settings = HeadlessConfig {
        duration: Duration::from_secs(cli.seconds),
        restart_on_game_over: !cli.single_game,
        resume: cli.resume,
        seed: cli.seed,
        ..HeadlessConfig::default()
    };
    let mut mode = HeadlessMode::new(engine, settings);

    // Dispatch to appropriate mode
    let stats = match cli.mode {
        Mode::Simulate => mode.run_simulated()?,
        Mode::Realtime => mode.run_realtime().await?,
    };

    println!(
        "games {}  high score {}  best length {}  food {}  time {}",
        stats.games_played,
        stats.high_score,
        stats.best_length,
        stats.food_eaten,
        stats.format_time()
    );
    Ok(())
}
