//! Cactus Dash headless runner
//!
//! Drives the simulation without a renderer: an autopilot taps to start,
//! jumps the cacti it sees coming, and restarts after every crash.

use std::path::PathBuf;

use clap::Parser;

use cactus_dash::sim::{EntityRole, GameEvent, GamePhase};
use cactus_dash::{
    BestScoreCell, FeedbackDevice, FileStore, Game, LogFeedback, Settings, Tuning,
};

#[derive(Parser, Debug)]
#[command(name = "cactus-dash")]
#[command(about = "Headless endless-runner simulation with an autopilot", long_about = None)]
struct Cli {
    /// Seed for obstacle spawning (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Host frame rate fed to the fixed-step driver
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Tuning JSON (defaults used when missing or invalid)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Settings JSON
    #[arg(long, default_value = "cactus_dash_settings.json")]
    settings: PathBuf,

    /// Best-score file (overrides the settings' score file)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seconds of look-ahead the autopilot jumps on (0 disables jumping)
    #[arg(long, default_value_t = 0.12)]
    lead: f32,

    /// Print the final render snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn load_tuning(path: Option<&PathBuf>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    Tuning::load(path).unwrap_or_else(|e| {
        log::warn!("Falling back to default tuning: {e}");
        Tuning::default()
    })
}

/// Tap when the nearest cactus ahead is within `lead` seconds of reaching us
fn autopilot_wants_tap(game: &Game, lead: f32) -> bool {
    let state = game.state();
    match state.phase() {
        GamePhase::Idle | GamePhase::GameOver => return true,
        GamePhase::Running if state.is_jumping() || lead <= 0.0 => return false,
        GamePhase::Running => {}
    }

    let tuning = &state.tuning;
    let scroll_speed =
        tuning.obstacle_travel_distance() / tuning.obstacle_lifetime() * state.speed_factor();
    let lead_distance = scroll_speed * lead;

    let views: Vec<_> = state.entity_views().collect();
    let Some(character) = views.iter().find(|v| v.role == EntityRole::Character) else {
        return false;
    };
    let front = character.position.x + character.size.x * 0.5;
    let nearest_gap = views
        .iter()
        .filter(|v| v.role == EntityRole::Obstacle)
        .map(|v| (v.position.x - v.size.x * 0.5) - front)
        .filter(|gap| *gap >= 0.0)
        .fold(f32::INFINITY, f32::min);
    nearest_gap <= lead_distance
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tuning = load_tuning(cli.tuning.as_ref());
    let mut settings = Settings::load(&cli.settings);
    if let Some(store) = cli.store {
        settings.score_file = store;
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("Cactus Dash starting with seed {seed}");

    let best = BestScoreCell::open(Box::new(FileStore::new(settings.score_file.clone())));
    let feedback: Box<dyn FeedbackDevice> = Box::new(LogFeedback::default());
    let mut game = Game::new(tuning, seed, settings, best, feedback);

    let frame_dt = 1.0 / cli.fps.max(1.0);
    let frames = (cli.seconds.max(0.0) / frame_dt).ceil() as u64;
    let mut runs = 0u32;
    let mut scores = Vec::new();

    for _ in 0..frames {
        if autopilot_wants_tap(&game, cli.lead) {
            game.tap();
        }
        for event in game.update(frame_dt) {
            match event {
                GameEvent::PhaseChanged {
                    to: GamePhase::Running,
                    ..
                } => runs += 1,
                GameEvent::PhaseChanged {
                    to: GamePhase::GameOver,
                    ..
                } => {
                    let score = game.state().score();
                    log::info!("Run {runs} crashed at score {score}");
                    scores.push(score);
                }
                _ => {}
            }
        }
    }

    log::info!(
        "Finished seed {}: {} run(s), crashes at {:?}, current score {}, best {}",
        game.state().seed,
        runs,
        scores,
        game.state().score(),
        game.best_score()
    );

    if cli.snapshot {
        match serde_json::to_string_pretty(&game.state().snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode snapshot: {e}"),
        }
    }
}
