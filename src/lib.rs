//! Cactus Dash - An endless-runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, entities, spawning, game state)
//! - `game`: Fixed-timestep host that wires the sim to its collaborators
//! - `feedback`: Abstract feedback signals (start/click/failure)
//! - `highscores`: Persisted best score
//! - `settings` / `tuning`: User preferences and data-driven game balance

pub mod feedback;
pub mod game;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use feedback::{FeedbackDevice, FeedbackSignal, LogFeedback};
pub use game::Game;
pub use highscores::{BestScoreCell, FileStore, MemoryStore, ScoreStore, StoreError};
pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for stable jumps)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the host will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Score increments once per interval while running (seconds)
    pub const SCORE_INTERVAL: f32 = 0.1;
    /// Score at which the speed factor reaches 2.0
    pub const SCORE_PER_SPEED_STEP: f32 = 1000.0;

    /// Chance that a spawn slot produces anything at all
    pub const SPAWN_PROBABILITY: f32 = 0.8;
    /// Obstacles cross the screen in this fraction of the ground period
    pub const OBSTACLE_TRAVEL_FRACTION: f32 = 0.19;

    /// Storage key for the best score
    pub const BEST_SCORE_KEY: &str = "bestScore";

    /// Physics category bits
    pub const CATEGORY_GROUND: u32 = 1 << 0;
    pub const CATEGORY_CHARACTER: u32 = 1 << 1;
    pub const CATEGORY_OBSTACLE: u32 = 1 << 2;
}
