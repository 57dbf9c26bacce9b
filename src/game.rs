//! Game host: fixed-timestep driver around the simulation
//!
//! Owns the [`GameState`] plus its outside collaborators (feedback device,
//! best-score cell) and routes simulation events to them.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::feedback::FeedbackDevice;
use crate::highscores::BestScoreCell;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Game instance holding all state
pub struct Game {
    state: GameState,
    feedback: Box<dyn FeedbackDevice>,
    best: BestScoreCell,
    settings: Settings,
    accumulator: f32,
    /// Taps received but not yet consumed by a tick
    pending_taps: u32,
}

impl Game {
    /// New session seeded from the stored best score
    pub fn new(
        tuning: Tuning,
        seed: u64,
        settings: Settings,
        best: BestScoreCell,
        feedback: Box<dyn FeedbackDevice>,
    ) -> Self {
        let state = GameState::new(tuning, seed, best.get());
        Self::from_state(state, settings, best, feedback)
    }

    /// Wrap an existing simulation (custom RNG, prepared scenario)
    pub fn from_state(
        state: GameState,
        settings: Settings,
        best: BestScoreCell,
        feedback: Box<dyn FeedbackDevice>,
    ) -> Self {
        Self {
            state,
            feedback,
            best,
            settings,
            accumulator: 0.0,
            pending_taps: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn best_score(&self) -> u64 {
        self.best.get()
    }

    /// Queue a player tap; consumed one per simulation tick
    pub fn tap(&mut self) {
        self.pending_taps += 1;
    }

    /// Run as many fixed ticks as `dt` allows. Returns the events raised,
    /// after feedback and persistence have seen them.
    pub fn update(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                tap: self.pending_taps > 0,
            };
            // Clear one-shot input after processing
            self.pending_taps = self.pending_taps.saturating_sub(1);

            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in self.state.drain_events() {
                self.dispatch(event);
                events.push(event);
            }
        }
        events
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Feedback(signal) if self.settings.haptics => {
                self.feedback.signal(signal);
            }
            GameEvent::BestScoreChanged(best) => {
                if let Err(e) = self.best.set(best) {
                    log::warn!("Failed to persist best score {best}: {e}");
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("best", &self.best)
            .field("pending_taps", &self.pending_taps)
            .finish()
    }
}
