//! Game state and the play-phase state machine
//!
//! Phase changes go through [`GameState::transition`], a table keyed by
//! `(from, to)`. Every side effect of a phase change (physics pause,
//! spawner activation, poses, feedback) lives in the handler for its edge.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::contact::{ContactEvent, ContactRouter};
use super::difficulty::{record_best, speed_factor};
use super::entity::{EntityId, EntityRegistry, EntityRole, Pose};
use super::physics::{BodyHandle, PhysicsWorld};
use super::spawner::{RandomSource, Spawner};
use crate::feedback::FeedbackSignal;
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Session loaded, waiting for the first tap
    Idle,
    /// Active gameplay
    Running,
    /// Character hit an obstacle; waiting for a tap to restart
    GameOver,
}

/// Things the outside world may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Feedback(FeedbackSignal),
    ScoreChanged(u64),
    BestScoreChanged(u64),
    /// All entities were destroyed and the session recreated
    Reloaded,
}

/// Read-only entity data for the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub role: EntityRole,
    pub pose: Pose,
    pub position: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub best_score: u64,
    pub speed_factor: f32,
    pub time_ticks: u64,
    pub entities: Vec<EntityView>,
}

/// Complete simulation state
pub struct GameState {
    /// Gameplay constants (fixed for the state's lifetime)
    pub tuning: Tuning,
    /// Seed the spawn RNG was created from (0 for injected sources)
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    phase: GamePhase,
    score: u64,
    best_score: u64,
    /// Character is airborne after a jump
    is_jumping: bool,
    /// Running time since the last score point
    score_timer: f32,
    physics: PhysicsWorld,
    entities: EntityRegistry,
    spawner: Spawner,
    rng: Box<dyn RandomSource>,
    character: Option<EntityId>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// New session seeded for reproducible spawning
    pub fn new(tuning: Tuning, seed: u64, best_score: u64) -> Self {
        let mut state =
            Self::with_random(tuning, best_score, Box::new(Pcg32::seed_from_u64(seed)));
        state.seed = seed;
        state
    }

    /// New session drawing spawn rolls from `rng`
    pub fn with_random(tuning: Tuning, best_score: u64, rng: Box<dyn RandomSource>) -> Self {
        let mut state = Self {
            physics: PhysicsWorld::new(tuning.gravity),
            tuning,
            seed: 0,
            time_ticks: 0,
            phase: GamePhase::Idle,
            score: 0,
            best_score,
            is_jumping: false,
            score_timer: 0.0,
            entities: EntityRegistry::new(),
            spawner: Spawner::new(),
            rng,
            character: None,
            events: Vec::new(),
        };
        state.load_session();
        state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn speed_factor(&self) -> f32 {
        speed_factor(self.score)
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// The live character's body
    pub fn character_body(&self) -> Option<BodyHandle> {
        self.character
            .and_then(|id| self.entities.get(id))
            .map(|e| e.body())
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Live entity transforms, ordered by id
    pub fn entity_views(&self) -> impl Iterator<Item = EntityView> + '_ {
        self.entities.iter().filter_map(|e| {
            let position = self.physics.position(e.body())?;
            Some(EntityView {
                id: e.id(),
                role: e.role(),
                pose: e.pose,
                position,
                size: e.size,
                speed: e.speed,
            })
        })
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            score: self.score,
            best_score: self.best_score,
            speed_factor: self.speed_factor(),
            time_ticks: self.time_ticks,
            entities: self.entity_views().collect(),
        }
    }

    // === Input ===

    /// The single player input; meaning depends on the phase
    pub fn tap(&mut self) {
        match self.phase {
            GamePhase::Idle | GamePhase::GameOver => {
                self.transition(GamePhase::Running);
            }
            GamePhase::Running => {
                self.jump();
            }
        }
    }

    /// Fixed upward impulse, only from the ground. Returns whether it fired.
    pub fn jump(&mut self) -> bool {
        if self.phase != GamePhase::Running || self.is_jumping {
            return false;
        }
        let Some(body) = self.character_body() else {
            debug_assert!(false, "running session without a character");
            return false;
        };
        self.physics.apply_impulse(body, self.tuning.jump_impulse);
        self.is_jumping = true;
        self.events.push(GameEvent::Feedback(FeedbackSignal::Click));
        true
    }

    // === Transition table ===

    /// Move to `to` if `(phase, to)` is a legal edge. Returns whether it happened.
    pub fn transition(&mut self, to: GamePhase) -> bool {
        let from = self.phase;
        match (from, to) {
            (GamePhase::Idle, GamePhase::Running) => self.on_start(),
            (GamePhase::Running, GamePhase::GameOver) => self.on_game_over(),
            (GamePhase::GameOver, GamePhase::Running) => {
                self.on_reload();
                self.on_start();
            }
            _ => {
                log::warn!("Rejected phase transition {:?} -> {:?}", from, to);
                return false;
            }
        }
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        log::info!("Phase {:?} -> {:?} (score {})", from, to, self.score);
        true
    }

    fn on_start(&mut self) {
        self.physics.set_paused(false);
        self.spawner.start();
        self.score_timer = 0.0;
        self.set_character_pose(Pose::Running);
        self.events.push(GameEvent::Feedback(FeedbackSignal::Start));
    }

    fn on_game_over(&mut self) {
        self.physics.set_paused(true);
        self.spawner.stop();
        self.set_character_pose(Pose::Dead);
        self.events.push(GameEvent::Feedback(FeedbackSignal::Failure));
    }

    fn on_reload(&mut self) {
        self.load_session();
        self.events.push(GameEvent::Reloaded);
        self.events.push(GameEvent::ScoreChanged(0));
        log::info!("Session reloaded");
    }

    /// Destroy everything and recreate ground + character with a zero score
    fn load_session(&mut self) {
        self.entities.clear(&mut self.physics);
        self.score = 0;
        self.score_timer = 0.0;
        self.is_jumping = false;

        self.spawner
            .spawn_ground(&mut self.entities, &mut self.physics, &self.tuning);
        let spec = EntityRole::Character.body_spec(&self.tuning);
        let character = self.entities.spawn(
            &mut self.physics,
            EntityRole::Character,
            self.tuning.character_spawn(),
            spec,
        );
        self.character = Some(character);
    }

    /// Drop an entity straight into the world (scenario setup in tests)
    #[cfg(test)]
    pub(crate) fn place(&mut self, role: EntityRole, at: Vec2) -> EntityId {
        let spec = role.body_spec(&self.tuning);
        self.entities.spawn(&mut self.physics, role, at, spec)
    }

    fn set_character_pose(&mut self, pose: Pose) {
        if let Some(character) = self.character.and_then(|id| self.entities.get_mut(id)) {
            character.pose = pose;
        }
    }

    // === Per-step stages (driven by `tick`) ===

    /// Step physics and feed routed contacts into the state machine
    pub(crate) fn step_physics(&mut self, dt: f32) {
        let mut router = ContactRouter::new(&self.entities);
        self.physics.step(dt, &mut router);
        for event in router.into_events() {
            self.handle_contact(event);
        }
    }

    pub(crate) fn handle_contact(&mut self, event: ContactEvent) {
        if self.phase != GamePhase::Running {
            return;
        }
        match event.other {
            EntityRole::Obstacle => {
                self.transition(GamePhase::GameOver);
            }
            EntityRole::Ground => self.is_jumping = false,
            EntityRole::Character => {}
        }
    }

    /// Accrue running time into score points
    pub(crate) fn score_tick(&mut self, dt: f32) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.score_timer += dt;
        while self.score_timer >= self.tuning.score_interval {
            self.score_timer -= self.tuning.score_interval;
            self.increment_score();
        }
    }

    fn increment_score(&mut self) {
        self.score += 1;
        let best = record_best(self.best_score, self.score);
        if best != self.best_score {
            self.best_score = best;
            self.events.push(GameEvent::BestScoreChanged(best));
        }
        self.events.push(GameEvent::ScoreChanged(self.score));

        let factor = speed_factor(self.score);
        for entity in self.entities.iter_mut().filter(|e| e.role().scrolls()) {
            entity.speed = factor;
        }
    }

    pub(crate) fn update_spawner(&mut self, dt: f32) {
        self.spawner.update(
            dt,
            self.score,
            self.rng.as_mut(),
            &mut self.entities,
            &mut self.physics,
            &self.tuning,
        );
    }

    /// Scroll motions run in every phase; finished obstacles remove themselves
    pub(crate) fn advance_motions(&mut self, dt: f32) {
        let removed = self.entities.advance_motions(&mut self.physics, dt);
        if !removed.is_empty() {
            log::debug!("{} obstacle(s) scrolled off screen", removed.len());
        }
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("best_score", &self.best_score)
            .field("is_jumping", &self.is_jumping)
            .field("time_ticks", &self.time_ticks)
            .field("entities", &self.entities.len())
            .finish()
    }
}
