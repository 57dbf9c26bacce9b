//! Ground and obstacle spawning
//!
//! The spawner never looks at the game phase. The state machine turns it on
//! and off with [`Spawner::start`] / [`Spawner::stop`].
//!
//! Spawn rolls are nested Bernoulli trials:
//! 1. spawn anything at all? (p = 0.8)
//! 2. cluster instead of single? (p = score / 1000)
//! 3. cluster of three instead of two? (p = score / 10000)

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{cluster_probability, speed_factor, triple_probability};
use super::entity::{EntityId, EntityRegistry, EntityRole, Motion};
use super::physics::PhysicsWorld;
use crate::consts::SPAWN_PROBABILITY;
use crate::tuning::Tuning;

/// Uniform random numbers in `[0, 1)`
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f32>,
    index: usize,
}

impl SequenceRandom {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "SequenceRandom needs at least one value");
        Self { values, index: 0 }
    }

    /// Number of draws taken so far
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f32 {
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value
    }
}

#[inline]
fn bernoulli(rng: &mut dyn RandomSource, p: f32) -> bool {
    rng.next_unit() < p
}

/// Outcome of one spawn roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPlan {
    None,
    Single,
    Double,
    Triple,
}

impl SpawnPlan {
    /// Obstacles this plan creates
    pub fn count(&self) -> usize {
        match self {
            SpawnPlan::None => 0,
            SpawnPlan::Single => 1,
            SpawnPlan::Double => 2,
            SpawnPlan::Triple => 3,
        }
    }
}

/// Roll what to spawn at the current score
pub fn decide_spawn_plan(score: u64, rng: &mut dyn RandomSource) -> SpawnPlan {
    if !bernoulli(rng, SPAWN_PROBABILITY) {
        return SpawnPlan::None;
    }
    if !bernoulli(rng, cluster_probability(score)) {
        return SpawnPlan::Single;
    }
    if bernoulli(rng, triple_probability(score)) {
        SpawnPlan::Triple
    } else {
        SpawnPlan::Double
    }
}

/// Time-driven obstacle scheduler
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    active: bool,
    /// Seconds since the last roll
    timer: f32,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin rolling; the first roll comes one full interval later
    pub fn start(&mut self) {
        self.active = true;
        self.timer = 0.0;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Create the scrolling ground strip (left edge at x = 0)
    pub fn spawn_ground(
        &self,
        registry: &mut EntityRegistry,
        physics: &mut PhysicsWorld,
        tuning: &Tuning,
    ) -> EntityId {
        let spec = EntityRole::Ground.body_spec(tuning);
        let origin = spec.size / 2.0;
        let id = registry.spawn(physics, EntityRole::Ground, origin, spec);
        if let Some(ground) = registry.get_mut(id) {
            ground.motion = Some(Motion::looping(
                origin,
                tuning.ground_loop_distance(),
                tuning.duration,
            ));
        }
        id
    }

    /// Advance the cadence timer and spawn whatever the rolls decide.
    /// Returns the new obstacle ids.
    pub fn update(
        &mut self,
        dt: f32,
        score: u64,
        rng: &mut dyn RandomSource,
        registry: &mut EntityRegistry,
        physics: &mut PhysicsWorld,
        tuning: &Tuning,
    ) -> Vec<EntityId> {
        let mut spawned = Vec::new();
        if !self.active {
            return spawned;
        }

        self.timer += dt;
        while self.timer >= tuning.cactus_spawn_duration {
            self.timer -= tuning.cactus_spawn_duration;
            let plan = decide_spawn_plan(score, rng);
            if plan != SpawnPlan::None {
                log::debug!("spawn {:?} at score {}", plan, score);
            }
            for i in 0..plan.count() {
                let offset = i as f32 * tuning.cluster_offset;
                spawned.push(Self::spawn_obstacle(registry, physics, tuning, offset, score));
            }
        }
        spawned
    }

    /// One obstacle just past the right edge, scrolling to just past the left
    fn spawn_obstacle(
        registry: &mut EntityRegistry,
        physics: &mut PhysicsWorld,
        tuning: &Tuning,
        x_offset: f32,
        score: u64,
    ) -> EntityId {
        let spec = EntityRole::Obstacle.body_spec(tuning);
        let from = Vec2::new(
            tuning.screen_size.x + spec.size.x / 2.0 + x_offset,
            tuning.ground_top() + spec.size.y / 2.0,
        );
        let to = from - Vec2::new(tuning.obstacle_travel_distance(), 0.0);

        let id = registry.spawn(physics, EntityRole::Obstacle, from, spec);
        if let Some(obstacle) = registry.get_mut(id) {
            obstacle.motion = Some(Motion::scroll(from, to, tuning.obstacle_lifetime()));
            obstacle.speed = speed_factor(score);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn setup() -> (EntityRegistry, PhysicsWorld, Tuning) {
        let tuning = Tuning::default();
        (EntityRegistry::new(), PhysicsWorld::new(tuning.gravity), tuning)
    }

    #[test]
    #[should_panic(expected = "at least one value")]
    fn test_empty_sequence_panics() {
        SequenceRandom::new(Vec::new());
    }

    #[test]
    fn test_plan_no_spawn_on_high_roll() {
        let mut rng = SequenceRandom::new([0.9]);
        assert_eq!(decide_spawn_plan(500, &mut rng), SpawnPlan::None);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn test_plan_single_at_zero_score() {
        // Even a zero draw cannot pass a zero-probability trial
        let mut rng = SequenceRandom::new([0.0]);
        assert_eq!(decide_spawn_plan(0, &mut rng), SpawnPlan::Single);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn test_plan_always_cluster_at_thousand() {
        let mut rng = SequenceRandom::new([0.1, 0.999, 0.5]);
        assert_eq!(decide_spawn_plan(1000, &mut rng), SpawnPlan::Double);

        let mut rng = SequenceRandom::new([0.1, 0.999, 0.05]);
        assert_eq!(decide_spawn_plan(1000, &mut rng), SpawnPlan::Triple);
    }

    #[test]
    fn test_plan_mid_score() {
        // score 500: cluster p = 0.5, triple p = 0.05
        let mut rng = SequenceRandom::new([0.5, 0.6]);
        assert_eq!(decide_spawn_plan(500, &mut rng), SpawnPlan::Single);

        let mut rng = SequenceRandom::new([0.5, 0.4, 0.04]);
        assert_eq!(decide_spawn_plan(500, &mut rng), SpawnPlan::Triple);
    }

    proptest! {
        #[test]
        fn zero_score_never_clusters(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..64 {
                let plan = decide_spawn_plan(0, &mut rng);
                prop_assert!(matches!(plan, SpawnPlan::None | SpawnPlan::Single));
            }
        }

        #[test]
        fn thousand_score_never_single(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..64 {
                let plan = decide_spawn_plan(1000, &mut rng);
                prop_assert!(plan != SpawnPlan::Single);
            }
        }
    }

    #[test]
    fn test_inactive_spawner_does_nothing() {
        let (mut registry, mut physics, tuning) = setup();
        let mut spawner = Spawner::new();
        let mut rng = SequenceRandom::new([0.0]);

        let spawned = spawner.update(10.0, 0, &mut rng, &mut registry, &mut physics, &tuning);
        assert!(spawned.is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_rolls_once_per_interval() {
        let (mut registry, mut physics, tuning) = setup();
        let mut spawner = Spawner::new();
        spawner.start();
        let mut rng = SequenceRandom::new([0.0]);

        let half = tuning.cactus_spawn_duration / 2.0;
        assert!(spawner.update(half, 0, &mut rng, &mut registry, &mut physics, &tuning).is_empty());
        let spawned = spawner.update(half, 0, &mut rng, &mut registry, &mut physics, &tuning);
        assert_eq!(spawned.len(), 1);
        assert_eq!(registry.find(EntityRole::Obstacle), spawned);
    }

    #[test]
    fn test_restart_resets_timer() {
        let (mut registry, mut physics, tuning) = setup();
        let mut spawner = Spawner::new();
        let mut rng = SequenceRandom::new([0.0]);
        let almost = tuning.cactus_spawn_duration * 0.9;

        spawner.start();
        spawner.update(almost, 0, &mut rng, &mut registry, &mut physics, &tuning);
        spawner.stop();
        spawner.start();
        let spawned = spawner.update(almost, 0, &mut rng, &mut registry, &mut physics, &tuning);
        assert!(spawned.is_empty());
    }

    #[test]
    fn test_cluster_is_offset() {
        let (mut registry, mut physics, tuning) = setup();
        let mut spawner = Spawner::new();
        spawner.start();
        let mut rng = SequenceRandom::new([0.1, 0.1, 0.01]);

        let spawned = spawner.update(
            tuning.cactus_spawn_duration,
            1000,
            &mut rng,
            &mut registry,
            &mut physics,
            &tuning,
        );
        assert_eq!(spawned.len(), 3);

        let xs: Vec<f32> = spawned
            .iter()
            .map(|id| physics.position(registry.get(*id).unwrap().body()).unwrap().x)
            .collect();
        assert!((xs[1] - xs[0] - tuning.cluster_offset).abs() < 1e-3);
        assert!((xs[2] - xs[1] - tuning.cluster_offset).abs() < 1e-3);
        assert!(xs[0] > tuning.screen_size.x);
        for id in &spawned {
            assert!((registry.get(*id).unwrap().speed - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ground_rests_on_screen_bottom() {
        let (mut registry, mut physics, tuning) = setup();
        let id = Spawner::new().spawn_ground(&mut registry, &mut physics, &tuning);
        let ground = registry.get(id).unwrap();
        let pos = physics.position(ground.body()).unwrap();
        assert_eq!(pos.y, tuning.ground_height / 2.0);
        assert_eq!(pos.x - ground.size.x / 2.0, 0.0);
        assert!(matches!(ground.motion, Some(Motion::Loop { .. })));
    }

    #[test]
    fn test_obstacle_gone_within_lifetime() {
        let (mut registry, mut physics, tuning) = setup();
        let mut spawner = Spawner::new();
        spawner.start();
        let mut rng = SequenceRandom::new([0.0]);
        let spawned = spawner.update(
            tuning.cactus_spawn_duration,
            0,
            &mut rng,
            &mut registry,
            &mut physics,
            &tuning,
        );
        assert_eq!(spawned.len(), 1);
        spawner.stop();

        let dt = crate::consts::SIM_DT;
        let steps = (tuning.obstacle_lifetime() / dt).ceil() as usize + 1;
        for _ in 0..steps {
            registry.advance_motions(&mut physics, dt);
        }
        assert!(registry.find(EntityRole::Obstacle).is_empty());
        assert_eq!(physics.body_count(), 0);
    }
}
