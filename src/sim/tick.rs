//! Fixed timestep simulation tick
//!
//! One call is one serialized step. Stage order matters:
//! 1. input
//! 2. physics + contact routing (may end the run)
//! 3. score tick (sees the post-contact phase)
//! 4. spawner
//! 5. scripted motions (every phase)

use super::state::GameState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player tap (start, jump or restart depending on phase)
    pub tap: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    if input.tap {
        state.tap();
    }

    state.step_physics(dt);
    state.score_tick(dt);
    state.update_spawner(dt);
    state.advance_motions(dt);
}
