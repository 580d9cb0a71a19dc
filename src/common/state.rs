//! Global state machine.

use bevy::prelude::*;

/// Combat systems run only while `InGame`.
///
/// `PlayerDown` is entered once when the player dies; everything scoped to
/// `InGame` is despawned on the way out, which also cancels every pending
/// behavior sequence in one step.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    PlayerDown,
}
