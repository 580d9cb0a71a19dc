//! Shared AI infrastructure: timers, spatial queries, navigation and the
//! per-tick player snapshot every behavior reads.
//!
//! Tick model (all in `FixedUpdate`, one pass per fixed step):
//!
//! ```text
//!   player motor ─▶ AiSet::Snapshot ─▶ AiSet::Decide ─▶ AiSet::Navigate
//!                   (PlayerSnapshot)    (brains: detect,   (plan + steer)
//!                                        move, attack)
//! ```
//!
//! Every behavior in `AiSet::Decide` sees the same `PlayerSnapshot`, so the
//! result does not depend on the order actors are iterated in.

pub mod clock;
pub mod nav;
pub mod patterns;
pub mod spatial;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::health::Health;
use crate::plugins::player::{Player, PlayerMotor};

use nav::NavSurface;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiSet {
    Snapshot,
    Decide,
    Navigate,
}

/// What behaviors are allowed to know about the player this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerView {
    pub entity: Entity,
    pub position: Vec2,
    pub immune: bool,
    pub liquefied: bool,
}

/// One read of the player per fixed tick. `None` while there is no living
/// player: every detection answers "not seen" and pursuit stands still.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PlayerSnapshot(pub Option<PlayerView>);

impl PlayerSnapshot {
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.0.map(|p| p.position)
    }
}

/// Behavior RNG (patrol points). Seeded from `Tunables::rng_seed`.
#[derive(Resource)]
pub struct AiRng(pub StdRng);

impl AiRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

pub fn plugin(app: &mut App) {
    let seed = app.world().get_resource::<Tunables>().map_or(0, |t| t.rng_seed);

    app.insert_resource(AiRng::seeded(seed))
        .init_resource::<PlayerSnapshot>()
        .init_resource::<NavSurface>();

    app.configure_sets(
        FixedUpdate,
        (AiSet::Snapshot, AiSet::Decide, AiSet::Navigate)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(FixedUpdate, capture_player_snapshot.in_set(AiSet::Snapshot))
        .add_systems(
            FixedUpdate,
            (nav::plan_nav_paths, nav::steer_nav_agents)
                .chain()
                .in_set(AiSet::Navigate),
        );
}

/// Freeze the player's position and status flags for this tick.
pub fn capture_player_snapshot(
    mut snapshot: ResMut<PlayerSnapshot>,
    q_player: Query<(Entity, &Transform, &Health, Option<&PlayerMotor>), With<Player>>,
) {
    snapshot.0 = match q_player.single() {
        Ok((entity, tf, health, motor)) if health.current() > 0 => Some(PlayerView {
            entity,
            position: tf.translation.truncate(),
            immune: health.immune,
            liquefied: motor.is_some_and(PlayerMotor::is_liquefied),
        }),
        _ => None,
    };
}

#[cfg(test)]
mod tests;
