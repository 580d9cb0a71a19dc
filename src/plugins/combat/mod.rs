//! Combat bookkeeping shared by every actor: health, death lifecycle, cues
//! and pickups.
//!
//! Schedules:
//! - FixedUpdate: pickups (after the player snapshot).
//! - FixedPostUpdate: loot rolls, then the death lifecycle, after projectile
//!   hits are resolved so both see this step's `ActorDied` messages.
//! - PostUpdate: structural cleanup (`PendingDespawn`).

pub mod cues;
pub mod health;
pub mod lifecycle;
pub mod pickups;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::ai::AiSet;
use crate::plugins::projectiles::collision::process_projectile_collisions;

pub fn plugin(app: &mut App) {
    app.add_message::<health::ActorHit>()
        .add_message::<health::ActorHealed>()
        .add_message::<health::ActorDied>()
        .add_message::<cues::CombatCue>();

    app.add_systems(
        FixedUpdate,
        (pickups::collect_health_pickups, pickups::collect_power_ups)
            .in_set(AiSet::Decide)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        (pickups::drop_loot, lifecycle::enemy_death_trigger, lifecycle::enemy_death_progress)
            .chain()
            .after(process_projectile_collisions)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        PostUpdate,
        (cues::trace_cues, lifecycle::despawn_marked).run_if(in_state(GameState::InGame)),
    );
}

#[cfg(test)]
mod tests;
