//! Enemy lifecycle: Alive -> Dying -> Dead -> despawn.
//!
//! We avoid despawning physics entities inside the fixed step. Death only
//! changes state and collision filters here; removal happens in `PostUpdate`
//! through the `PendingDespawn` marker.
//!
//! Every behavior skips actors that are not `Alive`, so a death cancels any
//! sequence the actor was in the middle of (fuse, burst, boss mode).

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Layer, inert_layers};
use crate::plugins::ai::nav::NavAgent;

use super::health::ActorDied;

const DYING_SECS: f32 = 0.35;

#[derive(Component, Debug, Clone)]
pub enum EnemyLifeState {
    Alive,
    Dying { timer: Timer },
    Dead,
}

impl EnemyLifeState {
    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Marker: remove this entity in `PostUpdate`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

/// Alive -> Dying on the actor's death message.
///
/// Dying actors stop colliding and stop moving right away.
pub fn enemy_death_trigger(
    mut deaths: MessageReader<ActorDied>,
    mut q: Query<
        (
            &mut EnemyLifeState,
            &mut CollisionLayers,
            Option<&mut LinearVelocity>,
            Option<&mut NavAgent>,
        ),
        Without<PendingDespawn>,
    >,
) {
    for died in deaths.read() {
        let Ok((mut life, mut layers, vel, agent)) = q.get_mut(died.actor) else {
            continue;
        };
        if !life.is_alive() {
            continue;
        }

        *life = EnemyLifeState::Dying { timer: Timer::from_seconds(DYING_SECS, TimerMode::Once) };
        *layers = inert_layers(Layer::Enemy);
        if let Some(mut vel) = vel {
            vel.0 = Vec2::ZERO;
        }
        if let Some(mut agent) = agent {
            agent.is_stopped = true;
            agent.reset_path();
        }
        debug!("lifecycle: {} dying", died.actor);
    }
}

/// Shrink and fade Dying actors, then mark them for removal.
pub fn enemy_death_progress(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut EnemyLifeState, &mut Transform, Option<&mut Sprite>), Without<PendingDespawn>>,
) {
    for (e, mut life, mut tf, sprite) in &mut q {
        let EnemyLifeState::Dying { timer } = &mut *life else {
            continue;
        };

        timer.tick(time.delta());

        let dur = timer.duration().as_secs_f32().max(0.0001);
        let t = (timer.elapsed_secs() / dur).clamp(0.0, 1.0);

        tf.scale = Vec3::splat(1.0 - t);
        if let Some(mut sprite) = sprite {
            let mut c = sprite.color.to_srgba();
            c.alpha = 1.0 - t;
            sprite.color = c.into();
        }

        if timer.is_finished() {
            *life = EnemyLifeState::Dead;
            commands.entity(e).insert(PendingDespawn);
        }
    }
}

/// Despawn everything marked for removal.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
