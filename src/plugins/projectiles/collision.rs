//! Projectile hit resolution.
//!
//! Reads Avian's `CollisionStart` messages and, per projectile, decides:
//! - wall: absorbed
//! - its own shooter: ignored, keeps flying
//! - anything else it is allowed to touch: damage through `HealthSink`,
//!   deliver its `HitEffect`, absorbed
//!
//! Layers already keep friendly fire and liquefied players out of the event
//! stream, so nothing here checks teams.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::plugins::combat::health::{HealthOutcome, HealthSink};

use super::components::{PooledProjectile, Projectile, ProjectileState};
use super::messages::HitEffectLanded;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget { collider: ev.collider1, body: ev.body1 },
        CollisionTarget { collider: ev.collider2, body: ev.body2 },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

pub fn process_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    q_is_projectile: Query<(), With<PooledProjectile>>,
    mut q_projectiles: Query<(&Projectile, &mut ProjectileState), With<PooledProjectile>>,
    q_layers: Query<&CollisionLayers, Without<PooledProjectile>>,
    mut sink: HealthSink,
    mut effects: MessageWriter<HitEffectLanded>,
    // Per-frame dedupe
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let p1 = q_is_projectile.contains(t1.collider);
        let p2 = q_is_projectile.contains(t2.collider);
        if !(p1 ^ p2) {
            continue; // exactly one projectile
        }
        let (projectile_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((projectile, mut state)) = q_projectiles.get_mut(projectile_side.collider) else {
            continue;
        };
        if *state != ProjectileState::Active {
            continue;
        }

        let target = other_side.gameplay_owner();
        if projectile.owner == Some(target) {
            continue;
        }

        // One resolution per projectile per step.
        if !seen.insert(projectile_side.collider) {
            continue;
        }

        if !is_in_layer(other_layers, Layer::World) {
            let outcome = sink.apply(target, -projectile.damage, projectile.owner);
            if let (Some(effect), HealthOutcome::Hit | HealthOutcome::Died) = (projectile.on_hit, outcome) {
                effects.write(HitEffectLanded { target, effect });
            }
        }

        *state = ProjectileState::PendingReturn;
    }
}
