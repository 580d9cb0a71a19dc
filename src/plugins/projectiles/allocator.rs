//! Spawn consumer: activate projectiles from the pool.
//!
//! # Fail-fast invariants
//! - The pool free list contains only valid pooled projectile entities.
//! - Therefore, a pooled entity must match the projectile query.
//!
//! If this is violated, we `expect()` and crash loudly.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Team, projectile_layers};
use crate::plugins::ai::clock::Countdown;
use crate::plugins::ai::spatial::yaw_towards;

use super::components::{HitEffect, PooledProjectile, Projectile, ProjectileState};
use super::messages::{ProjectileSpawned, SpawnProjectile};
use super::pool::{PROJECTILE_Z, ProjectilePool};

fn tint(team: Team, effect: Option<HitEffect>) -> Color {
    match (team, effect) {
        (_, Some(HitEffect::Slow { .. })) => Color::srgb(0.7, 0.35, 1.0),
        (Team::Player, None) => Color::srgb(0.45, 1.0, 0.55),
        (Team::Enemy, None) => Color::srgb(1.0, 0.4, 0.3),
    }
}

pub fn allocate_projectiles(
    mut pool: ResMut<ProjectilePool>,
    mut requests: MessageReader<SpawnProjectile>,
    mut spawned: MessageWriter<ProjectileSpawned>,
    mut q: Query<
        (
            &mut ProjectileState,
            &mut Projectile,
            &mut Transform,
            &mut LinearVelocity,
            &mut Visibility,
            &mut CollisionLayers,
            Option<&mut Sprite>,
        ),
        With<PooledProjectile>,
    >,
) {
    for req in requests.read() {
        let Some(handle) = pool.pop_free() else {
            // Capacity decision, not a correctness failure.
            debug!("projectiles: pool exhausted, dropping shot");
            continue;
        };

        let (mut state, mut projectile, mut tf, mut vel, mut vis, mut layers, sprite) = q
            .get_mut(handle.0)
            .expect("ProjectilePool contained an entity missing pooled projectile components");

        *state = ProjectileState::Active;
        *projectile = Projectile {
            team: req.team,
            damage: req.damage,
            owner: req.owner,
            lifetime: Countdown::new(req.lifetime),
            on_hit: req.on_hit,
        };
        tf.translation = req.origin.extend(PROJECTILE_Z);
        tf.rotation = yaw_towards(req.direction);
        vel.0 = req.direction * req.speed;
        *vis = Visibility::Visible;
        *layers = projectile_layers(req.team);
        if let Some(mut sprite) = sprite {
            sprite.color = tint(req.team, req.on_hit);
        }

        spawned.write(ProjectileSpawned { handle, owner: req.owner });
    }
}
