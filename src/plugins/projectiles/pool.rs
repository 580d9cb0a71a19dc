use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Layer, inert_layers};

use super::components::{PooledProjectile, Projectile, ProjectileHandle, ProjectileState};

pub const PROJECTILE_RADIUS: f32 = 4.0;
pub const PROJECTILE_Z: f32 = 2.0;

#[derive(Resource, Debug)]
pub struct ProjectilePool {
    free: Vec<ProjectileHandle>,
    capacity: usize,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        Self { free: Vec::with_capacity(capacity), capacity }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<ProjectileHandle> {
        self.free.pop()
    }

    #[inline]
    pub fn push_free(&mut self, handle: ProjectileHandle) {
        self.free.push(handle);
    }
}

/// Collision layers for a parked projectile: collides with nothing.
#[inline]
pub fn parked_layers() -> CollisionLayers {
    inert_layers(Layer::EnemyBullet)
}

/// Pre-spawn the whole pool, parked.
///
/// Physics components stay present for the pool's lifetime; parked
/// projectiles never generate collision events because their filters are empty.
pub fn init_projectile_pool(mut commands: Commands, mut pool: ResMut<ProjectilePool>) {
    pool.free.clear();
    let cap = pool.capacity;
    pool.free.reserve(cap);

    for _ in 0..cap {
        let e = commands
            .spawn((
                Name::new("Projectile(Pooled)"),
                PooledProjectile,
                ProjectileState::Inactive,
                Projectile::inert(),
                Sprite {
                    color: Color::srgb(1.0, 0.85, 0.3),
                    custom_size: Some(Vec2::splat(PROJECTILE_RADIUS * 2.0)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, PROJECTILE_Z),
                Visibility::Hidden,
                RigidBody::Dynamic,
                Collider::circle(PROJECTILE_RADIUS),
                Sensor,
                parked_layers(),
                LinearVelocity(Vec2::ZERO),
                CollisionEventsEnabled,
            ))
            .id();

        pool.free.push(ProjectileHandle(e));
    }
    debug!("projectiles: pool of {cap} ready");
}
