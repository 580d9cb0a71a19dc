//! Projectile data.
//!
//! Pooled projectiles are never structurally changed after the pool is built:
//! activation and return only rewrite component values.

use bevy::prelude::*;

use crate::common::layers::Team;
use crate::plugins::ai::clock::Countdown;

/// Marker for every pool-owned projectile entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct PooledProjectile;

/// A pool slot. Only the allocator and the commit step create or consume
/// these, so holding one means "this entity has the full projectile bundle".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectileHandle(pub Entity);

#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    #[default]
    Inactive,
    Active,
    /// Hit something or expired; returned by the commit step this tick.
    PendingReturn,
}

/// Status effect a projectile delivers to whatever it damages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitEffect {
    /// Scale movement speed by `multiplier` for `duration` seconds.
    Slow { multiplier: f32, duration: f32 },
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub team: Team,
    pub damage: i32,
    /// Never damaged by its own projectile.
    pub owner: Option<Entity>,
    pub lifetime: Countdown,
    pub on_hit: Option<HitEffect>,
}

impl Projectile {
    pub fn inert() -> Self {
        Self {
            team: Team::Enemy,
            damage: 0,
            owner: None,
            lifetime: Countdown::default(),
            on_hit: None,
        }
    }
}
