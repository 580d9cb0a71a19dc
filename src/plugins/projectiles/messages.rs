//! Buffered projectile messages.
//!
//! Producers (enemy brains, the boss, the player) only write intent. The
//! allocator is the single writer to the pool.

use bevy::prelude::*;

use crate::common::layers::Team;

use super::components::{HitEffect, ProjectileHandle};

pub const DEFAULT_LIFETIME_SECS: f32 = 3.0;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnProjectile {
    pub team: Team,
    /// World position the projectile appears at (already offset from the shooter).
    pub origin: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub owner: Option<Entity>,
    pub lifetime: f32,
    pub on_hit: Option<HitEffect>,
}

impl SpawnProjectile {
    pub fn new(team: Team, origin: Vec2, direction: Vec2, speed: f32) -> Self {
        Self {
            team,
            origin,
            direction: direction.normalize_or(Vec2::X),
            speed,
            damage: 1,
            owner: None,
            lifetime: DEFAULT_LIFETIME_SECS,
            on_hit: None,
        }
    }

    pub fn owned_by(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_lifetime(mut self, secs: f32) -> Self {
        self.lifetime = secs;
        self
    }

    pub fn with_effect(mut self, effect: HitEffect) -> Self {
        self.on_hit = Some(effect);
        self
    }
}

/// The allocator's answer to a `SpawnProjectile`.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSpawned {
    pub handle: ProjectileHandle,
    pub owner: Option<Entity>,
}

/// A projectile's `HitEffect` landed on `target`. Whoever owns the target's
/// movement applies it.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct HitEffectLanded {
    pub target: Entity,
    pub effect: HitEffect,
}
