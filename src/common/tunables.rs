//! Tunable gameplay constants.
//!
//! Gameplay values are authored in meters (the units the level was designed
//! in) and converted to world units with [`meters`].

use bevy::prelude::*;

/// World units per meter. Also the physics length unit.
pub const PIXELS_PER_METER: f32 = 20.0;

#[inline]
pub fn meters(v: f32) -> f32 {
    v * PIXELS_PER_METER
}

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub player_speed: f32,
    pub player_bullet_speed: f32,
    pub player_fire_rate: f32,
    pub player_bullet_lifetime: f32,
    pub projectile_pool_size: usize,
    /// Simulation rate. Every behavior timer is measured in fixed steps.
    pub fixed_hz: f64,
    /// Seed for the behavior RNG (patrol points).
    pub rng_seed: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER,
            player_speed: meters(5.0),
            player_bullet_speed: meters(10.0),
            player_fire_rate: 4.0,
            player_bullet_lifetime: 3.0,
            projectile_pool_size: 512,
            fixed_hz: 50.0,
            rng_seed: 0x51_1BE5,
        }
    }
}
