//! Bullet patterns: direction sets for volleys.

use bevy::prelude::*;

/// `count` directions evenly spaced around the full circle, the first one at
/// `offset_deg` from +X.
pub fn ring_directions(count: usize, offset_deg: f32) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| Vec2::from_angle((offset_deg + step * i as f32).to_radians()))
        .collect()
}

/// `count` directions fanned evenly across `total_deg`, centered on `base`.
///
/// A single projectile goes straight along `base`.
pub fn spread_directions(base: Vec2, count: usize, total_deg: f32) -> Vec<Vec2> {
    let base = base.normalize_or(Vec2::X);
    if count <= 1 {
        return vec![base; count];
    }
    let start = -total_deg * 0.5;
    let step = total_deg / (count - 1) as f32;
    (0..count)
        .map(|i| Vec2::from_angle((start + step * i as f32).to_radians()).rotate(base))
        .collect()
}

/// Degrees in [0, 360) of a direction, for comparing patterns.
#[inline]
pub fn heading_deg(dir: Vec2) -> f32 {
    dir.to_angle().to_degrees().rem_euclid(360.0)
}
