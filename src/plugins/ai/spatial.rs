//! Spatial queries: distance, cone, line-of-sight and area overlap.
//!
//! Everything here is pure and deterministic given the static arena geometry.
//! Targets are passed as `Option<Vec2>`: a missing or destroyed target is
//! `None`, and every query answers "not detected" for it instead of failing.

use bevy::prelude::*;

/// Anything that can answer "is the straight segment a -> b blocked?".
///
/// The arena implements this over its static blockers (see `NavSurface`).
pub trait LineOfSight {
    fn blocked(&self, from: Vec2, to: Vec2) -> bool;
}

/// Open field: nothing ever occludes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unobstructed;

impl LineOfSight for Unobstructed {
    #[inline]
    fn blocked(&self, _from: Vec2, _to: Vec2) -> bool {
        false
    }
}

/// Actor forward on the ground plane (local +X after yaw).
#[inline]
pub fn forward_of(tf: &Transform) -> Vec2 {
    (tf.rotation * Vec3::X).truncate()
}

/// Yaw-only rotation that makes local +X point along `dir`.
#[inline]
pub fn yaw_towards(dir: Vec2) -> Quat {
    Quat::from_rotation_z(dir.to_angle())
}

/// Turn `tf` toward `dir`, blending by `factor` (1 = snap). Zero-length
/// directions are ignored so an actor never snaps to a default heading.
pub fn turn_towards(tf: &mut Transform, dir: Vec2, factor: f32) {
    if dir.length_squared() <= 1e-4 {
        return;
    }
    let target = yaw_towards(dir);
    tf.rotation = if factor >= 1.0 {
        target
    } else {
        tf.rotation.slerp(target, factor.clamp(0.0, 1.0))
    };
}

#[inline]
pub fn in_radius(origin: Vec2, target: Option<Vec2>, radius: f32) -> bool {
    target.is_some_and(|t| origin.distance_squared(t) <= radius * radius)
}

/// Unsigned angle in degrees between `forward` and `to`.
#[inline]
pub fn angle_between_deg(forward: Vec2, to: Vec2) -> f32 {
    forward.angle_to(to).abs().to_degrees()
}

/// True only if the target is within `max_dist`, within `half_angle_deg` of
/// `forward`, and the straight line to it is not blocked.
pub fn in_cone(
    origin: Vec2,
    forward: Vec2,
    target: Option<Vec2>,
    max_dist: f32,
    half_angle_deg: f32,
    sight: &impl LineOfSight,
) -> bool {
    let Some(target) = target else {
        return false;
    };
    let to = target - origin;
    let dist_sq = to.length_squared();
    if dist_sq > max_dist * max_dist {
        return false;
    }
    // Standing on the target: nothing to occlude.
    if dist_sq <= 1e-6 {
        return true;
    }
    if angle_between_deg(forward, to) > half_angle_deg {
        return false;
    }
    !sight.blocked(origin, target)
}

/// Detection geometry for one actor.
///
/// - inside `peripheral_radius`: detected regardless of facing
/// - inside `view_radius`: detected only within `view_angle_deg / 2` of
///   forward and with a clear line of sight
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionProfile {
    pub peripheral_radius: f32,
    pub view_radius: f32,
    pub view_angle_deg: f32,
}

impl DetectionProfile {
    pub fn detects(
        &self,
        origin: Vec2,
        forward: Vec2,
        target: Option<Vec2>,
        sight: &impl LineOfSight,
    ) -> bool {
        if in_radius(origin, target, self.peripheral_radius) {
            return true;
        }
        in_cone(origin, forward, target, self.view_radius, self.view_angle_deg * 0.5, sight)
    }
}

/// Everything within `radius` of `center`, each entity at most once.
pub fn overlap_area(
    center: Vec2,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Vec<Entity> {
    let r_sq = radius * radius;
    let mut hits: Vec<Entity> = Vec::new();
    for (e, p) in candidates {
        if center.distance_squared(p) <= r_sq && !hits.contains(&e) {
            hits.push(e);
        }
    }
    hits
}
