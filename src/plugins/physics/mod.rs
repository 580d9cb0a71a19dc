//! Physics plugin: Avian in top-down mode.
//!
//! Bodies live in world units (pixels). `pixels_per_meter` is Avian's length
//! unit, so its sleep and contact tolerances scale with the level.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let ppm = app.world().resource::<Tunables>().pixels_per_meter;
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm))
        .insert_resource(Gravity(Vec2::ZERO));
}
