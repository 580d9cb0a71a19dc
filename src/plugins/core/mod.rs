//! Core plugin: shared resources and global settings.
//!
//! Runs first so every later plugin can read `Tunables` while it builds.
//! A `Tunables` inserted before this plugin (tests, tools) is kept as is.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();
    app.insert_resource(ClearColor(Color::srgb(0.04, 0.06, 0.05)));

    let hz = app.world().resource::<Tunables>().fixed_hz;
    app.insert_resource(Time::<Fixed>::from_hz(hz));
}

#[cfg(test)]
mod tests;
