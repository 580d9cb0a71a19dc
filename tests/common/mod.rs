//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `lost_slime::game::configure_headless` to install gameplay plugins.
//! - time advances by a fixed amount per `update`, so fixed steps are
//!   deterministic instead of following the wall clock.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

/// Exactly one 50 Hz fixed step per frame.
pub const FRAME: Duration = Duration::from_millis(20);

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    lost_slime::game::configure_headless(&mut app);
    // `App::run` would do this; tests drive `update` directly.
    app.finish();
    app.cleanup();
    app
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn single_entity<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, F>()
        .single(app.world())
        .expect("exactly one matching entity")
}
