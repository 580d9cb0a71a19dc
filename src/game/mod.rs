//! App wiring for Lost Slime.
//!
//! The simulation (state, gameplay plugins) is the same in both builds. The
//! windowed build adds Bevy's default plugins and the render-only plugins on
//! top; the headless build used by integration tests adds nothing else.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::plugins;

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Window, renderer, lighting and camera on top of the simulation.
pub fn configure_full(app: &mut App) {
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Lost Slime".into(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    }));

    add_simulation(app);
    plugins::register_render(app);
}

/// Simulation only. The caller provides time, states and assets
/// (`MinimalPlugins`, `StatesPlugin`, ...); nothing here opens a window or
/// touches the renderer.
pub fn configure_headless(app: &mut App) {
    add_simulation(app);
}

fn add_simulation(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
