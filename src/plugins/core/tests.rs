use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn keeps_preinserted_tunables_and_sets_the_fixed_rate() {
    let mut app = App::new();
    app.insert_resource(Tunables { rng_seed: 7, fixed_hz: 25.0, ..default() });
    core::plugin(&mut app);

    assert_eq!(app.world().resource::<Tunables>().rng_seed, 7);
    let step = app.world().resource::<Time<Fixed>>().timestep();
    assert!((step.as_secs_f64() - 0.04).abs() < 1e-9);
}
