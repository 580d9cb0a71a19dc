mod common;

use bevy::prelude::*;
use lost_slime::common::state::GameState;
use lost_slime::plugins::boss::{Boss, BossPhase, BossSequencer, BossTrigger};
use lost_slime::plugins::combat::health::ActorDied;
use lost_slime::plugins::enemies::Enemy;
use lost_slime::common::layers::Team;
use lost_slime::plugins::player::Player;
use lost_slime::plugins::projectiles::messages::SpawnProjectile;
use lost_slime::plugins::projectiles::pool::ProjectilePool;

#[test]
fn walking_into_the_trigger_wakes_the_boss() {
    let mut app = common::app_headless();
    common::run_frames(&mut app, 2);

    let player = common::single_entity::<With<Player>>(&mut app);
    let boss = common::single_entity::<With<Boss>>(&mut app);
    assert_eq!(*app.world().get::<Visibility>(boss).unwrap(), Visibility::Hidden);

    // Bring the zone to the player rather than moving an interpolated body.
    let at = app.world().get::<Transform>(player).unwrap().translation;
    let trigger = common::single_entity::<With<BossTrigger>>(&mut app);
    app.world_mut().get_mut::<Transform>(trigger).unwrap().translation = at.with_z(0.0);
    common::run_frames(&mut app, 5);

    assert_eq!(*app.world().get::<Visibility>(boss).unwrap(), Visibility::Visible);
    let world = app.world_mut();
    assert_eq!(world.query::<&BossTrigger>().iter(world).count(), 0, "trigger is consumed");

    // Give it a few steps to start its first mode.
    common::run_frames(&mut app, 5);
    let seq = app.world().get::<BossSequencer>(boss).unwrap();
    assert!(!seq.is_dormant());
    assert_eq!(seq.phase(), Some(BossPhase::TrianglePatrolBurst));
}

#[test]
fn player_death_tears_the_level_down() {
    let mut app = common::app_headless();
    common::run_frames(&mut app, 2);

    let player = common::single_entity::<With<Player>>(&mut app);
    // A long-lived shot aimed away from everything is still in flight when the round ends.
    app.world_mut().write_message(
        SpawnProjectile::new(Team::Enemy, Vec2::new(-900.0, -500.0), Vec2::NEG_X, 1.0).with_lifetime(60.0),
    );
    app.world_mut().write_message(ActorDied { actor: player, killer: None });
    common::run_frames(&mut app, 5);

    let pool = app.world().resource::<ProjectilePool>();
    assert_eq!(pool.available(), pool.capacity(), "nothing stays in flight across rounds");

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::PlayerDown);
    let world = app.world_mut();
    assert_eq!(world.query::<&Player>().iter(world).count(), 0);
    assert_eq!(world.query::<&Enemy>().iter(world).count(), 0);
}
