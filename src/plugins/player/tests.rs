use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Layer, Team, player_layers};
use crate::common::state::GameState;
use crate::common::test_utils::{drain_messages, fixed_time_with_delta, run_system_once};
use crate::common::tunables::Tunables;
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{ActorDied, Health};
use crate::plugins::combat::pickups::{PowerUpKind, PowerUps};
use crate::plugins::world::GooZone;
use crate::plugins::projectiles::components::HitEffect;
use crate::plugins::projectiles::messages::{HitEffectLanded, SpawnProjectile};

use super::motor::{DASH_CHARGES, PlayerMotor};
use super::*;

fn player_world(dt: f32) -> (World, Entity) {
    let mut world = World::new();
    world.insert_resource(fixed_time_with_delta(dt));
    world.init_resource::<PlayerInput>();
    world.init_resource::<Messages<CombatCue>>();
    world.init_resource::<Messages<SpawnProjectile>>();
    world.init_resource::<Messages<HitEffectLanded>>();

    let tunables = Tunables::default();
    let player = world
        .spawn((
            Player,
            PlayerMotor::default().with_base_speed(100.0),
            PlayerGun::from_tunables(&tunables),
            PowerUps::default(),
            Health::new(PLAYER_MAX_HEALTH),
            Transform::default(),
            LinearVelocity::ZERO,
            player_layers(),
        ))
        .id();
    (world, player)
}

// -----------------------------------------------------------------------------
// Motor
// -----------------------------------------------------------------------------

#[test]
fn dash_spends_charge_and_recharges_after_delay() {
    let mut m = PlayerMotor::default();
    assert!(m.try_dash(Vec2::X));
    assert_eq!(m.charges(), DASH_CHARGES - 1);
    assert!(m.is_dashing());

    assert!(!m.tick(0.25).dash_ended);
    assert!(m.tick(0.25).dash_ended);
    assert!(!m.is_dashing());
    assert_eq!(m.charges(), DASH_CHARGES - 1);

    let ev = m.tick(5.5);
    assert_eq!(ev.charges_restored, 1);
    assert_eq!(m.charges(), DASH_CHARGES);
}

#[test]
fn dash_is_gated_by_cooldown_and_charges() {
    let mut m = PlayerMotor::default();
    assert!(m.try_dash(Vec2::X));
    assert!(!m.try_dash(Vec2::X), "cooldown must block an immediate second dash");

    for _ in 1..DASH_CHARGES {
        m.tick(1.0);
        assert!(m.try_dash(Vec2::Y));
    }
    assert_eq!(m.charges(), 0);

    m.tick(1.0);
    assert!(m.dash_cooldown().ready());
    assert!(!m.try_dash(Vec2::X), "no charges left");
}

#[test]
fn dash_velocity_overrides_input() {
    let mut m = PlayerMotor::default();
    m.try_dash(Vec2::new(0.0, 3.0));
    assert_eq!(m.velocity(Vec2::X), Vec2::new(0.0, m.dash_speed));
}

#[test]
fn slow_scales_speed_until_it_expires() {
    let mut m = PlayerMotor::default().with_base_speed(100.0);
    m.apply_speed_modifier(0.5, 2.0);
    assert_eq!(m.current_speed(), 50.0);

    m.tick(1.0);
    assert_eq!(m.current_speed(), 50.0);
    m.tick(1.0);
    assert_eq!(m.current_speed(), 100.0);
}

#[test]
fn liquefy_replaces_slow_and_cools_down() {
    let mut m = PlayerMotor::default().with_base_speed(100.0);
    m.apply_speed_modifier(0.5, 10.0);

    assert!(m.try_liquefy());
    assert!(m.is_liquefied());
    assert_eq!(m.current_speed(), m.liquid_speed);
    assert!(!m.try_liquefy());

    assert!(m.tick(2.0).liquefy_ended);
    assert_eq!(m.current_speed(), 100.0, "liquefy clears the slow");

    assert!(!m.try_liquefy(), "still cooling down");
    m.tick(3.0);
    assert!(m.try_liquefy());
}

#[test]
fn speed_factors_stack_and_liquid_overrides_them() {
    let mut m = PlayerMotor::default().with_base_speed(100.0);
    m.set_boost(1.3);
    m.apply_speed_modifier(0.5, 2.0);
    m.set_terrain(Some(0.3));
    assert!((m.current_speed() - 100.0 * 1.3 * 0.5 * 0.3).abs() < 1e-3);

    m.set_terrain(None);
    m.tick(2.5);
    assert!((m.current_speed() - 130.0).abs() < 1e-3, "slow wore off, boost stays");

    m.tick(5.0);
    assert!(m.try_liquefy());
    assert_eq!(m.current_speed(), m.liquid_speed);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

fn grant(world: &mut World, player: Entity, kind: PowerUpKind) {
    world.get_mut::<PowerUps>(player).unwrap().grant(kind);
}

#[test]
fn drive_moves_along_input_axis() {
    let (mut world, player) = player_world(1.0 / 50.0);
    world.resource_mut::<PlayerInput>().move_axis = Vec2::X;

    run_system_once(&mut world, drive_player);

    assert_eq!(world.get::<LinearVelocity>(player).unwrap().0, Vec2::new(100.0, 0.0));
}

#[test]
fn dash_grants_immunity_and_cues_once() {
    let (mut world, player) = player_world(1.0 / 50.0);
    {
        let mut input = world.resource_mut::<PlayerInput>();
        input.move_axis = Vec2::Y;
        input.dash = true;
    }

    run_system_once(&mut world, drive_player);

    assert!(world.get::<Health>(player).unwrap().immune);
    assert!(!world.resource::<PlayerInput>().dash, "press is consumed");
    let cues = drain_messages::<CombatCue>(&mut world);
    assert_eq!(cues, vec![CombatCue::Dash { player }]);
}

#[test]
fn liquefy_drops_enemy_bullet_filter() {
    let (mut world, player) = player_world(1.0 / 50.0);
    world.resource_mut::<PlayerInput>().liquefy = true;

    run_system_once(&mut world, drive_player);
    let layers = *world.get::<CollisionLayers>(player).unwrap();
    assert!(!layers.filters.has_all(Layer::EnemyBullet));
    assert!(layers.filters.has_all(Layer::World));

    world.insert_resource(fixed_time_with_delta(2.5));
    run_system_once(&mut world, drive_player);
    let layers = *world.get::<CollisionLayers>(player).unwrap();
    assert!(layers.filters.has_all(Layer::EnemyBullet));
}

#[test]
fn trigger_fires_toward_cursor_then_waits_for_cooldown() {
    let (mut world, player) = player_world(1.0 / 50.0);
    {
        let mut input = world.resource_mut::<PlayerInput>();
        input.aim = Some(Vec2::new(0.0, 200.0));
        input.fire = true;
    }

    run_system_once(&mut world, pull_trigger);
    let shots = drain_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].team, Team::Player);
    assert_eq!(shots[0].owner, Some(player));
    assert!(shots[0].direction.distance(Vec2::Y) < 1e-5);
    assert!(shots[0].origin.distance(Vec2::new(0.0, meters(1.0))) < 1e-3);

    world.resource_mut::<PlayerInput>().fire = true;
    run_system_once(&mut world, pull_trigger);
    assert!(drain_messages::<SpawnProjectile>(&mut world).is_empty());
}

#[test]
fn slow_effect_lands_on_player_motor() {
    let (mut world, player) = player_world(1.0 / 50.0);
    world.write_message(HitEffectLanded {
        target: player,
        effect: HitEffect::Slow { multiplier: 0.5, duration: 2.0 },
    });

    run_system_once(&mut world, apply_hit_effects);

    assert_eq!(world.get::<PlayerMotor>(player).unwrap().current_speed(), 50.0);
}

#[test]
fn player_death_requests_player_down() {
    let mut world = World::new();
    world.init_resource::<Messages<ActorDied>>();
    world.init_resource::<NextState<GameState>>();
    let player = world.spawn(Player).id();
    let bystander = world.spawn_empty().id();

    world.write_message(ActorDied { actor: bystander, killer: None });
    run_system_once(&mut world, player_down_on_death);
    assert!(matches!(*world.resource::<NextState<GameState>>(), NextState::Unchanged));

    world.write_message(ActorDied { actor: player, killer: None });
    run_system_once(&mut world, player_down_on_death);
    assert!(matches!(
        *world.resource::<NextState<GameState>>(),
        NextState::Pending(GameState::PlayerDown)
    ));
}

#[test]
fn goo_slows_on_entry_and_restores_on_exit() {
    let (mut world, player) = player_world(1.0 / 50.0);
    world.spawn((GooZone { half_size: Vec2::splat(50.0), multiplier: 0.3 }, Transform::from_xyz(0.0, 0.0, 0.0)));
    world.resource_mut::<PlayerInput>().move_axis = Vec2::X;

    run_system_once(&mut world, wade_through_goo);
    run_system_once(&mut world, drive_player);
    assert!((world.get::<LinearVelocity>(player).unwrap().0.x - 30.0).abs() < 1e-3);

    // Standing in it again is not a new entry.
    run_system_once(&mut world, wade_through_goo);
    let cues = drain_messages::<CombatCue>(&mut world);
    assert_eq!(cues, vec![CombatCue::SlimeWalk { player }]);

    world.get_mut::<Transform>(player).unwrap().translation.x = 200.0;
    run_system_once(&mut world, wade_through_goo);
    run_system_once(&mut world, drive_player);
    assert_eq!(world.get::<LinearVelocity>(player).unwrap().0, Vec2::new(100.0, 0.0));
}

#[test]
fn agility_speeds_up_walking() {
    let (mut world, player) = player_world(1.0 / 50.0);
    grant(&mut world, player, PowerUpKind::Agility);
    world.resource_mut::<PlayerInput>().move_axis = Vec2::X;

    run_system_once(&mut world, drive_player);

    assert!((world.get::<LinearVelocity>(player).unwrap().0.x - 130.0).abs() < 1e-3);
}

#[test]
fn double_shot_fires_two_parallel_bullets() {
    let (mut world, player) = player_world(1.0 / 50.0);
    grant(&mut world, player, PowerUpKind::DoubleShot);
    {
        let mut input = world.resource_mut::<PlayerInput>();
        input.aim = Some(Vec2::new(0.0, 200.0));
        input.fire = true;
    }

    run_system_once(&mut world, pull_trigger);

    let shots = drain_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|s| s.direction.distance(Vec2::Y) < 1e-5 && s.owner == Some(player)));
    assert!((shots[0].origin.x - shots[1].origin.x).abs() > 1.0);
    assert!((shots[0].origin.y - shots[1].origin.y).abs() < 1e-3);
    assert_eq!(drain_messages::<CombatCue>(&mut world), vec![CombatCue::Shot { source: player }]);
}

#[test]
fn fire_rate_upgrade_shortens_the_wait() {
    let tunables = Tunables::default();
    let cooldown = 1.0 / tunables.player_fire_rate;

    // Plain gun: most of a cooldown is not enough.
    let (mut world, _) = player_world(cooldown * 0.8);
    world.resource_mut::<PlayerInput>().fire = true;
    run_system_once(&mut world, pull_trigger);
    drain_messages::<SpawnProjectile>(&mut world);
    world.resource_mut::<PlayerInput>().fire = true;
    run_system_once(&mut world, pull_trigger);
    assert!(drain_messages::<SpawnProjectile>(&mut world).is_empty());

    // Upgraded gun: the same wait suffices.
    let (mut world, player) = player_world(cooldown * 0.8);
    grant(&mut world, player, PowerUpKind::FireRate);
    world.resource_mut::<PlayerInput>().fire = true;
    run_system_once(&mut world, pull_trigger);
    drain_messages::<SpawnProjectile>(&mut world);
    world.resource_mut::<PlayerInput>().fire = true;
    run_system_once(&mut world, pull_trigger);
    assert_eq!(drain_messages::<SpawnProjectile>(&mut world).len(), 1);
}
