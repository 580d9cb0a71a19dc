use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::{Layer, enemy_layers};
use crate::common::test_utils::{TestRng, drain_messages, fixed_time_with_delta, run_system_once};
use crate::plugins::ai::{AiRng, PlayerSnapshot, PlayerView};

use super::cues::CombatCue;
use super::health::*;
use super::lifecycle::*;
use super::pickups::*;

fn message_world() -> World {
    let mut world = World::new();
    world.init_resource::<Messages<ActorHit>>();
    world.init_resource::<Messages<ActorHealed>>();
    world.init_resource::<Messages<ActorDied>>();
    world.init_resource::<Messages<CombatCue>>();
    world
}

// -----------------------------------------------------------------------------
// Health
// -----------------------------------------------------------------------------

#[test]
fn apply_clamps_and_reports_outcomes() {
    let mut h = Health::new(5);
    assert_eq!(h.apply(-2), HealthOutcome::Hit);
    assert_eq!(h.current(), 3);

    assert_eq!(h.apply(10), HealthOutcome::Healed);
    assert_eq!(h.current(), 5);

    assert_eq!(h.apply(-99), HealthOutcome::Died);
    assert_eq!(h.current(), 0);
}

#[test]
fn zero_health_ignores_everything_until_reset() {
    let mut h = Health::new(3);
    assert_eq!(h.apply(-3), HealthOutcome::Died);
    assert_eq!(h.apply(-1), HealthOutcome::Ignored);
    assert_eq!(h.apply(2), HealthOutcome::Ignored);
    assert_eq!(h.current(), 0);

    h.reset();
    assert_eq!(h.current(), 3);
}

#[test]
fn immune_blocks_damage_but_not_healing() {
    let mut h = Health::new(5);
    h.apply(-2);
    h.immune = true;

    assert_eq!(h.apply(-1), HealthOutcome::Ignored);
    assert_eq!(h.current(), 3);
    assert_eq!(h.apply(1), HealthOutcome::Healed);
    assert_eq!(h.current(), 4);
}

#[test]
fn health_stays_in_bounds_and_dies_once_randomized() {
    let mut rng = TestRng::new(0xA11CE_5EED);

    for _case in 0..2_000 {
        let max = (rng.next_u64() % 30 + 1) as i32;
        let mut h = Health::new(max);
        let mut deaths = 0;

        for _ in 0..40 {
            h.immune = rng.next_f32() < 0.2;
            let amount = (rng.next_u64() % 13) as i32 - 8;
            if h.apply(amount) == HealthOutcome::Died {
                deaths += 1;
            }
            assert!((0..=max).contains(&h.current()));
        }

        assert!(deaths <= 1);
        assert_eq!(deaths == 1, h.current() == 0);
    }
}

#[test]
fn sink_writes_hit_and_single_death() {
    let mut world = message_world();
    let e = world.spawn(Health::new(2)).id();

    let outcomes = run_system_once(&mut world, move |mut sink: HealthSink| {
        [sink.apply(e, -1, None), sink.apply(e, -1, None), sink.apply(e, -1, None)]
    });
    assert_eq!(outcomes, [HealthOutcome::Hit, HealthOutcome::Died, HealthOutcome::Ignored]);

    assert_eq!(drain_messages::<ActorHit>(&mut world).len(), 2);
    let deaths = drain_messages::<ActorDied>(&mut world);
    assert_eq!(deaths, vec![ActorDied { actor: e, killer: None }]);
}

#[test]
fn sink_ignores_entities_without_health() {
    let mut world = message_world();
    let e = world.spawn_empty().id();

    let outcome = run_system_once(&mut world, move |mut sink: HealthSink| sink.apply(e, -5, None));
    assert_eq!(outcome, HealthOutcome::Ignored);
    assert!(drain_messages::<ActorHit>(&mut world).is_empty());
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[test]
fn death_message_moves_alive_actor_to_dying_and_clears_filters() {
    let mut world = message_world();
    let e = world
        .spawn((EnemyLifeState::Alive, enemy_layers(), LinearVelocity(Vec2::new(50.0, 0.0)), Transform::default()))
        .id();

    world.write_message(ActorDied { actor: e, killer: None });
    run_system_once(&mut world, enemy_death_trigger);

    assert!(matches!(world.get::<EnemyLifeState>(e).unwrap(), EnemyLifeState::Dying { .. }));
    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.memberships.has_all(Layer::Enemy));
    assert!(!layers.filters.has_all(Layer::PlayerBullet));
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
}

#[test]
fn dying_actor_is_marked_then_despawned() {
    let mut world = World::new();
    world.insert_resource(fixed_time_with_delta(0.5));
    let e = world
        .spawn((
            EnemyLifeState::Dying { timer: Timer::from_seconds(0.35, TimerMode::Once) },
            Transform::default(),
        ))
        .id();

    run_system_once(&mut world, enemy_death_progress);
    assert!(matches!(world.get::<EnemyLifeState>(e).unwrap(), EnemyLifeState::Dead));
    assert!(world.get::<PendingDespawn>(e).is_some());

    run_system_once(&mut world, despawn_marked);
    assert!(world.get_entity(e).is_err());
}

// -----------------------------------------------------------------------------
// Pickups
// -----------------------------------------------------------------------------

fn world_with_player(current_damage: i32) -> (World, Entity) {
    let mut world = message_world();
    let mut hp = Health::new(5);
    hp.apply(-current_damage);
    let player = world.spawn((hp, Transform::default())).id();
    world.insert_resource(PlayerSnapshot(Some(PlayerView {
        entity: player,
        position: Vec2::ZERO,
        immune: false,
        liquefied: false,
    })));
    (world, player)
}

#[test]
fn pickup_heals_wounded_player_and_is_consumed() {
    let (mut world, player) = world_with_player(2);
    let pickup = world
        .spawn((HealthPickup { amount: 1, radius: 20.0 }, Transform::from_xyz(5.0, 0.0, 0.0)))
        .id();

    run_system_once(&mut world, collect_health_pickups);

    assert_eq!(world.get::<Health>(player).unwrap().current(), 4);
    assert!(world.get::<PendingDespawn>(pickup).is_some());
}

#[test]
fn pickup_is_left_alone_at_full_health() {
    let (mut world, player) = world_with_player(0);
    let pickup = world
        .spawn((HealthPickup { amount: 1, radius: 20.0 }, Transform::from_xyz(5.0, 0.0, 0.0)))
        .id();

    run_system_once(&mut world, collect_health_pickups);

    assert_eq!(world.get::<Health>(player).unwrap().current(), 5);
    assert!(world.get::<PendingDespawn>(pickup).is_none());
}

#[test]
fn power_ups_cap_at_three_kinds_and_duplicates_are_absorbed() {
    let mut owned = PowerUps::default();
    for kind in PowerUpKind::ALL {
        assert_eq!(owned.grant(kind), Grant::Added);
    }
    assert_eq!(owned.grant(PowerUpKind::Agility), Grant::AlreadyActive);
    assert_eq!(owned.len(), MAX_POWER_UPS);
    assert!((owned.speed_multiplier() - 1.3).abs() < 1e-6);
    assert!((owned.fire_rate_multiplier() - 1.3).abs() < 1e-6);
    assert!(owned.double_shot());
}

#[test]
fn power_up_pickup_is_granted_and_consumed() {
    let (mut world, player) = world_with_player(0);
    world.entity_mut(player).insert(PowerUps::default());
    let near = world
        .spawn((PowerUpPickup { kind: PowerUpKind::DoubleShot, radius: 20.0 }, Transform::from_xyz(5.0, 0.0, 0.0)))
        .id();
    let far = world
        .spawn((PowerUpPickup { kind: PowerUpKind::Agility, radius: 20.0 }, Transform::from_xyz(200.0, 0.0, 0.0)))
        .id();

    run_system_once(&mut world, collect_power_ups);

    let owned = world.get::<PowerUps>(player).unwrap();
    assert!(owned.double_shot());
    assert!(!owned.has(PowerUpKind::Agility));
    assert!(world.get::<PendingDespawn>(near).is_some());
    assert!(world.get::<PendingDespawn>(far).is_none());
    assert_eq!(
        drain_messages::<CombatCue>(&mut world),
        vec![CombatCue::PowerUp { at: Vec2::new(5.0, 0.0), kind: PowerUpKind::DoubleShot }]
    );
}

fn loot_world() -> World {
    let mut world = message_world();
    world.insert_resource(AiRng::seeded(3));
    world
}

fn drop_count(world: &mut World) -> (usize, usize) {
    (
        world.query::<&HealthPickup>().iter(world).count(),
        world.query::<&PowerUpPickup>().iter(world).count(),
    )
}

#[test]
fn certain_loot_drops_both_kinds_beside_the_body_once() {
    let mut world = loot_world();
    let e = world
        .spawn((
            EnemyLifeState::Alive,
            Loot { health_chance: 1.0, power_up_chance: 1.0 },
            Transform::from_xyz(100.0, 50.0, 1.0),
            enemy_layers(),
        ))
        .id();

    world.write_message(ActorDied { actor: e, killer: None });
    run_system_once(&mut world, drop_loot);
    run_system_once(&mut world, enemy_death_trigger);
    assert_eq!(drop_count(&mut world), (1, 1));

    let (tf, _) = world.query::<(&Transform, &HealthPickup)>().single(&world).unwrap();
    assert!(tf.translation.x < 100.0);
    let (tf, _) = world.query::<(&Transform, &PowerUpPickup)>().single(&world).unwrap();
    assert!(tf.translation.x > 100.0);

    // A second death report for an actor already dying drops nothing.
    world.write_message(ActorDied { actor: e, killer: None });
    run_system_once(&mut world, drop_loot);
    assert_eq!(drop_count(&mut world), (1, 1));
}

#[test]
fn zero_chance_and_lootless_actors_drop_nothing() {
    let mut world = loot_world();
    let stingy = world
        .spawn((EnemyLifeState::Alive, Loot { health_chance: 0.0, power_up_chance: 0.0 }, Transform::default()))
        .id();
    let plain = world.spawn((EnemyLifeState::Alive, Transform::default())).id();

    world.write_message(ActorDied { actor: stingy, killer: None });
    world.write_message(ActorDied { actor: plain, killer: None });
    run_system_once(&mut world, drop_loot);

    assert_eq!(drop_count(&mut world), (0, 0));
}
