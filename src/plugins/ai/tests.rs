use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::test_utils::{TestRng, fixed_time_with_delta, run_system_once};
use crate::plugins::combat::health::Health;
use crate::plugins::player::{Player, PlayerMotor};

use super::clock::*;
use super::nav::*;
use super::patterns::*;
use super::spatial::*;
use super::*;

/// Blocks everything; for "occluded" cases.
struct Wall;

impl LineOfSight for Wall {
    fn blocked(&self, _from: Vec2, _to: Vec2) -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Clock
// -----------------------------------------------------------------------------

#[test]
fn cooldown_round_trip() {
    let mut c = Cooldown::new(0.25);
    assert!(c.ready());

    assert!(c.trigger());
    assert_eq!(c.remaining(), 0.25);
    assert!(!c.trigger());

    c.tick(0.25);
    assert!(c.ready());
    assert!(c.trigger());
}

#[test]
fn cooldown_never_goes_negative_randomized() {
    let mut rng = TestRng::new(0x00C0_01D0);
    for _case in 0..5_000 {
        let mut c = Cooldown::armed(rng.range_f32(0.0, 5.0));
        for _ in 0..10 {
            let before = c.remaining();
            c.tick(rng.range_f32(0.0, 1.0));
            assert!(c.remaining() >= 0.0);
            assert!(c.remaining() <= before);
        }
    }
}

#[test]
fn cadence_fires_immediately_then_every_interval() {
    let mut cad = Cadence::every(0.5);
    let fired: Vec<bool> = (0..6).map(|_| cad.tick(0.25)).collect();
    assert_eq!(fired, vec![true, false, true, false, true, false]);
}

#[test]
fn step_clock_times_out_strictly_after_limit() {
    let mut c = StepClock::with_limit(1.0);
    c.tick(1.0);
    assert!(!c.timed_out());
    c.tick(0.01);
    assert!(c.timed_out());
    assert_eq!(c.fraction(), 1.0);
}

#[test]
fn lerp_is_clamped() {
    assert_eq!(lerp(5.0, 50.0, 0.0), 5.0);
    assert_eq!(lerp(5.0, 50.0, 0.5), 27.5);
    assert_eq!(lerp(5.0, 50.0, 2.0), 50.0);
}

// -----------------------------------------------------------------------------
// Spatial
// -----------------------------------------------------------------------------

fn scout_profile() -> DetectionProfile {
    DetectionProfile { peripheral_radius: 4.0, view_radius: 12.0, view_angle_deg: 90.0 }
}

#[test]
fn peripheral_radius_ignores_facing_and_occlusion() {
    let p = scout_profile();
    // Directly behind, inside the peripheral radius.
    assert!(p.detects(Vec2::ZERO, Vec2::X, Some(Vec2::new(-3.9, 0.0)), &Wall));
}

#[test]
fn cone_edges_one_degree_inside_and_outside() {
    let p = scout_profile();
    let at = |deg: f32| Some(Vec2::from_angle(deg.to_radians()) * 8.0);

    assert!(p.detects(Vec2::ZERO, Vec2::X, at(44.0), &Unobstructed));
    assert!(p.detects(Vec2::ZERO, Vec2::X, at(-44.0), &Unobstructed));
    assert!(!p.detects(Vec2::ZERO, Vec2::X, at(46.0), &Unobstructed));
    assert!(!p.detects(Vec2::ZERO, Vec2::X, at(-46.0), &Unobstructed));
}

#[test]
fn cone_respects_range_and_occlusion() {
    let p = scout_profile();
    assert!(!p.detects(Vec2::ZERO, Vec2::X, Some(Vec2::new(12.5, 0.0)), &Unobstructed));
    assert!(!p.detects(Vec2::ZERO, Vec2::X, Some(Vec2::new(8.0, 0.0)), &Wall));
}

#[test]
fn missing_target_is_never_detected() {
    let p = scout_profile();
    assert!(!p.detects(Vec2::ZERO, Vec2::X, None, &Unobstructed));
    assert!(!in_radius(Vec2::ZERO, None, 1_000.0));
}

#[test]
fn overlap_area_returns_each_entity_once() {
    let mut world = World::new();
    let a = world.spawn_empty().id();
    let b = world.spawn_empty().id();
    let far = world.spawn_empty().id();

    let hits = overlap_area(
        Vec2::ZERO,
        2.0,
        [(a, Vec2::new(1.0, 0.0)), (a, Vec2::new(0.0, 1.0)), (b, Vec2::new(0.0, 2.0)), (far, Vec2::new(3.0, 0.0))],
    );
    assert_eq!(hits, vec![a, b]);
}

#[test]
fn turn_towards_snaps_and_ignores_zero() {
    let mut tf = Transform::default();
    turn_towards(&mut tf, Vec2::Y, 1.0);
    assert!(forward_of(&tf).distance(Vec2::Y) < 1e-4);

    turn_towards(&mut tf, Vec2::ZERO, 1.0);
    assert!(forward_of(&tf).distance(Vec2::Y) < 1e-4);
}

// -----------------------------------------------------------------------------
// Patterns
// -----------------------------------------------------------------------------

#[test]
fn ring_directions_are_evenly_spaced() {
    let dirs = ring_directions(8, 15.0);
    assert_eq!(dirs.len(), 8);
    for (j, d) in dirs.iter().enumerate() {
        let expected = (45.0 * j as f32 + 15.0).rem_euclid(360.0);
        assert!((heading_deg(*d) - expected).abs() < 1e-3);
    }
}

#[test]
fn spread_is_centered_on_base() {
    let dirs = spread_directions(Vec2::Y, 3, 15.0);
    let headings: Vec<f32> = dirs.iter().map(|d| heading_deg(*d)).collect();
    assert!((headings[0] - 82.5).abs() < 1e-3);
    assert!((headings[1] - 90.0).abs() < 1e-3);
    assert!((headings[2] - 97.5).abs() < 1e-3);

    assert_eq!(spread_directions(Vec2::X, 1, 15.0), vec![Vec2::X]);
    assert!(spread_directions(Vec2::X, 0, 15.0).is_empty());
}

// -----------------------------------------------------------------------------
// Navigation
// -----------------------------------------------------------------------------

fn arena_with_pillar() -> NavSurface {
    NavSurface::open(Rect::new(-500.0, -500.0, 500.0, 500.0)).with_blocker(Rect::new(-50.0, -50.0, 50.0, 50.0))
}

#[test]
fn plan_straight_detour_and_invalid() {
    let surface = arena_with_pillar();

    let straight = surface.plan(Vec2::new(-200.0, 200.0), Vec2::new(200.0, 200.0));
    assert_eq!(straight.status, PathStatus::Complete);
    assert_eq!(straight.waypoints.len(), 1);

    let detour = surface.plan(Vec2::new(-200.0, 0.0), Vec2::new(200.0, 0.0));
    assert_eq!(detour.status, PathStatus::Complete);
    assert!(detour.waypoints.len() >= 2);
    assert_eq!(detour.waypoints.last(), Some(&Vec2::new(200.0, 0.0)));
    assert!(!surface.segment_blocked(Vec2::new(-200.0, 0.0), detour.waypoints[0]));

    let inside_pillar = surface.plan(Vec2::new(-200.0, 0.0), Vec2::ZERO);
    assert_eq!(inside_pillar.status, PathStatus::Invalid);

    let outside_bounds = surface.plan(Vec2::ZERO, Vec2::new(900.0, 0.0));
    assert_eq!(outside_bounds.status, PathStatus::Invalid);
}

#[test]
fn detour_takes_the_shorter_side_with_clear_legs() {
    // Pillar hangs far below the straight line, so going over the top wins.
    let surface = NavSurface::open(Rect::new(-500.0, -500.0, 500.0, 500.0)).with_blocker(Rect::new(-50.0, -200.0, 50.0, 20.0));
    let from = Vec2::new(-200.0, 0.0);
    let to = Vec2::new(200.0, 0.0);

    let path = surface.plan(from, to);
    assert_eq!(path.status, PathStatus::Complete);
    assert_eq!(path.waypoints.last(), Some(&to));
    assert!(path.waypoints.iter().all(|w| w.y >= 0.0), "{:?}", path.waypoints);

    let mut prev = from;
    for w in &path.waypoints {
        assert!(!surface.segment_blocked(prev, *w));
        prev = *w;
    }
}

#[test]
fn walled_in_goal_yields_partial_path() {
    let surface = NavSurface::open(Rect::new(-500.0, -500.0, 500.0, 500.0))
        .with_blocker(Rect::new(-100.0, 80.0, 100.0, 100.0))
        .with_blocker(Rect::new(-100.0, -100.0, 100.0, -80.0))
        .with_blocker(Rect::new(-100.0, -100.0, -80.0, 100.0))
        .with_blocker(Rect::new(80.0, -100.0, 100.0, 100.0));
    let from = Vec2::new(-300.0, 0.0);

    let path = surface.plan(from, Vec2::ZERO);
    assert_eq!(path.status, PathStatus::Partial);
    assert_eq!(path.waypoints.len(), 1);
    assert!(path.waypoints[0].x < -100.0);
}

#[test]
fn sample_position_projects_onto_walkable_area() {
    let surface = arena_with_pillar();
    assert_eq!(surface.sample_position(Vec2::new(200.0, 0.0), 30.0), Some(Vec2::new(200.0, 0.0)));

    let near_edge = surface.sample_position(Vec2::new(495.0, 0.0), 30.0).unwrap();
    assert!(surface.is_walkable(near_edge));

    assert_eq!(surface.sample_position(Vec2::ZERO, 10.0), None);
}

#[test]
fn agent_plans_then_steers_toward_destination() {
    let mut world = World::new();
    world.insert_resource(NavSurface::open(Rect::new(-500.0, -500.0, 500.0, 500.0)));
    world.insert_resource(fixed_time_with_delta(1.0 / 50.0));

    let e = world.spawn((Transform::default(), NavAgent::new(100.0, 5.0), LinearVelocity::ZERO)).id();
    world.get_mut::<NavAgent>(e).unwrap().set_destination(Vec2::new(200.0, 0.0));
    assert!(world.get::<NavAgent>(e).unwrap().path_pending());

    run_system_once(&mut world, plan_nav_paths);
    run_system_once(&mut world, steer_nav_agents);

    let agent = world.get::<NavAgent>(e).unwrap();
    assert!(!agent.path_pending());
    assert_eq!(agent.path_status(), PathStatus::Complete);
    assert!((agent.remaining_distance() - 200.0).abs() < 1e-3);
    assert!((world.get::<LinearVelocity>(e).unwrap().0 - Vec2::new(100.0, 0.0)).length() < 1e-3);
}

#[test]
fn stopped_agent_and_invalid_path_do_not_move() {
    let mut world = World::new();
    world.insert_resource(arena_with_pillar());
    world.insert_resource(fixed_time_with_delta(1.0 / 50.0));

    let mut stopped = NavAgent::new(100.0, 5.0);
    stopped.is_stopped = true;
    stopped.set_destination(Vec2::new(200.0, 200.0));
    let a = world.spawn((Transform::from_xyz(-200.0, 200.0, 0.0), stopped, LinearVelocity::ZERO)).id();

    let mut invalid = NavAgent::new(100.0, 5.0);
    invalid.set_destination(Vec2::ZERO);
    let b = world.spawn((Transform::from_xyz(-200.0, 0.0, 0.0), invalid, LinearVelocity::ZERO)).id();

    run_system_once(&mut world, plan_nav_paths);
    run_system_once(&mut world, steer_nav_agents);

    assert_eq!(world.get::<LinearVelocity>(a).unwrap().0, Vec2::ZERO);
    assert_eq!(world.get::<LinearVelocity>(b).unwrap().0, Vec2::ZERO);
    assert!(world.get::<NavAgent>(b).unwrap().report().failed());
}

// -----------------------------------------------------------------------------
// Snapshot
// -----------------------------------------------------------------------------

#[test]
fn snapshot_reads_player_flags_and_drops_dead_player() {
    let mut world = World::new();
    world.init_resource::<PlayerSnapshot>();

    let mut hp = Health::new(3);
    hp.immune = true;
    let player = world.spawn((Player, Transform::from_xyz(4.0, 5.0, 1.0), hp, PlayerMotor::default())).id();

    run_system_once(&mut world, capture_player_snapshot);
    let view = world.resource::<PlayerSnapshot>().0.unwrap();
    assert_eq!(view.entity, player);
    assert_eq!(view.position, Vec2::new(4.0, 5.0));
    assert!(view.immune);
    assert!(!view.liquefied);

    {
        let mut hp = world.get_mut::<Health>(player).unwrap();
        hp.immune = false;
        hp.apply(-3);
    }

    run_system_once(&mut world, capture_player_snapshot);
    assert!(world.resource::<PlayerSnapshot>().0.is_none());
}
