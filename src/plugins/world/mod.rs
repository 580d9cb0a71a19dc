//! World plugin: the arena, its navigation surface and who lives in it.
//!
//! Walls and pillars are static colliders. The same pillar list feeds the
//! `NavSurface` resource, so what blocks bodies also blocks paths and sight.
//! Goo pools are floor decals: they block nothing and only slow the player.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::wall_layers;
use crate::common::state::GameState;
use crate::common::tunables::meters;
use crate::plugins::ai::nav::NavSurface;
use crate::plugins::bombs::bomb_bundle;
use crate::plugins::boss::{BossTrigger, boss_bundle};
use crate::plugins::combat::pickups::health_pickup_bundle;
use crate::plugins::enemies::{ENEMY_RADIUS, EnemyArchetype, enemy_bundle};

const TILE: i32 = 64;
const HALF_W: i32 = TILE * 16;
const HALF_H: i32 = TILE * 9;

/// Pillars as (center, size).
pub const PILLARS: [(Vec2, Vec2); 3] = [
    (Vec2::new(-300.0, -100.0), Vec2::new(96.0, 160.0)),
    (Vec2::new(0.0, 250.0), Vec2::new(200.0, 64.0)),
    (Vec2::new(-700.0, 200.0), Vec2::new(96.0, 96.0)),
];

pub const ENEMY_SPAWNS: [(EnemyArchetype, Vec2); 3] = [
    (EnemyArchetype::Scout, Vec2::new(-500.0, 250.0)),
    (EnemyArchetype::Sentry, Vec2::new(-600.0, -300.0)),
    (EnemyArchetype::Spreader, Vec2::new(-100.0, 450.0)),
];

pub const BOMB_SPAWNS: [Vec2; 2] = [Vec2::new(-200.0, 150.0), Vec2::new(200.0, -100.0)];

pub const PICKUP_SPAWNS: [Vec2; 2] = [Vec2::new(-800.0, -450.0), Vec2::new(800.0, -450.0)];

/// Goo pools as (center, size).
pub const GOO_POOLS: [(Vec2, Vec2); 2] = [
    (Vec2::new(-450.0, -150.0), Vec2::new(160.0, 100.0)),
    (Vec2::new(300.0, -300.0), Vec2::new(200.0, 120.0)),
];

pub const GOO_MULTIPLIER: f32 = 0.3;

pub const BOSS_SPAWN: Vec2 = Vec2::new(600.0, 200.0);
pub const BOSS_TRIGGER: Vec2 = Vec2::new(350.0, 100.0);

/// Sticky floor: scales player speed by `multiplier` while inside.
#[derive(Component, Debug, Clone, Copy)]
pub struct GooZone {
    pub half_size: Vec2,
    pub multiplier: f32,
}

impl GooZone {
    #[inline]
    pub fn contains(&self, center: Vec2, p: Vec2) -> bool {
        Rect::from_center_half_size(center, self.half_size).contains(p)
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(arena_surface());
    app.add_systems(OnEnter(GameState::InGame), (spawn_arena, spawn_floor, spawn_goo, spawn_population));
}

/// Walkable area of the arena: the inside of the walls minus the pillars.
pub fn arena_surface() -> NavSurface {
    let bounds = Rect::new(-HALF_W as f32, -HALF_H as f32, HALF_W as f32, HALF_H as f32);
    PILLARS.iter().fold(NavSurface { clearance: ENEMY_RADIUS, ..NavSurface::open(bounds) }, |surface, (center, size)| {
        surface.with_blocker(Rect::from_center_size(*center, *size))
    })
}

fn spawn_arena(mut commands: Commands) {
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let thickness = 30.0;

    let mut spawn_block = |name: String, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.5)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers(),
            DespawnOnExit(GameState::InGame),
        ));
    };

    spawn_block(
        "WallTop".into(),
        Vec2::new(0.0, HALF_H as f32 + thickness * 0.5),
        Vec2::new(HALF_W as f32 * 2.0 + thickness * 2.0, thickness),
    );
    spawn_block(
        "WallBottom".into(),
        Vec2::new(0.0, -HALF_H as f32 - thickness * 0.5),
        Vec2::new(HALF_W as f32 * 2.0 + thickness * 2.0, thickness),
    );
    spawn_block(
        "WallLeft".into(),
        Vec2::new(-HALF_W as f32 - thickness * 0.5, 0.0),
        Vec2::new(thickness, HALF_H as f32 * 2.0),
    );
    spawn_block(
        "WallRight".into(),
        Vec2::new(HALF_W as f32 + thickness * 0.5, 0.0),
        Vec2::new(thickness, HALF_H as f32 * 2.0),
    );

    for (i, (center, size)) in PILLARS.iter().enumerate() {
        spawn_block(format!("Pillar{i}"), *center, *size);
    }
}

/// Solid-color checkerboard, so the project needs no assets.
fn spawn_floor(mut commands: Commands) {
    (-(HALF_H / TILE)..=HALF_H / TILE)
        .flat_map(|y| (-(HALF_W / TILE)..=HALF_W / TILE).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let world_pos = Vec3::new(x as f32 * TILE as f32, y as f32 * TILE as f32, 0.0);
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE as f32)),
                Transform::from_translation(world_pos),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

fn spawn_goo(mut commands: Commands) {
    for (i, (center, size)) in GOO_POOLS.iter().enumerate() {
        commands.spawn((
            Name::new(format!("Goo{i}")),
            GooZone { half_size: *size * 0.5, multiplier: GOO_MULTIPLIER },
            Sprite::from_color(Color::srgba(0.35, 0.85, 0.3, 0.55), *size),
            Transform::from_translation(center.extend(0.2)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_population(mut commands: Commands) {
    for (archetype, at) in ENEMY_SPAWNS {
        commands.spawn(enemy_bundle(archetype, at));
    }
    for at in BOMB_SPAWNS {
        commands.spawn(bomb_bundle(at));
    }
    for at in PICKUP_SPAWNS {
        commands.spawn(health_pickup_bundle(at));
    }

    let boss = commands.spawn(boss_bundle(BOSS_SPAWN)).id();
    commands.spawn((
        Name::new("BossTrigger"),
        BossTrigger { boss, radius: meters(4.0) },
        Transform::from_translation(BOSS_TRIGGER.extend(0.0)),
        DespawnOnExit(GameState::InGame),
    ));
    debug!("world: population spawned, boss {boss} dormant");
}
