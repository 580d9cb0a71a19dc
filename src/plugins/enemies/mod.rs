//! Enemies plugin: ground enemies driven by `EnemyBrain`.
//!
//! ---------------------------
//! HOW THIS IS DESIGNED (ECS)
//! ---------------------------
//! 1) FACTS live in components: `EnemyConfig` (tuning, never mutated),
//!    `EnemyBrain` (behavior state + timers), `NavAgent` (path following),
//!    `Health` / `EnemyLifeState` (combat).
//!
//! 2) RULES run once per fixed tick in `AiSet::Decide`:
//!    - read the frozen `PlayerSnapshot` and the agent's last `NavReport`
//!    - `EnemyBrain::tick` returns intents
//!    - intents become a nav destination, a facing, and `SpawnProjectile`
//!      messages
//!
//! 3) The brain never touches the world. Damage is resolved by the projectile
//!    pipeline, not here, so a volley fired on the tick the enemy dies still
//!    behaves like any other projectile.
//!
//! Only `Alive` enemies think. A dying enemy stops mid-sequence: its dwell,
//! search or cooldown simply stops being ticked.

pub mod brain;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;

use crate::common::layers::{Team, enemy_layers};
use crate::common::state::GameState;
use crate::plugins::ai::nav::{NavAgent, NavSurface};
use crate::plugins::ai::patterns::spread_directions;
use crate::plugins::ai::spatial::{forward_of, turn_towards};
use crate::plugins::ai::{AiRng, AiSet, PlayerSnapshot};
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{Damageable, Health};
use crate::plugins::combat::lifecycle::EnemyLifeState;
use crate::plugins::combat::pickups::Loot;
use crate::plugins::projectiles::messages::SpawnProjectile;

pub use brain::{BehaviorState, EnemyArchetype, EnemyBrain, EnemyConfig, EnemyInput, EnemyIntents, Volley};

pub const ENEMY_RADIUS: f32 = 16.0;

/// Turn rate toward the movement direction while walking (slerp factor per tick).
const WALK_TURN: f32 = 0.2;

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, enemy_think.in_set(AiSet::Decide));
}

/// Everything a ground enemy needs. The level decides where they go.
pub fn enemy_bundle(archetype: EnemyArchetype, at: Vec2) -> impl Bundle {
    let cfg = EnemyConfig::for_archetype(archetype);
    let color = match archetype {
        EnemyArchetype::Scout => Color::srgb(0.9, 0.25, 0.25),
        EnemyArchetype::Sentry => Color::srgb(0.95, 0.55, 0.2),
        EnemyArchetype::Spreader => Color::srgb(0.75, 0.3, 0.85),
    };

    (
        (
            Name::new(format!("{archetype:?}")),
            Enemy,
            EnemyBrain::new(at, &cfg),
            NavAgent::new(cfg.patrol_speed, cfg.stopping_distance),
            Health::new(cfg.max_health),
            Damageable,
            EnemyLifeState::Alive,
            Loot::default(),
            cfg,
        ),
        (
            Sprite {
                color,
                custom_size: Some(Vec2::splat(ENEMY_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_xyz(at.x, at.y, 1.0),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(ENEMY_RADIUS),
            enemy_layers(),
            LinearVelocity::ZERO,
            Occluder2d::circle(ENEMY_RADIUS),
            DespawnOnExit(GameState::InGame),
        ),
    )
}

/// Fan `volley.count` projectiles around `aim` from `origin`.
pub fn volley_requests(origin: Vec2, aim: Vec2, volley: &Volley, owner: Entity) -> impl Iterator<Item = SpawnProjectile> {
    let speed = volley.speed;
    let damage = volley.damage;
    let offset = volley.spawn_offset;
    spread_directions(aim, volley.count, volley.spread_deg)
        .into_iter()
        .map(move |dir| {
            SpawnProjectile::new(Team::Enemy, origin + dir * offset, dir, speed)
                .owned_by(owner)
                .with_damage(damage)
        })
}

/// One decision per alive enemy per fixed tick.
pub fn enemy_think(
    time: Res<Time<Fixed>>,
    snapshot: Res<PlayerSnapshot>,
    surface: Res<NavSurface>,
    mut rng: ResMut<AiRng>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut cues: MessageWriter<CombatCue>,
    mut q: Query<(Entity, &EnemyConfig, &mut EnemyBrain, &mut NavAgent, &mut Transform, &EnemyLifeState), With<Enemy>>,
) {
    let dt = time.delta_secs();
    let player = snapshot.position();

    for (e, cfg, mut brain, mut agent, mut tf, life) in &mut q {
        if !life.is_alive() {
            continue;
        }

        let position = tf.translation.truncate();
        let input = EnemyInput {
            dt,
            position,
            forward: forward_of(&tf),
            player,
            nav: agent.report(),
            sight: &*surface,
        };
        let before = brain.state();
        let intents = brain.tick(cfg, &input, &mut rng.0);
        if brain.state() != before {
            debug!("enemy {e}: {before:?} -> {:?}", brain.state());
        }

        agent.speed = intents.speed;
        agent.is_stopped = intents.stopped;
        if let Some(dest) = intents.destination {
            agent.set_destination(dest);
        }

        match intents.face {
            Some(dir) => turn_towards(&mut tf, dir, 1.0),
            None if !intents.stopped => turn_towards(&mut tf, agent.desired_velocity(), WALK_TURN),
            None => {}
        }

        if let Some(aim) = intents.volley {
            shots.write_batch(volley_requests(position, aim, &cfg.volley, e));
            cues.write(CombatCue::Shot { source: e });
        }
    }
}
