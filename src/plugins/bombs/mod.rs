//! Bombs plugin: suicide enemies that chase on a lit fuse and explode.
//!
//! ```text
//! FixedUpdate (AiSet::Decide)
//!   bomb_think: BombBrain::tick -> nav intents + warning
//!               on detonation: overlap -> HealthSink -> Explosion cue -> PendingDespawn
//! ```
//!
//! Damage is resolved before the bomb is marked, and the brain reports the
//! detonation edge once, so extra ticks after the fuse ends do nothing.

pub mod brain;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::enemy_layers;
use crate::common::state::GameState;
use crate::plugins::ai::nav::NavAgent;
use crate::plugins::ai::spatial::{overlap_area, turn_towards};
use crate::plugins::ai::{AiSet, PlayerSnapshot};
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{Damageable, Health, HealthSink};
use crate::plugins::combat::lifecycle::{EnemyLifeState, PendingDespawn};

pub use brain::{BombBrain, BombConfig, BombIntents, BombState};

pub const BOMB_RADIUS: f32 = 14.0;

/// Turn rate toward the movement direction, per second.
const TURN_RATE: f32 = 10.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct Bomb;

/// Fuse warning intensity, read by presentation (glow, blink).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct BombWarning(pub f32);

pub fn plugin(app: &mut App) {
    app.add_systems(FixedUpdate, bomb_think.in_set(AiSet::Decide));
}

pub fn bomb_bundle(at: Vec2) -> impl Bundle {
    let cfg = BombConfig::default();
    (
        (
            Name::new("Bomb"),
            Bomb,
            BombBrain::default(),
            BombWarning::default(),
            NavAgent::new(cfg.idle_speed, 0.0),
            Health::new(cfg.max_health),
            EnemyLifeState::Alive,
            cfg,
        ),
        (
            Sprite {
                color: Color::srgb(0.55, 0.1, 0.9),
                custom_size: Some(Vec2::splat(BOMB_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_xyz(at.x, at.y, 1.0),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(BOMB_RADIUS),
            enemy_layers(),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
        ),
    )
}

pub fn bomb_think(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    snapshot: Res<PlayerSnapshot>,
    mut sink: HealthSink,
    mut cues: MessageWriter<CombatCue>,
    mut q_bombs: Query<
        (Entity, &BombConfig, &mut BombBrain, &mut BombWarning, &mut NavAgent, &mut Transform, &EnemyLifeState),
        (With<Bomb>, Without<PendingDespawn>, Without<Damageable>),
    >,
    q_targets: Query<(Entity, &Transform), (With<Damageable>, Without<Bomb>)>,
) {
    let dt = time.delta_secs();
    let player = snapshot.position();

    for (e, cfg, mut brain, mut warning, mut agent, mut tf, life) in &mut q_bombs {
        if !life.is_alive() {
            continue;
        }
        let position = tf.translation.truncate();
        let intents = brain.tick(cfg, dt, position, player);

        agent.speed = intents.speed;
        agent.is_stopped = intents.stopped;
        match intents.destination {
            Some(dest) => agent.set_destination(dest),
            None if intents.stopped => agent.reset_path(),
            None => {}
        }
        if let Some(w) = intents.warning {
            warning.0 = w;
        }
        turn_towards(&mut tf, agent.desired_velocity(), (dt * TURN_RATE).min(1.0));

        if intents.fuse_started {
            debug!("bomb {e}: fuse lit");
            cues.write(CombatCue::FuseStarted { bomb: e });
        }

        if intents.explode {
            let hits = overlap_area(
                position,
                cfg.explosion_range,
                q_targets.iter().map(|(t, t_tf)| (t, t_tf.translation.truncate())),
            );
            for target in &hits {
                sink.apply(*target, -cfg.damage, Some(e));
            }
            debug!("bomb {e}: exploded, {} hit", hits.len());
            cues.write(CombatCue::Explosion { at: position, radius: cfg.explosion_range });
            agent.reset_path();
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
