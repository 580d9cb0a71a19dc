//! Boss plugin: a dormant boss woken by a trigger zone, then cycling attack
//! modes until it dies.
//!
//! ```text
//! FixedUpdate (AiSet::Decide, chained)
//!   wake_boss_on_trigger: player inside a BossTrigger -> boss visible + solid
//!   boss_think:           BossSequencer::tick -> nav, facing, SpawnProjectile
//! FixedPostUpdate
//!   announce_boss_defeat: ActorDied on a Boss -> BossDefeated cue
//! ```
//!
//! Death goes through the shared `EnemyLifeState` lifecycle. `boss_think`
//! skips anything not `Alive`, which is all it takes to stop the sequencer
//! mid-mode.

pub mod sequencer;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::Occluder2d;

use crate::common::layers::{Layer, Team, enemy_layers, inert_layers};
use crate::common::state::GameState;
use crate::plugins::ai::nav::{NavAgent, NavSurface};
use crate::plugins::ai::spatial::{forward_of, turn_towards};
use crate::plugins::ai::{AiSet, PlayerSnapshot};
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{ActorDied, Damageable, Health};
use crate::plugins::combat::lifecycle::{EnemyLifeState, PendingDespawn, enemy_death_trigger};
use crate::plugins::projectiles::collision::process_projectile_collisions;
use crate::plugins::projectiles::components::HitEffect;
use crate::plugins::projectiles::messages::SpawnProjectile;

pub use sequencer::{BossConfig, BossInput, BossIntents, BossPhase, BossSequencer, BossShot, Facing, PHASE_CYCLE};

pub const BOSS_RADIUS: f32 = 30.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct Boss;

/// Zone that wakes `boss` the first time the player stands inside it.
#[derive(Component, Debug, Clone, Copy)]
pub struct BossTrigger {
    pub boss: Entity,
    pub radius: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (wake_boss_on_trigger, boss_think).chain().in_set(AiSet::Decide),
    )
    .add_systems(
        FixedPostUpdate,
        announce_boss_defeat
            .after(process_projectile_collisions)
            .before(enemy_death_trigger)
            .run_if(in_state(GameState::InGame)),
    );
}

/// A dormant boss: hidden, non-colliding and not damageable until woken.
pub fn boss_bundle(at: Vec2) -> impl Bundle {
    let cfg = BossConfig::default();
    (
        (
            Name::new("Boss"),
            Boss,
            BossSequencer::new(at),
            NavAgent::new(cfg.triangle.speed, cfg.stopping_distance),
            Health::new(cfg.max_health),
            EnemyLifeState::Alive,
            cfg,
        ),
        (
            Sprite {
                color: Color::srgb(0.85, 0.1, 0.2),
                custom_size: Some(Vec2::splat(BOSS_RADIUS * 2.0)),
                ..default()
            },
            Transform::from_xyz(at.x, at.y, 1.0),
            Visibility::Hidden,
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(BOSS_RADIUS),
            inert_layers(Layer::Enemy),
            LinearVelocity::ZERO,
            Occluder2d::circle(BOSS_RADIUS),
            DespawnOnExit(GameState::InGame),
        ),
    )
}

pub fn wake_boss_on_trigger(
    mut commands: Commands,
    snapshot: Res<PlayerSnapshot>,
    mut cues: MessageWriter<CombatCue>,
    q_triggers: Query<(Entity, &BossTrigger, &Transform), Without<PendingDespawn>>,
    mut q_boss: Query<(&mut BossSequencer, &mut Visibility, &mut CollisionLayers), With<Boss>>,
) {
    let Some(player) = snapshot.position() else {
        return;
    };

    for (trigger_e, trigger, tf) in &q_triggers {
        if tf.translation.truncate().distance(player) > trigger.radius {
            continue;
        }
        // The trigger is spent whether or not its boss is still around.
        commands.entity(trigger_e).insert(PendingDespawn);

        let Ok((mut seq, mut vis, mut layers)) = q_boss.get_mut(trigger.boss) else {
            warn!("boss trigger {trigger_e}: boss {} is gone", trigger.boss);
            continue;
        };
        if !seq.activate() {
            continue;
        }
        *vis = Visibility::Visible;
        *layers = enemy_layers();
        commands.entity(trigger.boss).insert(Damageable);
        cues.write(CombatCue::BossActivated { boss: trigger.boss });
        info!("boss {} awakened", trigger.boss);
    }
}

pub fn boss_think(
    time: Res<Time<Fixed>>,
    snapshot: Res<PlayerSnapshot>,
    surface: Res<NavSurface>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut cues: MessageWriter<CombatCue>,
    mut q: Query<(Entity, &BossConfig, &mut BossSequencer, &mut NavAgent, &mut Transform, &EnemyLifeState), With<Boss>>,
) {
    let dt = time.delta_secs();

    for (e, cfg, mut seq, mut agent, mut tf, life) in &mut q {
        if !life.is_alive() || seq.is_dormant() {
            continue;
        }

        let position = tf.translation.truncate();
        let input = BossInput {
            dt,
            position,
            forward: forward_of(&tf),
            player: snapshot.position(),
            nav: agent.report(),
            surface: &*surface,
        };
        let intents = seq.tick(cfg, &input);

        if let Some(speed) = intents.speed {
            agent.speed = speed;
        }
        if let Some(stopped) = intents.stopped {
            agent.is_stopped = stopped;
        }
        if let Some(dest) = intents.destination {
            agent.set_destination(dest);
        }

        let factor = (dt * cfg.turn_rate).min(1.0);
        match intents.facing {
            Facing::Player => {
                if let Some(p) = input.player {
                    turn_towards(&mut tf, p - position, factor);
                }
            }
            Facing::Movement => turn_towards(&mut tf, agent.desired_velocity(), factor),
            Facing::Keep => {}
        }

        if let Some(phase) = intents.phase_started {
            info!("boss {e}: mode {}", phase.number());
            cues.write(CombatCue::BossMode { boss: e, phase });
        }

        let effect = HitEffect::Slow { multiplier: cfg.slow_multiplier, duration: cfg.slow_duration };
        shots.write_batch(intents.shots.iter().map(|shot| {
            SpawnProjectile::new(Team::Enemy, position + shot.direction * shot.spawn_offset, shot.direction, shot.speed)
                .owned_by(e)
                .with_damage(cfg.damage)
                .with_effect(effect)
        }));
        if intents.shot_cue {
            cues.write(CombatCue::Shot { source: e });
        }
    }
}

/// Runs before the lifecycle flips the boss to `Dying`, on the same message.
pub fn announce_boss_defeat(
    mut deaths: MessageReader<ActorDied>,
    mut cues: MessageWriter<CombatCue>,
    q_boss: Query<&EnemyLifeState, With<Boss>>,
) {
    for died in deaths.read() {
        if q_boss.get(died.actor).is_ok_and(EnemyLifeState::is_alive) {
            info!("boss {} defeated", died.actor);
            cues.write(CombatCue::BossDefeated { boss: died.actor });
        }
    }
}
