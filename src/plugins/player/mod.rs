//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, latch it into the `PlayerInput` resource
//! - FixedUpdate (`PlayerSet`, before the AI snapshot):
//!   status effects -> goo -> motor (dash / liquefy / move) -> trigger
//! - FixedPostUpdate: player death -> `GameState::PlayerDown`
//!
//! The player's transform, immunity and liquefied flags are written only here.
//! Enemies read them through `PlayerSnapshot`.

pub mod motor;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Team, liquefied_player_layers, player_layers};
use crate::common::state::GameState;
use crate::common::tunables::{Tunables, meters};
use crate::plugins::ai::AiSet;
use crate::plugins::ai::clock::Cooldown;
use crate::plugins::camera::MainCamera;
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{ActorDied, Damageable, Health};
use crate::plugins::combat::pickups::PowerUps;
use crate::plugins::projectiles::collision::process_projectile_collisions;
use crate::plugins::projectiles::components::HitEffect;
use crate::plugins::projectiles::messages::{HitEffectLanded, SpawnProjectile};
use crate::plugins::world::GooZone;

pub use motor::PlayerMotor;

pub const PLAYER_RADIUS: f32 = 13.0;
pub const PLAYER_MAX_HEALTH: i32 = 5;

/// Sideways distance between the two bullets of a double shot.
const DOUBLE_SHOT_GAP: f32 = 12.0;

#[derive(Component)]
pub struct Player;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerSet;

/// Player weapon: single click shots on a fire-rate cooldown.
#[derive(Component, Debug, Clone)]
pub struct PlayerGun {
    pub cooldown: Cooldown,
    pub speed: f32,
    pub damage: i32,
    pub spawn_offset: f32,
    pub lifetime: f32,
}

impl PlayerGun {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            cooldown: Cooldown::new(1.0 / t.player_fire_rate.max(0.01)),
            speed: t.player_bullet_speed,
            damage: 1,
            spawn_offset: meters(1.0),
            lifetime: t.player_bullet_lifetime,
        }
    }
}

/// Input sampled in `Update`. Button presses are latched until the next
/// fixed step consumes them, so a press between two steps is never lost.
#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    /// Cursor in world space, when the cursor is over the window.
    pub aim: Option<Vec2>,
    pub fire: bool,
    pub dash: bool,
    pub liquefy: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(Update, restart_on_space.run_if(in_state(GameState::PlayerDown)));

    app.configure_sets(FixedUpdate, PlayerSet.before(AiSet::Snapshot).run_if(in_state(GameState::InGame)));
    app.add_systems(
        FixedUpdate,
        (apply_hit_effects, wade_through_goo, drive_player, pull_trigger)
            .chain()
            .in_set(PlayerSet),
    );

    app.add_systems(
        FixedPostUpdate,
        player_down_on_death
            .after(process_projectile_collisions)
            .run_if(in_state(GameState::InGame)),
    );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("Player"),
        Player,
        PlayerMotor::default().with_base_speed(tunables.player_speed),
        PlayerGun::from_tunables(&tunables),
        PowerUps::default(),
        Health::new(PLAYER_MAX_HEALTH),
        Damageable,
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(PLAYER_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_xyz(0.0, -meters(20.0), 1.0),
        (
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(PLAYER_RADIUS),
            player_layers(),
            LinearVelocity::ZERO,
        ),
        // The camera follows this body every frame; smooth it between steps.
        TranslationInterpolation,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut input: ResMut<PlayerInput>,
) {
    if let Some(keys) = keys {
        let mut axis = Vec2::ZERO;
        if keys.pressed(KeyCode::KeyW) {
            axis.y += 1.0;
        }
        if keys.pressed(KeyCode::KeyS) {
            axis.y -= 1.0;
        }
        if keys.pressed(KeyCode::KeyA) {
            axis.x -= 1.0;
        }
        if keys.pressed(KeyCode::KeyD) {
            axis.x += 1.0;
        }
        input.move_axis = axis.normalize_or_zero();
        input.dash |= keys.just_pressed(KeyCode::Space);
        input.liquefy |= keys.just_pressed(KeyCode::KeyQ);
    }

    if let Some(buttons) = buttons {
        input.fire |= buttons.just_pressed(MouseButton::Left);
    }

    input.aim = windows
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .zip(q_camera.single().ok())
        .and_then(|(cursor, (camera, camera_tf))| camera.viewport_to_world_2d(camera_tf, cursor).ok());
}

/// Slow debuffs and other effects carried by projectiles that hit the player.
fn apply_hit_effects(
    mut landed: MessageReader<HitEffectLanded>,
    mut q_player: Query<&mut PlayerMotor, With<Player>>,
) {
    for ev in landed.read() {
        let Ok(mut motor) = q_player.get_mut(ev.target) else {
            continue;
        };
        match ev.effect {
            HitEffect::Slow { multiplier, duration } => {
                motor.apply_speed_modifier(multiplier, duration);
                debug!("player: slowed to {:.0}% for {duration}s", multiplier * 100.0);
            }
        }
    }
}

/// Enter/exit edges for goo pools. Overlapping pools count as one.
fn wade_through_goo(
    mut cues: MessageWriter<CombatCue>,
    q_goo: Query<(&Transform, &GooZone)>,
    mut q_player: Query<(Entity, &Transform, &mut PlayerMotor), With<Player>>,
) {
    let Ok((entity, tf, mut motor)) = q_player.single_mut() else {
        return;
    };
    let at = tf.translation.truncate();
    let underfoot = q_goo
        .iter()
        .find(|(goo_tf, goo)| goo.contains(goo_tf.translation.truncate(), at))
        .map(|(_, goo)| goo.multiplier);

    match (underfoot, motor.terrain()) {
        (Some(multiplier), None) => {
            motor.set_terrain(Some(multiplier));
            cues.write(CombatCue::SlimeWalk { player: entity });
            debug!("player: in goo, speed x{multiplier}");
        }
        (None, Some(_)) => motor.set_terrain(None),
        _ => {}
    }
}

fn drive_player(
    time: Res<Time<Fixed>>,
    mut input: ResMut<PlayerInput>,
    mut cues: MessageWriter<CombatCue>,
    mut q_player: Query<
        (
            Entity,
            &Transform,
            &PowerUps,
            &mut PlayerMotor,
            &mut Health,
            &mut LinearVelocity,
            &mut CollisionLayers,
        ),
        With<Player>,
    >,
) {
    let Ok((entity, tf, powers, mut motor, mut health, mut vel, mut layers)) = q_player.single_mut() else {
        return;
    };
    motor.set_boost(powers.speed_multiplier());

    if std::mem::take(&mut input.dash) {
        let aim_dir = input.aim.map(|a| a - tf.translation.truncate()).unwrap_or(Vec2::ZERO);
        let dir = if input.move_axis != Vec2::ZERO { input.move_axis } else { aim_dir };
        if motor.try_dash(dir) {
            cues.write(CombatCue::Dash { player: entity });
        }
    }
    if std::mem::take(&mut input.liquefy) && motor.try_liquefy() {
        cues.write(CombatCue::Liquefy { player: entity });
    }

    motor.tick(time.delta_secs());

    health.immune = motor.is_dashing();
    vel.0 = motor.velocity(input.move_axis);
    *layers = if motor.is_liquefied() { liquefied_player_layers() } else { player_layers() };
}

fn pull_trigger(
    time: Res<Time<Fixed>>,
    mut input: ResMut<PlayerInput>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut cues: MessageWriter<CombatCue>,
    mut q_player: Query<(Entity, &Transform, &PowerUps, &mut PlayerGun), With<Player>>,
) {
    let Ok((entity, tf, powers, mut gun)) = q_player.single_mut() else {
        return;
    };
    // Faster fire rate is the same cooldown drained faster.
    gun.cooldown.tick(time.delta_secs() * powers.fire_rate_multiplier());

    if !std::mem::take(&mut input.fire) || !gun.cooldown.ready() {
        return;
    }
    let origin = tf.translation.truncate();
    let dir = match input.aim.map(|a| a - origin) {
        Some(d) if d.length_squared() > 1e-4 => d.normalize(),
        // No cursor: shoot where the body faces.
        _ => (tf.rotation * Vec3::X).truncate(),
    };

    gun.cooldown.rearm();
    let muzzle = origin + dir * gun.spawn_offset;
    let shot = |at: Vec2| {
        SpawnProjectile::new(Team::Player, at, dir, gun.speed)
            .owned_by(entity)
            .with_damage(gun.damage)
            .with_lifetime(gun.lifetime)
    };
    if powers.double_shot() {
        let side = dir.perp() * (DOUBLE_SHOT_GAP * 0.5);
        shots.write_batch([shot(muzzle + side), shot(muzzle - side)]);
    } else {
        shots.write(shot(muzzle));
    }
    cues.write(CombatCue::Shot { source: entity });
}

fn player_down_on_death(
    mut deaths: MessageReader<ActorDied>,
    q_player: Query<(), With<Player>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if deaths.read().any(|d| q_player.contains(d.actor)) {
        info!("player: down");
        next.set(GameState::PlayerDown);
    }
}

fn restart_on_space(keys: Option<Res<ButtonInput<KeyCode>>>, mut next: ResMut<NextState<GameState>>) {
    if keys.is_some_and(|k| k.just_pressed(KeyCode::Space)) {
        next.set(GameState::InGame);
    }
}

#[cfg(test)]
mod tests;
