//! Pickups and loot.
//!
//! - Health pickups heal the player on touch, unless already at full health.
//! - Power-up pickups grant a permanent upgrade, at most `MAX_POWER_UPS`.
//! - Enemies carrying `Loot` may drop either kind when they die.
//!
//! Pickups only record what the player owns (`PowerUps`); the player's own
//! systems turn that into speed, fire rate and double shots.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::state::GameState;
use crate::common::tunables::meters;
use crate::plugins::ai::{AiRng, PlayerSnapshot};

use super::cues::CombatCue;
use super::health::{ActorDied, HealthOutcome, HealthSink};
use super::lifecycle::{EnemyLifeState, PendingDespawn};

pub const MAX_POWER_UPS: usize = 3;

const PICKUP_Z: f32 = 0.8;

#[derive(Component, Debug, Clone, Copy)]
pub struct HealthPickup {
    pub amount: i32,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// +30% movement speed.
    Agility,
    /// Two shots side by side.
    DoubleShot,
    /// +30% fire rate.
    FireRate,
}

impl PowerUpKind {
    pub const ALL: [Self; 3] = [Self::Agility, Self::DoubleShot, Self::FireRate];

    fn color(self) -> Color {
        match self {
            Self::Agility => Color::srgb(0.35, 0.8, 1.0),
            Self::DoubleShot => Color::srgb(1.0, 0.6, 0.2),
            Self::FireRate => Color::srgb(1.0, 0.95, 0.3),
        }
    }
}

/// Result of offering a power-up to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    Added,
    /// Already owned: the pickup is still consumed.
    AlreadyActive,
    /// No room for a new kind: the pickup stays on the floor.
    Full,
}

/// Permanent upgrades the player has collected this round.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PowerUps {
    active: Vec<PowerUpKind>,
}

impl PowerUps {
    #[inline]
    pub fn has(&self, kind: PowerUpKind) -> bool {
        self.active.contains(&kind)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn grant(&mut self, kind: PowerUpKind) -> Grant {
        if self.has(kind) {
            return Grant::AlreadyActive;
        }
        if self.active.len() >= MAX_POWER_UPS {
            return Grant::Full;
        }
        self.active.push(kind);
        Grant::Added
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.has(PowerUpKind::Agility) { 1.3 } else { 1.0 }
    }

    pub fn fire_rate_multiplier(&self) -> f32 {
        if self.has(PowerUpKind::FireRate) { 1.3 } else { 1.0 }
    }

    #[inline]
    pub fn double_shot(&self) -> bool {
        self.has(PowerUpKind::DoubleShot)
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct PowerUpPickup {
    pub kind: PowerUpKind,
    pub radius: f32,
}

/// Drop chances rolled once when the carrier dies.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Loot {
    pub health_chance: f32,
    pub power_up_chance: f32,
}

impl Default for Loot {
    fn default() -> Self {
        Self { health_chance: 0.2, power_up_chance: 0.1 }
    }
}

pub fn health_pickup_bundle(at: Vec2) -> impl Bundle {
    (
        Name::new("HealthPickup"),
        HealthPickup { amount: 2, radius: meters(1.0) },
        Sprite::from_color(Color::srgb(0.3, 0.95, 0.4), Vec2::splat(16.0)),
        Transform::from_translation(at.extend(PICKUP_Z)),
        DespawnOnExit(GameState::InGame),
    )
}

pub fn power_up_bundle(at: Vec2, kind: PowerUpKind) -> impl Bundle {
    (
        Name::new(format!("PowerUp({kind:?})")),
        PowerUpPickup { kind, radius: meters(1.0) },
        Sprite::from_color(kind.color(), Vec2::splat(14.0)),
        Transform::from_translation(at.extend(PICKUP_Z)),
        DespawnOnExit(GameState::InGame),
    )
}

/// Consume pickups the player is standing on. A full-health player leaves the
/// pickup where it is.
pub fn collect_health_pickups(
    mut commands: Commands,
    snapshot: Res<PlayerSnapshot>,
    mut sink: HealthSink,
    mut cues: MessageWriter<CombatCue>,
    q: Query<(Entity, &Transform, &HealthPickup), Without<PendingDespawn>>,
) {
    let Some(player) = snapshot.0 else {
        return;
    };

    for (e, tf, pickup) in &q {
        let at = tf.translation.truncate();
        if at.distance_squared(player.position) > pickup.radius * pickup.radius {
            continue;
        }
        if sink.read(player.entity).is_none_or(|(current, max)| current >= max) {
            continue;
        }
        if sink.apply(player.entity, pickup.amount, Some(e)) != HealthOutcome::Healed {
            continue;
        }
        cues.write(CombatCue::Pickup { at });
        commands.entity(e).insert(PendingDespawn);
    }
}

pub fn collect_power_ups(
    mut commands: Commands,
    snapshot: Res<PlayerSnapshot>,
    mut cues: MessageWriter<CombatCue>,
    mut q_owned: Query<&mut PowerUps>,
    q: Query<(Entity, &Transform, &PowerUpPickup), Without<PendingDespawn>>,
) {
    let Some(player) = snapshot.0 else {
        return;
    };
    let Ok(mut owned) = q_owned.get_mut(player.entity) else {
        return;
    };

    for (e, tf, pickup) in &q {
        let at = tf.translation.truncate();
        if at.distance_squared(player.position) > pickup.radius * pickup.radius {
            continue;
        }
        match owned.grant(pickup.kind) {
            Grant::Full => continue,
            Grant::Added => info!("pickups: {:?} unlocked ({}/{MAX_POWER_UPS})", pickup.kind, owned.len()),
            Grant::AlreadyActive => {}
        }
        cues.write(CombatCue::PowerUp { at, kind: pickup.kind });
        commands.entity(e).insert(PendingDespawn);
    }
}

/// Roll loot for carriers that died this step. Runs before the lifecycle
/// moves them out of `Alive`, so each death rolls exactly once.
pub fn drop_loot(
    mut commands: Commands,
    mut deaths: MessageReader<ActorDied>,
    mut rng: ResMut<AiRng>,
    q: Query<(&Transform, &Loot, &EnemyLifeState), Without<PendingDespawn>>,
) {
    let offset = Vec2::X * meters(0.5);
    for died in deaths.read() {
        let Ok((tf, loot, life)) = q.get(died.actor) else {
            continue;
        };
        if !life.is_alive() {
            continue;
        }
        let at = tf.translation.truncate();

        if rng.0.random::<f32>() < loot.power_up_chance {
            let kind = PowerUpKind::ALL[rng.0.random_range(0..PowerUpKind::ALL.len())];
            commands.spawn(power_up_bundle(at + offset, kind));
            debug!("pickups: {} dropped {kind:?}", died.actor);
        }
        if rng.0.random::<f32>() < loot.health_chance {
            commands.spawn(health_pickup_bundle(at - offset));
            debug!("pickups: {} dropped health", died.actor);
        }
    }
}
