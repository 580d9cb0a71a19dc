//! Health bookkeeping: the only way hit points change.
//!
//! `Health::apply` is the single mutation path. `HealthSink` wraps it for
//! systems and turns the outcome into `ActorHit` / `ActorDied` messages, so a
//! death is reported exactly once per alive -> zero transition.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
    /// Negative applies are ignored while set (dash i-frames).
    pub immune: bool,
}

/// What a single `apply` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthOutcome {
    /// Nothing changed: immune, already at zero, or a zero amount.
    Ignored,
    Healed,
    Hit,
    /// A hit that took the actor from alive to zero.
    Died,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max, immune: false }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Apply a signed amount: negative damages, positive heals.
    ///
    /// Invariants:
    /// - `0 <= current <= max` after every call
    /// - once at zero, every apply is ignored until `reset`
    pub fn apply(&mut self, amount: i32) -> HealthOutcome {
        if amount == 0 || (amount < 0 && self.immune) || self.current <= 0 {
            return HealthOutcome::Ignored;
        }

        let old = self.current;
        self.current = old.saturating_add(amount).clamp(0, self.max);

        if amount > 0 {
            return HealthOutcome::Healed;
        }
        if old > 0 && self.current == 0 {
            HealthOutcome::Died
        } else {
            HealthOutcome::Hit
        }
    }

    /// External reset (respawn).
    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

/// Receives area damage (explosions). Projectiles use collision layers instead.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Damageable;

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorHit {
    pub actor: Entity,
    /// Damage taken (positive).
    pub amount: i32,
    pub source: Option<Entity>,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorHealed {
    pub actor: Entity,
    pub amount: i32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorDied {
    pub actor: Entity,
    pub killer: Option<Entity>,
}

/// `apply(actor, signed_amount)` for systems.
#[derive(SystemParam)]
pub struct HealthSink<'w, 's> {
    health: Query<'w, 's, &'static mut Health>,
    hits: MessageWriter<'w, ActorHit>,
    heals: MessageWriter<'w, ActorHealed>,
    deaths: MessageWriter<'w, ActorDied>,
}

impl HealthSink<'_, '_> {
    /// Apply to `actor`. Entities without `Health` are ignored.
    pub fn apply(&mut self, actor: Entity, amount: i32, source: Option<Entity>) -> HealthOutcome {
        let Ok(mut health) = self.health.get_mut(actor) else {
            return HealthOutcome::Ignored;
        };

        let outcome = health.apply(amount);
        match outcome {
            HealthOutcome::Ignored => {}
            HealthOutcome::Healed => {
                self.heals.write(ActorHealed { actor, amount });
            }
            HealthOutcome::Hit => {
                self.hits.write(ActorHit { actor, amount: -amount, source });
            }
            HealthOutcome::Died => {
                self.hits.write(ActorHit { actor, amount: -amount, source });
                self.deaths.write(ActorDied { actor, killer: source });
                debug!("health: {actor} died");
            }
        }
        outcome
    }

    /// `(current, max)` for `actor`, if it has health.
    pub fn read(&self, actor: Entity) -> Option<(i32, i32)> {
        self.health.get(actor).ok().map(|h| (h.current(), h.max()))
    }
}
