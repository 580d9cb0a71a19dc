//! Player movement abilities as plain data: dash charges, liquefy and speed
//! modifiers.
//!
//! Walking speed is `base_speed` scaled by three independent factors: the
//! permanent boost from power-ups, a timed modifier (hit effects) and the
//! terrain underfoot. Liquid speed replaces all of them. Ticked once per fixed step by the player's own systems; nothing
//! else writes it.

use bevy::prelude::*;

use crate::common::tunables::meters;
use crate::plugins::ai::clock::{Cooldown, Countdown};

pub const DASH_CHARGES: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SpeedModifier {
    multiplier: f32,
    remaining: Countdown,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDash {
    dir: Vec2,
    remaining: Countdown,
}

/// Edges produced by one `tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotorEvents {
    pub dash_ended: bool,
    pub liquefy_ended: bool,
    pub charges_restored: u8,
}

#[derive(Component, Debug, Clone)]
pub struct PlayerMotor {
    pub base_speed: f32,
    pub dash_speed: f32,
    pub liquid_speed: f32,
    pub dash_duration: f32,
    pub dash_recharge: f32,
    pub liquid_duration: f32,
    charges: u8,
    dash_cooldown: Cooldown,
    dash: Option<ActiveDash>,
    recharging: Vec<Countdown>,
    liquid_cooldown: Cooldown,
    liquid: Option<Countdown>,
    modifier: Option<SpeedModifier>,
    boost: f32,
    terrain: Option<f32>,
}

impl Default for PlayerMotor {
    fn default() -> Self {
        Self {
            base_speed: meters(5.0),
            dash_speed: meters(10.0),
            liquid_speed: meters(3.0),
            dash_duration: 0.5,
            dash_recharge: 5.5,
            liquid_duration: 2.0,
            charges: DASH_CHARGES,
            dash_cooldown: Cooldown::new(1.0),
            dash: None,
            recharging: Vec::new(),
            liquid_cooldown: Cooldown::new(5.0),
            liquid: None,
            modifier: None,
            boost: 1.0,
            terrain: None,
        }
    }
}

impl PlayerMotor {
    pub fn with_base_speed(mut self, speed: f32) -> Self {
        self.base_speed = speed;
        self
    }

    #[inline]
    pub fn charges(&self) -> u8 {
        self.charges
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    #[inline]
    pub fn is_liquefied(&self) -> bool {
        self.liquid.is_some()
    }

    pub fn dash_cooldown(&self) -> &Cooldown {
        &self.dash_cooldown
    }

    pub fn liquid_cooldown(&self) -> &Cooldown {
        &self.liquid_cooldown
    }

    /// Spend a charge if one is available and the cooldown has elapsed.
    pub fn try_dash(&mut self, dir: Vec2) -> bool {
        if self.charges == 0 || !self.dash_cooldown.ready() {
            return false;
        }
        self.dash_cooldown.rearm();
        self.charges -= 1;
        self.dash = Some(ActiveDash {
            dir: dir.normalize_or_zero(),
            remaining: Countdown::new(self.dash_duration),
        });
        true
    }

    /// Liquefy unless already liquid or cooling down. Clears any speed
    /// modifier: liquid speed replaces it and base speed follows.
    pub fn try_liquefy(&mut self) -> bool {
        if self.liquid.is_some() || !self.liquid_cooldown.trigger() {
            return false;
        }
        self.liquid = Some(Countdown::new(self.liquid_duration));
        self.modifier = None;
        true
    }

    /// Scale base speed by `multiplier` for `duration` seconds. A newer
    /// modifier replaces the previous one.
    pub fn apply_speed_modifier(&mut self, multiplier: f32, duration: f32) {
        self.modifier = Some(SpeedModifier { multiplier: multiplier.max(0.0), remaining: Countdown::new(duration) });
    }

    pub fn clear_speed_modifier(&mut self) {
        self.modifier = None;
    }

    /// Permanent multiplier from upgrades.
    pub fn set_boost(&mut self, boost: f32) {
        self.boost = boost.max(0.0);
    }

    /// Multiplier from the ground the player stands on; `None` is plain floor.
    pub fn set_terrain(&mut self, multiplier: Option<f32>) {
        self.terrain = multiplier.map(|m| m.max(0.0));
    }

    #[inline]
    pub fn terrain(&self) -> Option<f32> {
        self.terrain
    }

    pub fn current_speed(&self) -> f32 {
        if self.liquid.is_some() {
            return self.liquid_speed;
        }
        self.base_speed * self.boost * self.modifier.map_or(1.0, |m| m.multiplier) * self.terrain.unwrap_or(1.0)
    }

    /// Velocity for this step given the (normalized) move input.
    pub fn velocity(&self, move_axis: Vec2) -> Vec2 {
        match self.dash {
            Some(dash) => dash.dir * self.dash_speed,
            None => move_axis * self.current_speed(),
        }
    }

    pub fn tick(&mut self, dt: f32) -> MotorEvents {
        let mut events = MotorEvents::default();

        self.dash_cooldown.tick(dt);
        self.liquid_cooldown.tick(dt);

        if let Some(dash) = &mut self.dash {
            dash.remaining.tick(dt);
            if dash.remaining.is_done() {
                self.dash = None;
                self.recharging.push(Countdown::new(self.dash_recharge));
                events.dash_ended = true;
            }
        }

        // A charge spent this tick starts recharging next tick.
        let fresh = usize::from(events.dash_ended);
        let ticking = self.recharging.len() - fresh;
        for timer in &mut self.recharging[..ticking] {
            timer.tick(dt);
        }
        let before = self.recharging.len();
        self.recharging.retain(|t| !t.is_done());
        let restored = (before - self.recharging.len()) as u8;
        self.charges = (self.charges + restored).min(DASH_CHARGES);
        events.charges_restored = restored;

        if let Some(liquid) = &mut self.liquid {
            liquid.tick(dt);
            if liquid.is_done() {
                self.liquid = None;
                events.liquefy_ended = true;
            }
        }

        if let Some(modifier) = &mut self.modifier {
            modifier.remaining.tick(dt);
            if modifier.remaining.is_done() {
                self.modifier = None;
            }
        }

        events
    }
}
