//! Bomb enemy: Idle -> Fuse -> Exploded.
//!
//! Once the player comes within `detection_range` the fuse is lit and can no
//! longer be cancelled by the player leaving. The bomb chases at
//! `chase_speed` while the warning intensity ramps linearly from
//! `warning_low` to `warning_high`, and explodes in place when the fuse runs
//! out, whether or not it caught anyone.

use bevy::prelude::*;

use crate::common::tunables::meters;
use crate::plugins::ai::clock::{StepClock, lerp};

#[derive(Component, Clone, Debug, PartialEq)]
pub struct BombConfig {
    pub max_health: i32,
    pub idle_speed: f32,
    pub chase_speed: f32,
    pub detection_range: f32,
    pub explosion_range: f32,
    pub fuse: f32,
    pub damage: i32,
    /// Warning intensity at the start and end of the fuse.
    pub warning_low: f32,
    pub warning_high: f32,
}

impl Default for BombConfig {
    fn default() -> Self {
        Self {
            max_health: 5,
            idle_speed: meters(2.0),
            chase_speed: meters(7.0),
            detection_range: meters(7.0),
            explosion_range: meters(2.0),
            fuse: 3.0,
            damage: 2,
            warning_low: 5.0,
            warning_high: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BombState {
    Idle,
    Fuse { clock: StepClock },
    Exploded,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BombIntents {
    pub destination: Option<Vec2>,
    pub stopped: bool,
    pub speed: f32,
    /// Current warning intensity while the fuse burns.
    pub warning: Option<f32>,
    /// Edge: the fuse was lit this tick.
    pub fuse_started: bool,
    /// Edge: detonate this tick. Reported at most once per bomb.
    pub explode: bool,
}

#[derive(Component, Clone, Debug)]
pub struct BombBrain {
    state: BombState,
}

impl Default for BombBrain {
    fn default() -> Self {
        Self { state: BombState::Idle }
    }
}

impl BombBrain {
    #[inline]
    pub fn state(&self) -> BombState {
        self.state
    }

    #[inline]
    pub fn has_exploded(&self) -> bool {
        matches!(self.state, BombState::Exploded)
    }

    pub fn tick(&mut self, cfg: &BombConfig, dt: f32, position: Vec2, player: Option<Vec2>) -> BombIntents {
        match &mut self.state {
            BombState::Idle => {
                let in_range = player.is_some_and(|p| p.distance(position) <= cfg.detection_range);
                if !in_range {
                    return BombIntents { stopped: true, speed: cfg.idle_speed, ..default() };
                }
                self.state = BombState::Fuse { clock: StepClock::with_limit(cfg.fuse) };
                BombIntents {
                    destination: player,
                    speed: cfg.chase_speed,
                    warning: Some(cfg.warning_low),
                    fuse_started: true,
                    ..default()
                }
            }
            BombState::Fuse { clock } => {
                clock.tick(dt);
                let warning = lerp(cfg.warning_low, cfg.warning_high, clock.fraction());
                if clock.elapsed() >= cfg.fuse {
                    self.state = BombState::Exploded;
                    return BombIntents { stopped: true, speed: 0.0, warning: Some(warning), explode: true, ..default() };
                }
                // No player: the fuse keeps burning, the bomb just stays put.
                BombIntents {
                    destination: player,
                    stopped: player.is_none(),
                    speed: cfg.chase_speed,
                    warning: Some(warning),
                    ..default()
                }
            }
            BombState::Exploded => BombIntents { stopped: true, ..default() },
        }
    }
}
