//! Boss phase scheduler as explicit resumable state.
//!
//! The boss runs a fixed cycle of modes, `1, 2, 1, 3` forever:
//!
//! - Mode 1: visit up to three triangle points around the spawn point, fire a
//!   three-ring spiral at each, then walk back to spawn.
//! - Mode 2: stand still and fire single shots at the player on a short
//!   interval.
//! - Mode 3: stand still and fire spread bursts at the player.
//!
//! Every step is a small enum variant holding its own clock. A tick advances
//! at most one step edge, and a new destination is always written on the
//! tick a step is entered, so the nav report read on the next tick belongs to
//! that destination.
//!
//! Failure policy: an invalid path or an expired travel clock abandons the
//! current point and moves on. Nothing here can wait forever except
//! `AwaitingPlayer`, which polls every tick by design.

use bevy::prelude::*;

use crate::common::tunables::meters;
use crate::plugins::ai::clock::{Countdown, StepClock};
use crate::plugins::ai::nav::{NavReport, NavSurface};
use crate::plugins::ai::patterns::{ring_directions, spread_directions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossPhase {
    TrianglePatrolBurst,
    FrontalVolley,
    SpreadConeBurst,
}

impl BossPhase {
    /// 1-based mode number, as designers refer to them.
    pub fn number(self) -> u8 {
        match self {
            Self::TrianglePatrolBurst => 1,
            Self::FrontalVolley => 2,
            Self::SpreadConeBurst => 3,
        }
    }
}

pub const PHASE_CYCLE: [BossPhase; 4] = [
    BossPhase::TrianglePatrolBurst,
    BossPhase::FrontalVolley,
    BossPhase::TrianglePatrolBurst,
    BossPhase::SpreadConeBurst,
];

#[derive(Clone, Debug, PartialEq)]
pub struct TriangleConfig {
    pub speed: f32,
    /// Patrol area around spawn; the triangle radius is 0.48 of its smaller side.
    pub area: Vec2,
    pub sample_radius: f32,
    /// Extra slack on top of the stopping distance for "arrived".
    pub arrive_epsilon: f32,
    pub travel_timeout: f32,
    pub volleys: usize,
    pub ring_count: usize,
    /// Each volley's ring is rotated this much further than the previous one.
    pub ring_step_deg: f32,
    pub volley_gap: f32,
    pub settle: f32,
    pub return_settle: f32,
    pub bullet_speed: f32,
    pub spawn_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrontalConfig {
    pub count: usize,
    pub interval: f32,
    pub bullet_speed: f32,
    pub spawn_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpreadConfig {
    pub bursts: usize,
    pub bullets_per_shot: usize,
    pub spread_deg: f32,
    pub cooldown: f32,
    pub bullet_speed: f32,
    pub spawn_offset: f32,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct BossConfig {
    pub max_health: i32,
    pub stopping_distance: f32,
    /// Yaw slerp rate per second.
    pub turn_rate: f32,
    pub damage: i32,
    /// Every boss projectile slows the player it hits.
    pub slow_multiplier: f32,
    pub slow_duration: f32,
    pub triangle: TriangleConfig,
    pub frontal: FrontalConfig,
    pub spread: SpreadConfig,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_health: 30,
            stopping_distance: meters(0.5),
            turn_rate: 8.0,
            damage: 1,
            slow_multiplier: 0.5,
            slow_duration: 2.0,
            triangle: TriangleConfig {
                speed: meters(8.0),
                area: Vec2::splat(meters(30.0)),
                sample_radius: meters(1.5),
                arrive_epsilon: meters(0.2),
                travel_timeout: 5.0,
                volleys: 3,
                ring_count: 8,
                ring_step_deg: 15.0,
                volley_gap: 0.5,
                settle: 0.5,
                return_settle: 0.1,
                bullet_speed: meters(8.0),
                spawn_offset: meters(2.0),
            },
            frontal: FrontalConfig {
                count: 10,
                interval: 0.12,
                bullet_speed: meters(3.0),
                spawn_offset: meters(2.5),
            },
            spread: SpreadConfig {
                bursts: 3,
                bullets_per_shot: 3,
                spread_deg: 15.0,
                cooldown: 0.5,
                bullet_speed: meters(12.0),
                spawn_offset: meters(2.5),
            },
        }
    }
}

impl BossConfig {
    #[inline]
    pub fn arrive_radius(&self) -> f32 {
        self.stopping_distance + self.triangle.arrive_epsilon
    }
}

/// Triangle corners around `center`, projected onto the surface. Corners with
/// no walkable spot within `sample_radius` are dropped.
pub fn triangle_points(center: Vec2, cfg: &TriangleConfig, surface: &NavSurface) -> Vec<Vec2> {
    let radius = cfg.area.min_element() * 0.48;
    (0..3)
        .filter_map(|i| {
            let corner = center + Vec2::from_angle((120.0 * i as f32).to_radians()) * radius;
            surface.sample_position(corner, cfg.sample_radius)
        })
        .collect()
}

pub struct BossInput<'a> {
    pub dt: f32,
    pub position: Vec2,
    pub forward: Vec2,
    pub player: Option<Vec2>,
    pub nav: NavReport,
    pub surface: &'a NavSurface,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Keep,
    Movement,
    Player,
}

/// One projectile the boss wants spawned this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossShot {
    pub direction: Vec2,
    pub speed: f32,
    pub spawn_offset: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BossIntents {
    pub destination: Option<Vec2>,
    /// `Some` when the agent's stopped flag should change.
    pub stopped: Option<bool>,
    pub speed: Option<f32>,
    pub facing: Facing,
    pub shots: Vec<BossShot>,
    pub phase_started: Option<BossPhase>,
    /// Play the per-shot cue (mode 2 cues every shot, the others once).
    pub shot_cue: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TriangleStep {
    Travel { clock: StepClock },
    Volley { fired: usize, wait: Countdown },
    Settle { wait: Countdown },
    Return { clock: StepClock },
    ReturnSettle { wait: Countdown },
}

#[derive(Clone, Debug, PartialEq)]
enum ModeRun {
    Triangle { points: Vec<Vec2>, index: usize, step: TriangleStep },
    Frontal { fired: usize, wait: Countdown },
    Spread { bursts: usize, wait: Countdown },
}

#[derive(Clone, Debug, PartialEq)]
enum SeqState {
    Dormant,
    AwaitingPlayer,
    Running { cycle: usize, mode: Option<ModeRun> },
}

#[derive(Component, Clone, Debug)]
pub struct BossSequencer {
    spawn: Vec2,
    state: SeqState,
}

impl BossSequencer {
    pub fn new(spawn: Vec2) -> Self {
        Self { spawn, state: SeqState::Dormant }
    }

    #[inline]
    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    #[inline]
    pub fn is_dormant(&self) -> bool {
        matches!(self.state, SeqState::Dormant)
    }

    /// Dormant -> AwaitingPlayer. Returns false if already active.
    pub fn activate(&mut self) -> bool {
        if !self.is_dormant() {
            return false;
        }
        self.state = SeqState::AwaitingPlayer;
        true
    }

    /// Mode currently running, if any.
    pub fn phase(&self) -> Option<BossPhase> {
        match &self.state {
            SeqState::Running { cycle, mode: Some(_) } => Some(PHASE_CYCLE[cycle % PHASE_CYCLE.len()]),
            _ => None,
        }
    }

    pub fn tick(&mut self, cfg: &BossConfig, input: &BossInput<'_>) -> BossIntents {
        let mut out = BossIntents::default();

        let spawn = self.spawn;
        match &mut self.state {
            SeqState::Dormant => {}
            SeqState::AwaitingPlayer => {
                if input.player.is_some() {
                    self.state = SeqState::Running { cycle: 0, mode: None };
                }
            }
            SeqState::Running { cycle, mode } => {
                let phase = PHASE_CYCLE[*cycle % PHASE_CYCLE.len()];
                if mode.is_none() {
                    *mode = Some(begin(phase, spawn, cfg, input, &mut out));
                    out.phase_started = Some(phase);
                    return out;
                }
                let Some(run) = mode.as_mut() else {
                    return out;
                };
                let finished = match run {
                    ModeRun::Triangle { points, index, step } => {
                        tick_triangle(cfg, input, spawn, points, index, step, &mut out)
                    }
                    ModeRun::Frontal { fired, wait } => tick_frontal(cfg, input, fired, wait, &mut out),
                    ModeRun::Spread { bursts, wait } => tick_spread(cfg, input, bursts, wait, &mut out),
                };
                if finished {
                    debug!("boss: mode {} done", phase.number());
                    out.stopped = Some(false);
                    *cycle += 1;
                    *mode = None;
                }
            }
        }
        out
    }
}

fn begin(phase: BossPhase, spawn: Vec2, cfg: &BossConfig, input: &BossInput<'_>, out: &mut BossIntents) -> ModeRun {
    match phase {
        BossPhase::TrianglePatrolBurst => {
            let points = triangle_points(spawn, &cfg.triangle, input.surface);
            out.speed = Some(cfg.triangle.speed);
            out.stopped = Some(false);
            if points.is_empty() {
                warn!("boss: no walkable triangle point around {spawn}");
                // Empty route: the first tick goes straight to the return leg.
                return ModeRun::Triangle { points, index: 0, step: TriangleStep::Travel { clock: StepClock::default() } };
            }
            out.destination = Some(points[0]);
            out.facing = Facing::Movement;
            ModeRun::Triangle {
                points,
                index: 0,
                step: TriangleStep::Travel { clock: StepClock::with_limit(cfg.triangle.travel_timeout) },
            }
        }
        BossPhase::FrontalVolley => {
            out.stopped = Some(true);
            ModeRun::Frontal { fired: 0, wait: Countdown::default() }
        }
        BossPhase::SpreadConeBurst => {
            out.stopped = Some(true);
            out.shot_cue = true;
            ModeRun::Spread { bursts: 0, wait: Countdown::default() }
        }
    }
}

/// Unit direction toward the player, or straight ahead without one.
fn aim(input: &BossInput<'_>) -> Vec2 {
    input
        .player
        .and_then(|p| (p - input.position).try_normalize())
        .unwrap_or(input.forward)
}

/// Start the leg toward point `index`, or the return leg once past the last.
fn enter_leg(cfg: &BossConfig, spawn: Vec2, points: &[Vec2], index: usize, out: &mut BossIntents) -> TriangleStep {
    let clock = StepClock::with_limit(cfg.triangle.travel_timeout);
    out.stopped = Some(false);
    out.facing = Facing::Movement;
    match points.get(index) {
        Some(p) => {
            out.destination = Some(*p);
            TriangleStep::Travel { clock }
        }
        None => {
            out.destination = Some(spawn);
            TriangleStep::Return { clock }
        }
    }
}

fn fire_ring(cfg: &TriangleConfig, volley: usize, out: &mut BossIntents) {
    let offset = volley as f32 * cfg.ring_step_deg;
    out.shots.extend(ring_directions(cfg.ring_count, offset).into_iter().map(|direction| BossShot {
        direction,
        speed: cfg.bullet_speed,
        spawn_offset: cfg.spawn_offset,
    }));
}

/// Returns true once the mode is over.
fn tick_triangle(
    cfg: &BossConfig,
    input: &BossInput<'_>,
    spawn: Vec2,
    points: &[Vec2],
    index: &mut usize,
    step: &mut TriangleStep,
    out: &mut BossIntents,
) -> bool {
    let tri = &cfg.triangle;
    match step {
        TriangleStep::Travel { clock } => {
            let Some(target) = points.get(*index).copied() else {
                *step = enter_leg(cfg, spawn, points, *index, out);
                return false;
            };
            clock.tick(input.dt);
            out.facing = Facing::Movement;

            if input.position.distance(target) <= cfg.arrive_radius() {
                out.stopped = Some(true);
                out.facing = Facing::Player;
                fire_ring(tri, 0, out);
                out.shot_cue = true;
                *step = TriangleStep::Volley { fired: 1, wait: Countdown::new(tri.volley_gap) };
            } else if input.nav.failed() {
                warn!("boss: no path to triangle point {target}, skipping");
                *index += 1;
                *step = enter_leg(cfg, spawn, points, *index, out);
            } else if clock.timed_out() {
                warn!("boss: timed out reaching triangle point {target}, skipping");
                *index += 1;
                *step = enter_leg(cfg, spawn, points, *index, out);
            }
            false
        }
        TriangleStep::Volley { fired, wait } => {
            out.facing = Facing::Player;
            wait.tick(input.dt);
            if !wait.is_done() {
                return false;
            }
            if *fired < tri.volleys {
                fire_ring(tri, *fired, out);
                *fired += 1;
                *wait = Countdown::new(tri.volley_gap);
            } else {
                *step = TriangleStep::Settle { wait: Countdown::new(tri.settle) };
            }
            false
        }
        TriangleStep::Settle { wait } => {
            out.facing = Facing::Player;
            wait.tick(input.dt);
            if wait.is_done() {
                *index += 1;
                *step = enter_leg(cfg, spawn, points, *index, out);
            }
            false
        }
        TriangleStep::Return { clock } => {
            clock.tick(input.dt);
            out.facing = Facing::Movement;
            let reason = if input.position.distance(spawn) <= cfg.arrive_radius() {
                None
            } else if input.nav.failed() {
                Some("no path")
            } else if clock.timed_out() {
                Some("timed out")
            } else {
                return false;
            };
            if let Some(reason) = reason {
                warn!("boss: {reason} returning to spawn, settling in place");
            }
            out.stopped = Some(true);
            out.facing = Facing::Player;
            *step = TriangleStep::ReturnSettle { wait: Countdown::new(tri.return_settle) };
            false
        }
        TriangleStep::ReturnSettle { wait } => {
            out.facing = Facing::Player;
            wait.tick(input.dt);
            wait.is_done()
        }
    }
}

fn tick_frontal(cfg: &BossConfig, input: &BossInput<'_>, fired: &mut usize, wait: &mut Countdown, out: &mut BossIntents) -> bool {
    let f = &cfg.frontal;
    out.facing = Facing::Player;
    wait.tick(input.dt);
    if !wait.is_done() {
        return false;
    }
    if *fired >= f.count {
        return true;
    }
    // Re-aimed every shot.
    out.shots.push(BossShot { direction: aim(input), speed: f.bullet_speed, spawn_offset: f.spawn_offset });
    out.shot_cue = true;
    *fired += 1;
    *wait = Countdown::new(f.interval);
    false
}

fn tick_spread(cfg: &BossConfig, input: &BossInput<'_>, bursts: &mut usize, wait: &mut Countdown, out: &mut BossIntents) -> bool {
    let s = &cfg.spread;
    out.facing = Facing::Player;
    wait.tick(input.dt);
    if !wait.is_done() {
        return false;
    }
    if *bursts >= s.bursts {
        return true;
    }
    out.shots.extend(
        spread_directions(aim(input), s.bullets_per_shot, s.spread_deg)
            .into_iter()
            .map(|direction| BossShot { direction, speed: s.bullet_speed, spawn_offset: s.spawn_offset }),
    );
    *bursts += 1;
    *wait = Countdown::new(s.cooldown);
    false
}
