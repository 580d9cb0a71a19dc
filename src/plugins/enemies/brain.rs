//! Ground enemy behavior: Patrol / Chase / Attack / Search as plain data.
//!
//! `EnemyBrain::tick` is a pure function of its input: no ECS access, no
//! clocks of its own. The ECS glue in `super` feeds it one `EnemyInput` per
//! fixed tick and applies the returned `EnemyIntents`.
//!
//! ```text
//!            detected (player inside leash)
//!   Patrol ──────────────────────────────▶ Chase ◀──────┐
//!     ▲  ▲                                  │  │         │ out of range
//!     │  ├──── actor beyond leash ──────────┘  │ in range│
//!     │  │                                     ▼         │
//!     │  └──── actor beyond leash ────────── Attack ─────┘
//!     │                                        │
//!     │   arrive / timeout / no path           │ player lost
//!     └──────────────── Search ◀───────────────┘ (also from Chase)
//! ```
//!
//! Patrol itself alternates Travel and Dwell steps. Breaking the leash puts
//! it in a Return step that walks home and ignores the player until it gets
//! there, times out or has no path. Every scripted wait is a
//! `StepClock` stored in the brain, so dropping the component cancels it.

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::meters;
use crate::plugins::ai::clock::{Cadence, Cooldown, StepClock};
use crate::plugins::ai::nav::NavReport;
use crate::plugins::ai::spatial::{DetectionProfile, LineOfSight};

/// Rejection-sampling attempts before falling back to the farthest corner.
const PATROL_PICK_ATTEMPTS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyArchetype {
    /// Cone vision, single fast shot.
    Scout,
    /// Radius vision, fires once mid-dwell.
    Sentry,
    /// Radius vision, three-bullet spread on a long cooldown.
    Spreader,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorState {
    Patrol,
    Chase,
    Attack,
    Search,
}

/// One trigger pull: `count` bullets fanned over `spread_deg`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volley {
    pub count: usize,
    pub spread_deg: f32,
    pub speed: f32,
    pub damage: i32,
    pub spawn_offset: f32,
    pub cooldown: f32,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct EnemyConfig {
    pub archetype: EnemyArchetype,
    pub max_health: i32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub stopping_distance: f32,
    pub detection: DetectionProfile,
    /// Detection runs on this cadence, not every tick.
    pub check_interval: f32,
    pub attack_range: f32,
    /// Chase starts only while the player is this close to home, and stops
    /// once the actor itself strays farther.
    pub leash: f32,
    /// Patrol region centered on home.
    pub home_half_extents: Vec2,
    pub edge_buffer: f32,
    pub min_patrol_distance: f32,
    pub patrol_timeout: f32,
    pub dwell: f32,
    /// Fraction of the dwell at which one volley is fired if the player is
    /// detected. `None` never fires while dwelling.
    pub dwell_shot_at: Option<f32>,
    pub search_timeout: f32,
    pub volley: Volley,
}

impl EnemyConfig {
    pub fn for_archetype(archetype: EnemyArchetype) -> Self {
        match archetype {
            EnemyArchetype::Scout => Self {
                archetype,
                max_health: 5,
                patrol_speed: meters(3.0),
                chase_speed: meters(3.0),
                stopping_distance: meters(0.4),
                detection: DetectionProfile {
                    peripheral_radius: meters(4.0),
                    view_radius: meters(12.0),
                    view_angle_deg: 90.0,
                },
                check_interval: 0.5,
                attack_range: meters(6.0),
                leash: meters(15.0),
                home_half_extents: Vec2::splat(meters(5.0)),
                edge_buffer: meters(1.0),
                min_patrol_distance: meters(5.0),
                patrol_timeout: 6.0,
                dwell: 1.0,
                dwell_shot_at: None,
                search_timeout: 5.0,
                volley: Volley {
                    count: 1,
                    spread_deg: 0.0,
                    speed: meters(15.0),
                    damage: 1,
                    spawn_offset: meters(1.0),
                    cooldown: 1.0,
                },
            },
            EnemyArchetype::Sentry => Self {
                archetype,
                max_health: 5,
                patrol_speed: meters(3.0),
                chase_speed: meters(4.5),
                stopping_distance: meters(0.5),
                detection: DetectionProfile {
                    peripheral_radius: meters(10.0),
                    view_radius: 0.0,
                    view_angle_deg: 0.0,
                },
                check_interval: 0.2,
                attack_range: meters(5.0),
                leash: meters(15.0),
                home_half_extents: Vec2::splat(meters(5.0)),
                edge_buffer: 0.0,
                min_patrol_distance: meters(2.0),
                patrol_timeout: 6.0,
                dwell: 2.0,
                dwell_shot_at: Some(0.5),
                search_timeout: 4.0,
                volley: Volley {
                    count: 1,
                    spread_deg: 0.0,
                    speed: meters(5.0),
                    damage: 1,
                    spawn_offset: meters(0.5),
                    cooldown: 2.0,
                },
            },
            EnemyArchetype::Spreader => Self {
                archetype,
                max_health: 10,
                patrol_speed: meters(3.0),
                chase_speed: meters(3.0),
                stopping_distance: meters(0.5),
                detection: DetectionProfile {
                    peripheral_radius: meters(10.0),
                    view_radius: 0.0,
                    view_angle_deg: 0.0,
                },
                check_interval: 0.2,
                attack_range: meters(5.0),
                leash: meters(20.0),
                home_half_extents: Vec2::splat(meters(5.0)),
                edge_buffer: 0.0,
                min_patrol_distance: meters(2.0),
                patrol_timeout: 6.0,
                dwell: 2.0,
                dwell_shot_at: Some(1.0),
                search_timeout: 4.0,
                volley: Volley {
                    count: 3,
                    spread_deg: 15.0,
                    speed: meters(12.0),
                    damage: 1,
                    spawn_offset: meters(1.5),
                    cooldown: 3.0,
                },
            },
        }
    }

    /// Direct-distance arrival radius for scripted points.
    #[inline]
    pub fn arrive_radius(&self) -> f32 {
        self.stopping_distance + meters(0.1)
    }

    /// Inner patrol rectangle around `home`.
    pub fn patrol_bounds(&self, home: Vec2) -> Rect {
        let half = (self.home_half_extents - Vec2::splat(self.edge_buffer)).max(Vec2::ZERO);
        Rect::from_center_half_size(home, half)
    }
}

/// Pick a point inside `bounds` at least `min_distance` from `from`.
///
/// Falls back to the corner farthest from `from` when sampling keeps
/// missing, so the caller always gets a point inside the bounds.
pub fn pick_patrol_point(bounds: Rect, from: Vec2, min_distance: f32, rng: &mut impl Rng) -> Vec2 {
    let min_sq = min_distance * min_distance;
    if bounds.width() > 0.0 && bounds.height() > 0.0 {
        for _ in 0..PATROL_PICK_ATTEMPTS {
            let p = Vec2::new(
                rng.random_range(bounds.min.x..=bounds.max.x),
                rng.random_range(bounds.min.y..=bounds.max.y),
            );
            if p.distance_squared(from) >= min_sq {
                return p;
            }
        }
    }

    [
        bounds.min,
        bounds.max,
        Vec2::new(bounds.min.x, bounds.max.y),
        Vec2::new(bounds.max.x, bounds.min.y),
    ]
    .into_iter()
    .max_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    .unwrap_or(bounds.center())
}

/// Everything the brain may read this tick.
pub struct EnemyInput<'a, S: LineOfSight> {
    pub dt: f32,
    pub position: Vec2,
    pub forward: Vec2,
    /// Snapshot of the living player, if any.
    pub player: Option<Vec2>,
    pub nav: NavReport,
    pub sight: &'a S,
}

/// What the brain wants done this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyIntents {
    pub destination: Option<Vec2>,
    pub stopped: bool,
    pub speed: f32,
    /// Snap to face this direction (attack / dwell aim).
    pub face: Option<Vec2>,
    /// Fire one volley centered on this direction.
    pub volley: Option<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PatrolStep {
    Return { clock: StepClock },
    Travel { target: Vec2, clock: StepClock },
    Dwell { clock: StepClock, shot: bool },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SearchStep {
    target: Vec2,
    clock: StepClock,
}

#[derive(Component, Clone, Debug)]
pub struct EnemyBrain {
    home: Vec2,
    state: BehaviorState,
    patrol: Option<PatrolStep>,
    search: Option<SearchStep>,
    last_known: Option<Vec2>,
    detect: Cadence,
    seen: bool,
    fire: Cooldown,
}

impl EnemyBrain {
    pub fn new(home: Vec2, cfg: &EnemyConfig) -> Self {
        Self {
            home,
            state: BehaviorState::Patrol,
            patrol: None,
            search: None,
            last_known: None,
            detect: Cadence::every(cfg.check_interval),
            seen: false,
            fire: Cooldown::new(cfg.volley.cooldown),
        }
    }

    #[inline]
    pub fn state(&self) -> BehaviorState {
        self.state
    }

    #[inline]
    pub fn home(&self) -> Vec2 {
        self.home
    }

    #[inline]
    pub fn last_known(&self) -> Option<Vec2> {
        self.last_known
    }

    /// Current patrol target while travelling.
    pub fn patrol_target(&self) -> Option<Vec2> {
        match self.patrol {
            Some(PatrolStep::Travel { target, .. }) => Some(target),
            _ => None,
        }
    }

    pub fn is_dwelling(&self) -> bool {
        matches!(self.patrol, Some(PatrolStep::Dwell { .. }))
    }

    /// Walking back home after breaking the leash.
    pub fn is_returning(&self) -> bool {
        matches!(self.patrol, Some(PatrolStep::Return { .. }))
    }

    /// Entering a state drops every state-local timer.
    fn enter(&mut self, next: BehaviorState) {
        if self.state == next {
            return;
        }
        debug!("enemy: {:?} -> {next:?}", self.state);
        self.state = next;
        self.patrol = None;
        self.search = None;
    }

    pub fn tick<S: LineOfSight>(
        &mut self,
        cfg: &EnemyConfig,
        input: &EnemyInput<'_, S>,
        rng: &mut impl Rng,
    ) -> EnemyIntents {
        self.fire.tick(input.dt);

        if input.player.is_none() {
            self.seen = false;
        } else if self.detect.tick(input.dt) {
            self.seen = cfg.detection.detects(input.position, input.forward, input.player, input.sight);
        }

        if matches!(self.state, BehaviorState::Patrol | BehaviorState::Search)
            && !self.is_returning()
            && self.seen
            && let Some(player) = input.player
            && player.distance(self.home) <= cfg.leash
            && input.position.distance(self.home) <= cfg.leash
        {
            self.last_known = Some(player);
            self.enter(BehaviorState::Chase);
        }

        match self.state {
            BehaviorState::Patrol => self.patrol(cfg, input, rng),
            BehaviorState::Chase => self.chase(cfg, input),
            BehaviorState::Attack => self.attack(cfg, input),
            BehaviorState::Search => self.search(cfg, input, rng),
        }
    }

    fn patrol<S: LineOfSight>(&mut self, cfg: &EnemyConfig, input: &EnemyInput<'_, S>, rng: &mut impl Rng) -> EnemyIntents {
        let mut out = EnemyIntents { speed: cfg.patrol_speed, ..default() };

        match &mut self.patrol {
            Some(PatrolStep::Return { clock }) => {
                clock.tick(input.dt);
                if input.position.distance(self.home) <= cfg.arrive_radius() {
                    self.patrol = None;
                    out.stopped = true;
                } else if input.nav.failed() || clock.timed_out() {
                    debug!("enemy: could not get home, patrolling from here");
                    self.patrol = None;
                    out.stopped = true;
                } else {
                    out.destination = Some(self.home);
                }
            }
            None => {
                let target = pick_patrol_point(cfg.patrol_bounds(self.home), input.position, cfg.min_patrol_distance, rng);
                self.patrol = Some(PatrolStep::Travel { target, clock: StepClock::with_limit(cfg.patrol_timeout) });
                // New destination: the nav report is stale until the next plan.
                out.destination = Some(target);
            }
            Some(PatrolStep::Travel { target, clock }) => {
                clock.tick(input.dt);
                let target = *target;
                if input.position.distance(target) <= cfg.arrive_radius() {
                    self.patrol = Some(PatrolStep::Dwell { clock: StepClock::with_limit(cfg.dwell), shot: false });
                    out.stopped = true;
                } else if input.nav.failed() || clock.timed_out() {
                    debug!("enemy: patrol point {target} abandoned");
                    self.patrol = None;
                    out.stopped = true;
                } else {
                    out.destination = Some(target);
                }
            }
            Some(PatrolStep::Dwell { clock, shot }) => {
                clock.tick(input.dt);
                out.stopped = true;

                if let Some(at) = cfg.dwell_shot_at
                    && !*shot
                    && clock.elapsed() >= cfg.dwell * at
                {
                    *shot = true;
                    if self.seen
                        && let Some(aim) = aim_at(input.position, input.player)
                    {
                        out.face = Some(aim);
                        out.volley = Some(aim);
                    }
                }

                if clock.elapsed() >= cfg.dwell {
                    self.patrol = None;
                }
            }
        }
        out
    }

    fn chase<S: LineOfSight>(&mut self, cfg: &EnemyConfig, input: &EnemyInput<'_, S>) -> EnemyIntents {
        let Some(player) = input.player else {
            self.enter(BehaviorState::Search);
            return EnemyIntents { speed: cfg.patrol_speed, stopped: true, ..default() };
        };
        self.last_known = Some(player);

        if input.position.distance(self.home) > cfg.leash {
            return self.head_home(cfg);
        }
        if input.position.distance(player) <= cfg.attack_range {
            self.enter(BehaviorState::Attack);
            return self.attack(cfg, input);
        }

        let mut out = EnemyIntents { speed: cfg.chase_speed, destination: Some(player), ..default() };
        if input.nav.failed() {
            // Unreachable: hold position and keep facing the player.
            out.stopped = true;
            out.face = aim_at(input.position, Some(player));
        }
        out
    }

    fn attack<S: LineOfSight>(&mut self, cfg: &EnemyConfig, input: &EnemyInput<'_, S>) -> EnemyIntents {
        let Some(player) = input.player else {
            self.enter(BehaviorState::Search);
            return EnemyIntents { speed: cfg.patrol_speed, stopped: true, ..default() };
        };
        self.last_known = Some(player);

        if input.position.distance(self.home) > cfg.leash {
            return self.head_home(cfg);
        }
        if input.position.distance(player) > cfg.attack_range {
            self.enter(BehaviorState::Chase);
            return self.chase(cfg, input);
        }

        let aim = aim_at(input.position, Some(player));
        let mut out = EnemyIntents { speed: cfg.chase_speed, stopped: true, face: aim, ..default() };
        if let Some(aim) = aim
            && self.fire.trigger()
        {
            out.volley = Some(aim);
        }
        out
    }

    /// Leash broken: back to Patrol, walking home before anything else.
    fn head_home(&mut self, cfg: &EnemyConfig) -> EnemyIntents {
        debug!("enemy: leash broken, heading home to {}", self.home);
        self.enter(BehaviorState::Patrol);
        self.patrol = Some(PatrolStep::Return { clock: StepClock::with_limit(cfg.patrol_timeout * 2.0) });
        EnemyIntents { speed: cfg.patrol_speed, destination: Some(self.home), ..default() }
    }

    fn search<S: LineOfSight>(&mut self, cfg: &EnemyConfig, input: &EnemyInput<'_, S>, rng: &mut impl Rng) -> EnemyIntents {
        let mut out = EnemyIntents { speed: cfg.patrol_speed, ..default() };

        let Some(step) = &mut self.search else {
            let Some(target) = self.last_known else {
                self.enter(BehaviorState::Patrol);
                return self.patrol(cfg, input, rng);
            };
            self.search = Some(SearchStep { target, clock: StepClock::with_limit(cfg.search_timeout) });
            out.destination = Some(target);
            return out;
        };

        step.clock.tick(input.dt);
        let target = step.target;
        if input.position.distance(target) <= cfg.arrive_radius() || input.nav.failed() || step.clock.timed_out() {
            self.enter(BehaviorState::Patrol);
            out.stopped = true;
            return out;
        }
        out.destination = Some(target);
        out
    }
}

#[inline]
fn aim_at(from: Vec2, target: Option<Vec2>) -> Option<Vec2> {
    target.and_then(|t| (t - from).try_normalize())
}
