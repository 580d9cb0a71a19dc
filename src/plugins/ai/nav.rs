//! Navigation: the "path to point" service behaviors consume.
//!
//! Behaviors only ever talk to a [`NavAgent`]:
//! - `set_destination(point)`
//! - `is_stopped` (settable)
//! - read back `path_pending`, `path_status`, `remaining_distance`,
//!   `desired_velocity`
//!
//! Planning and steering live in two systems that run after every behavior
//! has written its intent for the tick:
//!
//! ```text
//!   FixedUpdate
//!   ┌─────────────────────────┐   ┌──────────────────┐   ┌─────────────────┐
//!   │ behaviors write intents │ → │ plan_nav_paths   │ → │ steer_nav_agents│ → LinearVelocity
//!   │ (set_destination)       │   │ (pending → plan) │   │ (waypoints)     │
//!   └─────────────────────────┘   └──────────────────┘   └─────────────────┘
//! ```
//!
//! The surface is deliberately simple: walkable bounds minus rectangular
//! blockers, routed over blocker corners. It is read-only to every behavior.

use std::f32::consts::TAU;

use avian2d::prelude::*;
use bevy::prelude::*;
use pathfinding::prelude::dijkstra;

use super::spatial::LineOfSight;

/// Result of the last plan for an agent's destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathStatus {
    #[default]
    Complete,
    Partial,
    Invalid,
}

/// A planned route: waypoints end at the destination when `Complete`.
#[derive(Clone, Debug, PartialEq)]
pub struct NavPath {
    pub status: PathStatus,
    pub waypoints: Vec<Vec2>,
}

impl NavPath {
    fn invalid() -> Self {
        Self { status: PathStatus::Invalid, waypoints: Vec::new() }
    }
}

/// Static walkable area: `bounds` minus `blockers`, shrunk by `clearance`.
#[derive(Resource, Debug, Clone)]
pub struct NavSurface {
    pub bounds: Rect,
    pub blockers: Vec<Rect>,
    /// Agent radius kept clear of every edge.
    pub clearance: f32,
}

impl Default for NavSurface {
    fn default() -> Self {
        Self::open(Rect::new(-1024.0, -576.0, 1024.0, 576.0))
    }
}

const SAMPLE_RINGS: usize = 4;
const SAMPLE_SPOKES: usize = 16;
const PARTIAL_MARCH_STEPS: usize = 16;

impl NavSurface {
    pub fn open(bounds: Rect) -> Self {
        Self { bounds, blockers: Vec::new(), clearance: 12.0 }
    }

    pub fn with_blocker(mut self, blocker: Rect) -> Self {
        self.blockers.push(blocker);
        self
    }

    pub fn is_walkable(&self, p: Vec2) -> bool {
        let inner = self.bounds.inflate(-self.clearance);
        if inner.is_empty() || !inner.contains(p) {
            return false;
        }
        !self.blockers.iter().any(|b| b.inflate(self.clearance).contains(p))
    }

    /// Project `p` onto the walkable surface, searching up to `max_distance`.
    pub fn sample_position(&self, p: Vec2, max_distance: f32) -> Option<Vec2> {
        if self.is_walkable(p) {
            return Some(p);
        }
        for ring in 1..=SAMPLE_RINGS {
            let r = max_distance * ring as f32 / SAMPLE_RINGS as f32;
            let found = (0..SAMPLE_SPOKES)
                .map(|k| p + Vec2::from_angle(TAU * k as f32 / SAMPLE_SPOKES as f32) * r)
                .find(|c| self.is_walkable(*c));
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Straight segment crosses a blocker (blockers as authored, no clearance).
    pub fn segment_blocked(&self, a: Vec2, b: Vec2) -> bool {
        self.blockers.iter().any(|r| segment_hits_rect(a, b, *r))
    }

    pub fn plan(&self, from: Vec2, to: Vec2) -> NavPath {
        if !self.is_walkable(to) {
            return NavPath::invalid();
        }
        if !self.segment_blocked(from, to) {
            return NavPath { status: PathStatus::Complete, waypoints: vec![to] };
        }

        match self.corner_route(from, to) {
            Some(waypoints) => NavPath { status: PathStatus::Complete, waypoints },
            None => NavPath {
                status: PathStatus::Partial,
                waypoints: vec![self.furthest_clear_point(from, to)],
            },
        }
    }

    /// Shortest route over the visibility graph of blocker corners.
    ///
    /// Nodes are indices into `nodes`; an edge exists wherever the straight
    /// segment between two nodes is clear. Costs are whole centipixels so the
    /// search can order them.
    fn corner_route(&self, from: Vec2, to: Vec2) -> Option<Vec<Vec2>> {
        const START: usize = 0;
        const GOAL: usize = 1;

        let mut nodes = vec![from, to];
        nodes.extend(
            self.blockers
                .iter()
                .flat_map(|r| corners(r.inflate(self.clearance * 1.5)))
                .filter(|c| self.is_walkable(*c)),
        );

        let (route, _cost) = dijkstra(
            &START,
            |&u| {
                let here = nodes[u];
                nodes
                    .iter()
                    .enumerate()
                    .filter(move |&(v, there)| v != u && !self.segment_blocked(here, *there))
                    .map(move |(v, there)| (v, edge_cost(here, *there)))
                    .collect::<Vec<_>>()
            },
            |&u| u == GOAL,
        )?;

        Some(route.into_iter().skip(1).map(|i| nodes[i]).collect())
    }

    fn furthest_clear_point(&self, from: Vec2, to: Vec2) -> Vec2 {
        let mut last = from;
        for i in 1..=PARTIAL_MARCH_STEPS {
            let p = from.lerp(to, i as f32 / PARTIAL_MARCH_STEPS as f32);
            if self.segment_blocked(from, p) || !self.is_walkable(p) {
                break;
            }
            last = p;
        }
        last
    }
}

impl LineOfSight for NavSurface {
    #[inline]
    fn blocked(&self, from: Vec2, to: Vec2) -> bool {
        self.segment_blocked(from, to)
    }
}

#[inline]
fn edge_cost(a: Vec2, b: Vec2) -> u32 {
    (a.distance(b) * 100.0).round() as u32
}

#[inline]
fn corners(r: Rect) -> [Vec2; 4] {
    [r.min, Vec2::new(r.max.x, r.min.y), r.max, Vec2::new(r.min.x, r.max.y)]
}

/// Liang-Barsky clip of segment a->b against `r`.
pub(crate) fn segment_hits_rect(a: Vec2, b: Vec2, r: Rect) -> bool {
    let d = b - a;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    let edges = [
        (-d.x, a.x - r.min.x),
        (d.x, r.max.x - a.x),
        (-d.y, a.y - r.min.y),
        (d.y, r.max.y - a.y),
    ];
    for (p, q) in edges {
        if p.abs() < f32::EPSILON {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return false;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return false;
            }
            t1 = t1.min(t);
        }
    }
    t0 <= t1
}

// -----------------------------------------------------------------------------
// Agent
// -----------------------------------------------------------------------------

/// Radius at which an intermediate waypoint counts as passed.
const WAYPOINT_REACH: f32 = 4.0;

#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub speed: f32,
    pub stopping_distance: f32,
    pub is_stopped: bool,
    destination: Option<Vec2>,
    pending: bool,
    status: PathStatus,
    waypoints: Vec<Vec2>,
    remaining_distance: f32,
    desired_velocity: Vec2,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            is_stopped: false,
            destination: None,
            pending: false,
            status: PathStatus::Complete,
            waypoints: Vec::new(),
            remaining_distance: 0.0,
            desired_velocity: Vec2::ZERO,
        }
    }

    /// Request a path to `point`. Setting the current destination again is a
    /// no-op; anything else re-plans on this tick's planning pass.
    pub fn set_destination(&mut self, point: Vec2) {
        if self.destination == Some(point) {
            return;
        }
        self.destination = Some(point);
        self.pending = true;
    }

    /// Forget the destination; the agent coasts to a halt.
    pub fn reset_path(&mut self) {
        self.destination = None;
        self.pending = false;
        self.status = PathStatus::Complete;
        self.waypoints.clear();
        self.remaining_distance = 0.0;
        self.desired_velocity = Vec2::ZERO;
    }

    #[inline]
    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    #[inline]
    pub fn path_pending(&self) -> bool {
        self.pending
    }

    #[inline]
    pub fn path_status(&self) -> PathStatus {
        self.status
    }

    #[inline]
    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    #[inline]
    pub fn desired_velocity(&self) -> Vec2 {
        self.desired_velocity
    }

    pub fn report(&self) -> NavReport {
        NavReport {
            has_destination: self.destination.is_some(),
            pending: self.pending,
            status: self.status,
            remaining_distance: self.remaining_distance,
            desired_velocity: self.desired_velocity,
        }
    }

    fn apply_plan(&mut self, from: Vec2, path: NavPath) {
        self.pending = false;
        self.status = path.status;
        self.waypoints = path.waypoints;
        self.remaining_distance = route_length(from, &self.waypoints);
    }
}

/// Read-only view of an agent handed to the behavior state machines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavReport {
    pub has_destination: bool,
    pub pending: bool,
    pub status: PathStatus,
    pub remaining_distance: f32,
    pub desired_velocity: Vec2,
}

impl Default for NavReport {
    fn default() -> Self {
        Self {
            has_destination: false,
            pending: false,
            status: PathStatus::Complete,
            remaining_distance: 0.0,
            desired_velocity: Vec2::ZERO,
        }
    }
}

impl NavReport {
    /// The planner answered and the answer was not a complete path.
    #[inline]
    pub fn failed(&self) -> bool {
        self.has_destination && !self.pending && self.status != PathStatus::Complete
    }
}

fn route_length(from: Vec2, waypoints: &[Vec2]) -> f32 {
    let mut len = 0.0;
    let mut prev = from;
    for w in waypoints {
        len += prev.distance(*w);
        prev = *w;
    }
    len
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

/// Plan every agent whose destination changed this tick.
pub fn plan_nav_paths(surface: Res<NavSurface>, mut q: Query<(&Transform, &mut NavAgent)>) {
    for (tf, mut agent) in &mut q {
        if !agent.pending {
            continue;
        }
        let Some(dest) = agent.destination else {
            agent.pending = false;
            continue;
        };
        let from = tf.translation.truncate();
        let path = surface.plan(from, dest);
        if path.status != PathStatus::Complete {
            debug!("nav: {:?} path from {from} to {dest}", path.status);
        }
        agent.apply_plan(from, path);
    }
}

/// Follow waypoints: update remaining distance and desired velocity, and
/// drive the body's velocity when it has one.
pub fn steer_nav_agents(
    time: Res<Time<Fixed>>,
    mut q: Query<(&Transform, &mut NavAgent, Option<&mut LinearVelocity>)>,
) {
    let dt = time.delta_secs().max(1e-4);

    for (tf, mut agent, vel) in &mut q {
        let pos = tf.translation.truncate();

        while agent.waypoints.len() > 1 && pos.distance(agent.waypoints[0]) <= WAYPOINT_REACH {
            agent.waypoints.remove(0);
        }
        agent.remaining_distance = route_length(pos, &agent.waypoints);

        let moving = agent.destination.is_some()
            && !agent.pending
            && agent.status != PathStatus::Invalid
            && agent.remaining_distance > agent.stopping_distance;

        agent.desired_velocity = match (moving, agent.waypoints.first()) {
            (true, Some(next)) => {
                let to = *next - pos;
                // Never overshoot the final stop in one step.
                let speed = agent.speed.min(agent.remaining_distance / dt);
                to.normalize_or_zero() * speed
            }
            _ => Vec2::ZERO,
        };

        if let Some(mut vel) = vel {
            vel.0 = if agent.is_stopped { Vec2::ZERO } else { agent.desired_velocity };
        }
    }
}
