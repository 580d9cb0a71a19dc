//! Behavior clock: the timer primitives every timed sub-sequence is built from.
//!
//! Nothing here blocks. A "wait" is a value that is ticked once per fixed step
//! and checked against a threshold, so a sequence can be resumed (keep ticking)
//! or cancelled (stop ticking / despawn) at any point.
//!
//! All durations are in seconds of `Time<Fixed>`.

/// Remaining time until something happens. Only ever moves toward zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Countdown(f32);

impl Countdown {
    #[inline]
    pub fn new(secs: f32) -> Self {
        Self(secs.max(0.0))
    }

    #[inline]
    pub fn remaining(self) -> f32 {
        self.0
    }

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }

    #[inline]
    pub fn is_done(self) -> bool {
        self.0 <= 0.0
    }
}

/// Ability cooldown.
///
/// Invariants:
/// - usable only while `remaining <= 0`
/// - firing re-arms to the full duration
/// - ticking never goes below zero
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    /// A cooldown that starts ready.
    pub fn new(duration: f32) -> Self {
        Self { duration: duration.max(0.0), remaining: 0.0 }
    }

    /// A cooldown that starts armed (must elapse once before first use).
    pub fn armed(duration: f32) -> Self {
        let mut c = Self::new(duration);
        c.rearm();
        c
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    #[inline]
    pub fn rearm(&mut self) {
        self.remaining = self.duration;
    }

    /// Consume the ability if ready. Returns whether it fired.
    #[inline]
    pub fn trigger(&mut self) -> bool {
        if !self.ready() {
            return false;
        }
        self.rearm();
        true
    }
}

/// Elapsed time in a step, with a limit for forced advance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepClock {
    elapsed: f32,
    limit: f32,
}

impl StepClock {
    pub fn with_limit(limit: f32) -> Self {
        Self { elapsed: 0.0, limit: limit.max(0.0) }
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    #[inline]
    pub fn timed_out(&self) -> bool {
        self.elapsed > self.limit
    }

    /// `elapsed / limit` clamped to [0, 1].
    #[inline]
    pub fn fraction(&self) -> f32 {
        if self.limit <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.limit).clamp(0.0, 1.0)
    }
}

/// Fires once every `interval`, used to throttle detection checks.
///
/// Starts due, so the first tick after spawn evaluates immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cadence {
    interval: f32,
    until_next: f32,
}

impl Cadence {
    pub fn every(interval: f32) -> Self {
        Self { interval: interval.max(0.0), until_next: 0.0 }
    }

    /// Advance by `dt`. Returns true on the ticks where the check is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.until_next -= dt;
        if self.until_next <= 0.0 {
            self.until_next = self.interval;
            return true;
        }
        false
    }
}

/// Linear interpolation, `t` clamped to [0, 1].
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
