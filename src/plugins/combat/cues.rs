//! Fire-and-forget presentation cues (audio / VFX hooks).
//!
//! Producers never wait on a consumer and the simulation is identical with or
//! without one. In a headless build nothing but the trace log reads these.

use bevy::prelude::*;

use crate::plugins::boss::BossPhase;

use super::pickups::PowerUpKind;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub enum CombatCue {
    /// One shot or volley left `source`.
    Shot { source: Entity },
    /// A boss mode began. Mode 2 also cues every single shot via `Shot`.
    BossMode { boss: Entity, phase: BossPhase },
    BossActivated { boss: Entity },
    BossDefeated { boss: Entity },
    /// A bomb armed its fuse; the warning ramps from here.
    FuseStarted { bomb: Entity },
    Explosion { at: Vec2, radius: f32 },
    Dash { player: Entity },
    Liquefy { player: Entity },
    Pickup { at: Vec2 },
    PowerUp { at: Vec2, kind: PowerUpKind },
    /// The player stepped into goo.
    SlimeWalk { player: Entity },
}

/// Stand-in consumer so cues show up in `RUST_LOG=trace` runs.
pub fn trace_cues(mut cues: MessageReader<CombatCue>) {
    for cue in cues.read() {
        trace!("cue: {cue:?}");
    }
}
