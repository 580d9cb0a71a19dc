//! Presentation feedback (render-only): hit flash and screen shake.
//!
//! Gameplay never reads anything here. Inputs are the messages and
//! components the simulation already produces:
//! - `ActorHit`  -> `HitFlash` on the actor's sprite
//! - `CombatCue::{Explosion, BossDefeated}` -> `ScreenShake` trauma
//!
//! `HitFlash` is attached once per actor and stays, so a hit never moves an
//! entity between archetypes.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::plugins::camera::{MainCamera, follow_player};
use crate::plugins::combat::cues::CombatCue;
use crate::plugins::combat::health::{ActorHit, Health};

/// Value normalized to [0, 1]. Clamped on write so readers never clamp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitF32(f32);

impl UnitF32 {
    #[inline]
    pub fn new_clamped(v: f32) -> Self {
        Self(v.clamp(0.0, 1.0))
    }
    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
    #[inline]
    pub fn add_clamped(&mut self, dv: f32) {
        self.0 = (self.0 + dv).clamp(0.0, 1.0);
    }
    #[inline]
    pub fn decay_to_zero(&mut self, rate_per_sec: f32, dt: f32) {
        self.0 = (self.0 - rate_per_sec * dt).max(0.0);
    }
}

#[derive(Component, Debug, Clone)]
pub struct HitFlash {
    base: Color,
    flash: UnitF32,
}

impl HitFlash {
    pub fn new(base: Color) -> Self {
        Self { base, flash: UnitF32::default() }
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.flash.get()
    }
}

#[derive(Resource, Debug, Default)]
pub struct ScreenShake {
    trauma: UnitF32,
    phase: f32,
    prev_offset: Vec2,
}

impl ScreenShake {
    #[inline]
    pub fn trauma(&self) -> f32 {
        self.trauma.get()
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma.add_clamped(amount);
    }
}

const FLASH_DECAY: f32 = 6.0;
const TRAUMA_DECAY: f32 = 1.2;
const SHAKE_AMPLITUDE: f32 = 24.0;

pub fn plugin(app: &mut App) {
    app.init_resource::<ScreenShake>()
        .add_systems(
            Update,
            (attach_hit_flash, flash_on_hit, fade_hit_flash).chain(),
        )
        .add_systems(Update, shake_on_cues)
        .add_systems(
            PostUpdate,
            apply_screen_shake
                .after(follow_player)
                .before(TransformSystems::Propagate),
        );
}

fn attach_hit_flash(mut commands: Commands, q: Query<(Entity, &Sprite), (Added<Health>, Without<HitFlash>)>) {
    for (e, sprite) in &q {
        commands.entity(e).insert(HitFlash::new(sprite.color));
    }
}

pub fn flash_on_hit(mut hits: MessageReader<ActorHit>, mut q: Query<&mut HitFlash>) {
    for hit in hits.read() {
        if let Ok(mut fx) = q.get_mut(hit.actor) {
            fx.flash = UnitF32::new_clamped(1.0);
        }
    }
}

/// Blend toward white while flashing. Alpha is left alone: the death fade
/// owns it.
pub fn fade_hit_flash(time: Res<Time>, mut q: Query<(&mut HitFlash, &mut Sprite)>) {
    let dt = time.delta_secs();
    for (mut fx, mut sprite) in &mut q {
        if fx.flash.get() <= 0.0 {
            continue;
        }
        fx.flash.decay_to_zero(FLASH_DECAY, dt);
        let alpha = sprite.color.alpha();
        sprite.color = fx.base.mix(&Color::WHITE, fx.flash.get()).with_alpha(alpha);
    }
}

pub fn shake_on_cues(mut cues: MessageReader<CombatCue>, mut shake: ResMut<ScreenShake>) {
    for cue in cues.read() {
        match cue {
            CombatCue::Explosion { .. } => shake.add_trauma(0.6),
            CombatCue::BossDefeated { .. } => shake.add_trauma(1.0),
            _ => {}
        }
    }
}

fn apply_screen_shake(
    time: Res<Time>,
    mut shake: ResMut<ScreenShake>,
    mut q_cam: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut tf) = q_cam.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    // Remove last frame's offset first to prevent drift.
    tf.translation.x -= shake.prev_offset.x;
    tf.translation.y -= shake.prev_offset.y;
    shake.prev_offset = Vec2::ZERO;

    shake.phase += dt;
    shake.trauma.decay_to_zero(TRAUMA_DECAY, dt);
    if shake.trauma.get() <= 0.0 {
        return;
    }

    let strength = shake.trauma.get() * shake.trauma.get();
    // Deterministic pseudo-noise.
    let x = (shake.phase * 37.0 * TAU).sin() + 0.5 * (shake.phase * 61.0 * TAU).sin();
    let y = (shake.phase * 41.0 * TAU).cos() + 0.5 * (shake.phase * 53.0 * TAU).cos();
    let offset = Vec2::new(x, y).clamp_length_max(1.0) * SHAKE_AMPLITUDE * strength;

    tf.translation.x += offset.x;
    tf.translation.y += offset.y;
    shake.prev_offset = offset;
}
