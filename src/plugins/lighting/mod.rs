//! Lighting plugin (Firefly) (render-only).
//!
//! Every `PointLight2d` in the game is owned here:
//! - the player's light follows the slime and turns cyan while liquefied
//! - each bomb carries a glow whose range tracks its fuse warning
//! - the boss lights up when it wakes

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::bombs::{Bomb, BombConfig, BombWarning};
use crate::plugins::boss::Boss;
use crate::plugins::player::{Player, PlayerMotor};

#[derive(Component)]
pub struct PlayerLight;

#[derive(Component, Debug, Clone, Copy)]
pub struct BombGlow;

#[derive(Component, Debug, Clone, Copy)]
pub struct BossLight;

const PLAYER_LIGHT: Color = Color::srgb(1.0, 0.9, 0.75);
const LIQUID_LIGHT: Color = Color::srgb(0.45, 0.95, 1.0);

const GLOW_BASE_RANGE: f32 = 40.0;
const GLOW_MAX_RANGE: f32 = 160.0;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup).add_systems(
        Update,
        (
            follow_player_light,
            (attach_bomb_glow, pulse_bomb_glow).chain(),
            light_awakened_boss,
        ),
    );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: PLAYER_LIGHT,
            range: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<(&Transform, &PlayerMotor), (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<(&mut Transform, &mut PointLight2d), (With<PlayerLight>, Without<Player>)>,
) {
    let Ok((tf_player, motor)) = q_player.single() else {
        return;
    };
    let Ok((mut tf_light, mut light)) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
    light.color = if motor.is_liquefied() { LIQUID_LIGHT } else { PLAYER_LIGHT };
}

fn attach_bomb_glow(mut commands: Commands, q: Query<Entity, Added<Bomb>>) {
    for e in &q {
        commands.entity(e).with_child((
            BombGlow,
            PointLight2d {
                color: Color::srgb(1.0, 0.35, 0.2),
                range: GLOW_BASE_RANGE,
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 5.0),
        ));
    }
}

/// Glow radius for a warning intensity, from idle to about to blow.
pub fn glow_range(warning: f32, cfg: &BombConfig) -> f32 {
    if warning <= 0.0 {
        return GLOW_BASE_RANGE;
    }
    let span = (cfg.warning_high - cfg.warning_low).max(f32::EPSILON);
    let t = ((warning - cfg.warning_low) / span).clamp(0.0, 1.0);
    GLOW_BASE_RANGE + (GLOW_MAX_RANGE - GLOW_BASE_RANGE) * t
}

fn pulse_bomb_glow(
    q_bombs: Query<(&BombWarning, &BombConfig, &Children), With<Bomb>>,
    mut q_glow: Query<&mut PointLight2d, With<BombGlow>>,
) {
    for (warning, cfg, children) in &q_bombs {
        for child in children.iter() {
            if let Ok(mut light) = q_glow.get_mut(child) {
                light.range = glow_range(warning.0, cfg);
            }
        }
    }
}

/// The dormant boss is hidden; the first frame it is visible it gets a light.
fn light_awakened_boss(
    mut commands: Commands,
    q_boss: Query<(Entity, &Visibility), (With<Boss>, Changed<Visibility>)>,
    q_lit: Query<(), With<BossLight>>,
    q_children: Query<&Children>,
) {
    for (e, vis) in &q_boss {
        if *vis != Visibility::Visible {
            continue;
        }
        let already_lit = q_children
            .get(e)
            .is_ok_and(|children| children.iter().any(|c| q_lit.contains(c)));
        if already_lit {
            continue;
        }
        commands.entity(e).with_child((
            BossLight,
            PointLight2d {
                color: Color::srgb(1.0, 0.25, 0.3),
                range: 260.0,
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 5.0),
        ));
    }
}
