//! Collision layers and the layer presets every spawner uses.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
}

/// Which side fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    #[inline]
    pub fn bullet_layer(self) -> Layer {
        match self {
            Team::Player => Layer::PlayerBullet,
            Team::Enemy => Layer::EnemyBullet,
        }
    }
}

pub fn wall_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::World,
        [Layer::Player, Layer::Enemy, Layer::PlayerBullet, Layer::EnemyBullet],
    )
}

pub fn player_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Player, [Layer::World, Layer::Enemy, Layer::EnemyBullet])
}

/// Liquefied player: enemy bullets pass through, walls and enemy bodies
/// still collide.
pub fn liquefied_player_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Player, [Layer::World, Layer::Enemy])
}

pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player, Layer::PlayerBullet])
}

/// Live projectile of `team`: hits walls and the opposing side.
pub fn projectile_layers(team: Team) -> CollisionLayers {
    match team {
        Team::Player => CollisionLayers::new(Layer::PlayerBullet, [Layer::World, Layer::Enemy]),
        Team::Enemy => CollisionLayers::new(Layer::EnemyBullet, [Layer::World, Layer::Player]),
    }
}

/// Keep membership, clear filters: the body stops interacting without a
/// structural change.
#[inline]
pub fn inert_layers(membership: Layer) -> CollisionLayers {
    CollisionLayers::new(membership, [] as [Layer; 0])
}
