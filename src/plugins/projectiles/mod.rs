//! Projectiles plugin: **message-based producer → consumer** spawning over a
//! pre-spawned pool.
//!
//! # Philosophy: invariants first
//! Correctness checks are pushed to boundaries (spawn, state transition) and
//! the hot paths (allocation, collision resolve, return commit) stay
//! straight-line. Pool invariant violations are bugs and fail fast.
//!
//! # Data flow
//! ```text
//!   FixedUpdate
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (A) Producers: enemy brains, boss sequencer, player trigger               │
//!│      - writes: SpawnProjectile                                             │
//!│                                                                            │
//!│  (B) Consumer: allocate_projectiles                                        │
//!│      - mutates: ProjectilePool.free                                        │
//!│      - mutates: ProjectileState, Projectile, Transform, Velocity,          │
//!│                 Visibility, CollisionLayers                                │
//!│      - writes: ProjectileSpawned { handle }                                │
//!│                                                                            │
//!│  (C) expire_projectiles: lifetime -> PendingReturn                         │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  (D) Physics emits CollisionStart messages (Avian)                         │
//!│  (E) process_projectile_collisions: damage + effect -> PendingReturn       │
//!│  (F) return_to_pool_commit: PendingReturn -> Inactive, back into the pool  │
//!└────────────────────────────────────────────────────────────────────────────┘
//!
//!   OnExit(InGame): recall_projectiles -> return_to_pool_commit
//! ```
//!
//! Only two places branch on purpose:
//! - capacity: an empty pool drops the request
//! - the shooter itself is never hit by its own projectile

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod lifetime;
pub mod messages;
pub mod pool;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::ai::AiSet;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app.world().get_resource::<Tunables>().map_or(512, |t| t.projectile_pool_size);

        app.insert_resource(pool::ProjectilePool::new(capacity))
            .add_systems(Startup, pool::init_projectile_pool);

        app.add_message::<messages::SpawnProjectile>()
            .add_message::<messages::ProjectileSpawned>()
            .add_message::<messages::HitEffectLanded>();

        app.add_systems(
            FixedUpdate,
            (allocator::allocate_projectiles, lifetime::expire_projectiles)
                .chain()
                .after(AiSet::Decide)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            FixedPostUpdate,
            (collision::process_projectile_collisions, commit::return_to_pool_commit)
                .chain()
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            OnExit(GameState::InGame),
            (commit::recall_projectiles, commit::return_to_pool_commit).chain(),
        );
    }
}
