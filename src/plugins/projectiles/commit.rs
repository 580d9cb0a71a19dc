//! Return commit: recycle projectiles back into the pool.
//!
//! This system is the "owner" of the *Inactive invariants*.
//!
//! Invariant: Inactive projectiles must be:
//! - hidden
//! - velocity = 0
//! - collide with nothing (filters empty)
//!
//! Each projectile passes through here once per activation, whatever ended it
//! (hit, wall, expiry, or the round ending while it was still in flight).

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{PooledProjectile, ProjectileHandle, ProjectileState};
use super::pool::{ProjectilePool, parked_layers};

pub fn return_to_pool_commit(
    mut pool: ResMut<ProjectilePool>,
    mut q: Query<
        (Entity, &mut ProjectileState, &mut Visibility, &mut LinearVelocity, &mut CollisionLayers),
        With<PooledProjectile>,
    >,
) {
    for (e, mut state, mut vis, mut vel, mut layers) in &mut q {
        if *state != ProjectileState::PendingReturn {
            continue;
        }

        *state = ProjectileState::Inactive;
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *layers = parked_layers();

        pool.push_free(ProjectileHandle(e));
    }
}

/// Leaving `InGame` cancels every projectile still in flight. The pool
/// outlives the round, so nothing may stay Active across a restart.
pub fn recall_projectiles(mut q: Query<&mut ProjectileState, With<PooledProjectile>>) {
    let mut recalled = 0;
    for mut state in &mut q {
        if *state == ProjectileState::Active {
            *state = ProjectileState::PendingReturn;
            recalled += 1;
        }
    }
    if recalled > 0 {
        debug!("projectiles: recalled {recalled} in flight");
    }
}
