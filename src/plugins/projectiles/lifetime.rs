use bevy::prelude::*;

use super::components::{PooledProjectile, Projectile, ProjectileState};

/// Expire active projectiles whose lifetime ran out.
pub fn expire_projectiles(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut ProjectileState, &mut Projectile), With<PooledProjectile>>,
) {
    let dt = time.delta_secs();
    for (mut state, mut projectile) in &mut q {
        if *state != ProjectileState::Active {
            continue;
        }
        projectile.lifetime.tick(dt);
        if projectile.lifetime.is_done() {
            *state = ProjectileState::PendingReturn;
        }
    }
}
