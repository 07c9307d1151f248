//! Per-frame body physics
//!
//! Simple Euler integration with one step per display frame. Two passes run
//! every frame: [`step_cars`] over the car index (ride height 0.5, bounds
//! return) and [`step_bodies`] over the whole registry (ground at 0). Cars go
//! through both, so they are integrated twice per frame. That double pass is
//! how the sandbox has always moved cars and is kept as-is.

use glam::Vec3;

use super::entity::EntityKind;
use super::npc::NpcMode;
use super::registry::Registry;
use super::state::WorldFlags;
use crate::consts::*;
use crate::{heading_to_xz, horizontal_distance, inward_angle};

/// Ground response parameters for one pass
#[derive(Debug, Clone, Copy)]
struct Ground {
    height: f32,
    restitution: f32,
}

const GENERIC_GROUND: Ground = Ground {
    height: GROUND_Y,
    restitution: BOUNCE_RESTITUTION,
};

const CAR_GROUND: Ground = Ground {
    height: CAR_RIDE_HEIGHT,
    restitution: CAR_BOUNCE_RESTITUTION,
};

/// Integrate one body and apply gravity above `ground.height`
#[inline]
fn integrate(position: &mut Vec3, velocity: &mut Vec3, flags: &WorldFlags, ground: Ground) {
    *position += *velocity;
    if flags.gravity_enabled && position.y > ground.height {
        velocity.y -= GRAVITY;
    }
}

/// Generic ground response: bounce, or lose half the velocity and settle
pub fn collide_ground(position: &mut Vec3, velocity: &mut Vec3, bounce: bool) {
    if position.y < GENERIC_GROUND.height {
        position.y = GENERIC_GROUND.height;
        if bounce {
            velocity.y = velocity.y.abs() * GENERIC_GROUND.restitution;
        } else {
            *velocity *= GROUND_FRICTION;
            if velocity.y.abs() < REST_EPSILON {
                velocity.y = 0.0;
            }
        }
    }
}

/// Car ground response: bounce, or stop vertical motion dead
pub fn collide_ride_height(position: &mut Vec3, velocity: &mut Vec3, bounce: bool) {
    if position.y < CAR_GROUND.height {
        position.y = CAR_GROUND.height;
        velocity.y = if bounce {
            velocity.y.abs() * CAR_GROUND.restitution
        } else {
            0.0
        };
    }
}

/// Point a car that strayed too far back at the origin
pub fn steer_home(position: Vec3, velocity: &mut Vec3) {
    if horizontal_distance(position) > WORLD_BOUND_RADIUS {
        let home = heading_to_xz(inward_angle(position)) * CAR_RETURN_SPEED;
        velocity.x = home.x;
        velocity.z = home.z;
    }
}

/// Car pass: every car with a velocity
pub fn step_cars(registry: &mut Registry, flags: &WorldFlags) {
    for i in 0..registry.car_ids().len() {
        let id = registry.car_ids()[i];
        let Some(car) = registry.get_mut(id) else {
            continue;
        };
        let Some(velocity) = car.velocity.as_mut() else {
            continue;
        };
        integrate(&mut car.position, velocity, flags, CAR_GROUND);
        collide_ride_height(&mut car.position, velocity, flags.bounce_mode);
        steer_home(car.position, velocity);
    }
}

/// Generic pass: every entity with a velocity
///
/// Frozen NPCs are skipped so the freeze mode holds them in place.
pub fn step_bodies(registry: &mut Registry, flags: &WorldFlags) {
    let frozen = flags.npc_mode == NpcMode::Freeze;
    for entity in registry.iter_mut() {
        if frozen && entity.kind() == EntityKind::Npc {
            continue;
        }
        let Some(velocity) = entity.velocity.as_mut() else {
            continue;
        };
        integrate(&mut entity.position, velocity, flags, GENERIC_GROUND);
        collide_ground(&mut entity.position, velocity, flags.bounce_mode);
    }
}
