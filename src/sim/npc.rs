//! NPC behaviour
//!
//! All NPCs share one [`NpcMode`]. Each frame the mode decides an NPC's
//! velocity and pose; the NPC then walks, turns to face its heading and gets
//! retargeted toward the middle of the map if it strayed past the bounds.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity};
use super::registry::Registry;
use crate::consts::*;
use crate::{heading_to_xz, horizontal_distance, inward_angle, random_ground_point};

/// Shared NPC behaviour mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcMode {
    #[default]
    Wander,
    Panic,
    Dance,
    Freeze,
}

impl NpcMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NpcMode::Wander => "wander",
            NpcMode::Panic => "panic",
            NpcMode::Dance => "dance",
            NpcMode::Freeze => "freeze",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wander" => Some(NpcMode::Wander),
            "panic" => Some(NpcMode::Panic),
            "dance" => Some(NpcMode::Dance),
            "freeze" => Some(NpcMode::Freeze),
            _ => None,
        }
    }

    /// Mode after pressing the button for `requested`: pressing the active
    /// mode again returns to wandering
    pub fn toggled(self, requested: NpcMode) -> NpcMode {
        if self == requested {
            NpcMode::Wander
        } else {
            requested
        }
    }
}

/// Advance every NPC by one frame
pub fn step_npcs<R: Rng + ?Sized>(
    registry: &mut Registry,
    mode: NpcMode,
    time_ms: f64,
    rng: &mut R,
) {
    if mode == NpcMode::Freeze {
        return;
    }
    for i in 0..registry.npc_ids().len() {
        let id = registry.npc_ids()[i];
        if let Some(npc) = registry.get_mut(id) {
            step_npc(npc, mode, time_ms, rng);
        }
    }
}

/// Advance one NPC by one frame
pub fn step_npc<R: Rng + ?Sized>(npc: &mut Entity, mode: NpcMode, time_ms: f64, rng: &mut R) {
    let Entity {
        body,
        position,
        rotation,
        velocity,
        ..
    } = npc;
    let Body::Npc(brain) = body else {
        return;
    };
    let velocity = velocity.get_or_insert(Vec3::ZERO);

    match mode {
        NpcMode::Freeze => return,
        NpcMode::Panic => {
            if brain.target.is_none() || rng.random_bool(NPC_PANIC_RETARGET_CHANCE) {
                brain.target = Some(random_ground_point(rng, NPC_PANIC_AREA));
            }
            steer_toward(*position, brain.target, velocity, NPC_PANIC_SPEED);
            rotation.tilt = ((time_ms * PANIC_WOBBLE_FREQ).sin() as f32) * PANIC_WOBBLE;
        }
        NpcMode::Dance => {
            brain.dance_phase += DANCE_PHASE_STEP;
            position.y = brain.dance_phase.sin().abs() * DANCE_BOB_HEIGHT;
            rotation.yaw += DANCE_SPIN;
            rotation.tilt = (brain.dance_phase * 2.0).sin() * DANCE_TILT;
            *velocity = Vec3::ZERO;
        }
        NpcMode::Wander => {
            let arrived = brain
                .target
                .is_some_and(|t| position.distance(t) < NPC_ARRIVE_DISTANCE);
            if brain.target.is_none() || arrived || rng.random_bool(NPC_WANDER_RETARGET_CHANCE) {
                brain.target = Some(random_ground_point(rng, NPC_WANDER_AREA));
            }
            steer_toward(*position, brain.target, velocity, NPC_WANDER_SPEED);
            rotation.tilt = 0.0;
        }
    }

    position.x += velocity.x;
    position.z += velocity.z;

    if velocity.x.abs() > NPC_FACING_EPSILON || velocity.z.abs() > NPC_FACING_EPSILON {
        rotation.yaw = velocity.x.atan2(velocity.z);
    }

    // Retarget only; the NPC walks back on its own
    if horizontal_distance(*position) > WORLD_BOUND_RADIUS {
        brain.target = Some(heading_to_xz(inward_angle(*position)) * NPC_RETURN_RADIUS);
    }
}

/// Set horizontal velocity toward `target` at `speed`
fn steer_toward(position: Vec3, target: Option<Vec3>, velocity: &mut Vec3, speed: f32) {
    let Some(target) = target else {
        return;
    };
    let dir = (target - position).normalize_or_zero();
    velocity.x = dir.x * speed;
    velocity.z = dir.z * speed;
}
