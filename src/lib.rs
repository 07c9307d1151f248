//! Chaos Sandbox - A 3D city toy with whimsical disasters
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (registry, physics, NPCs, chaos effects)
//! - `render`: Instance buffer extraction for the page renderer
//! - `platform`: Browser/native platform glue
//! - `settings`: User preferences

pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec3;
use rand::Rng;

/// Simulation configuration constants
///
/// All rates are per frame: the simulation steps once per display frame,
/// with no fixed timestep.
pub mod consts {
    /// Nominal frame duration used by the native harness (ms)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Gravity applied to vertical velocity each frame
    pub const GRAVITY: f32 = 0.01;
    /// Generic ground plane height
    pub const GROUND_Y: f32 = 0.0;
    /// Car ride height (cars rest here instead of on the ground plane)
    pub const CAR_RIDE_HEIGHT: f32 = 0.5;
    /// Vertical speed kept on a generic bounce
    pub const BOUNCE_RESTITUTION: f32 = 0.7;
    /// Vertical speed kept on a car bounce
    pub const CAR_BOUNCE_RESTITUTION: f32 = 0.8;
    /// Velocity multiplier on a non-bouncing ground hit
    pub const GROUND_FRICTION: f32 = 0.5;
    /// Vertical speed below which a grounded body comes to rest
    pub const REST_EPSILON: f32 = 0.01;

    /// Horizontal radius beyond which cars and NPCs are turned back
    pub const WORLD_BOUND_RADIUS: f32 = 45.0;
    /// Speed of a car heading back toward the origin
    pub const CAR_RETURN_SPEED: f32 = 0.1;

    /// Building height range [min, min + span)
    pub const BUILDING_MIN_HEIGHT: f32 = 3.0;
    pub const BUILDING_HEIGHT_SPAN: f32 = 5.0;
    /// Road slab rests half its thickness above ground
    pub const ROAD_Y: f32 = 0.05;
    /// Initial horizontal speed spread for placed cars and NPCs
    pub const CAR_SPAWN_SPREAD: f32 = 0.1;
    pub const NPC_SPAWN_SPREAD: f32 = 0.05;

    /// NPC walking speeds
    pub const NPC_WANDER_SPEED: f32 = 0.05;
    pub const NPC_PANIC_SPEED: f32 = 0.15;
    /// Side of the square NPC targets are drawn from
    pub const NPC_WANDER_AREA: f32 = 60.0;
    pub const NPC_PANIC_AREA: f32 = 80.0;
    /// Per-frame chance of picking a fresh target
    pub const NPC_WANDER_RETARGET_CHANCE: f64 = 0.01;
    pub const NPC_PANIC_RETARGET_CHANCE: f64 = 0.02;
    /// Distance at which a wandering NPC counts as arrived
    pub const NPC_ARRIVE_DISTANCE: f32 = 1.0;
    /// Distance from origin of the target given to an out-of-bounds NPC
    pub const NPC_RETURN_RADIUS: f32 = 20.0;
    /// Minimum per-axis speed for an NPC to turn toward its heading
    pub const NPC_FACING_EPSILON: f32 = 0.01;
    /// Dance animation
    pub const DANCE_PHASE_STEP: f32 = 0.1;
    pub const DANCE_BOB_HEIGHT: f32 = 0.3;
    pub const DANCE_SPIN: f32 = 0.1;
    pub const DANCE_TILT: f32 = 0.3;
    /// Panic shiver (frequency in rad/ms)
    pub const PANIC_WOBBLE_FREQ: f64 = 0.02;
    pub const PANIC_WOBBLE: f32 = 0.2;

    /// Tornado
    pub const TORNADO_LIFETIME_MS: f64 = 5000.0;
    pub const TORNADO_PULSE_MS: f64 = 16.0;
    /// Missed pulses beyond this many per frame are dropped
    pub const TORNADO_MAX_PULSES_PER_FRAME: u32 = 8;
    pub const TORNADO_RADIUS: f32 = 10.0;
    pub const TORNADO_PULL: f32 = 0.05;
    pub const TORNADO_LIFT: f32 = 0.02;
    pub const TORNADO_AREA: f32 = 40.0;

    /// Meteor
    pub const METEOR_HEIGHT: f32 = 50.0;
    pub const METEOR_AREA: f32 = 60.0;
    pub const METEOR_SPEED: f32 = 1.0;

    /// Earthquake
    pub const EARTHQUAKE_INTENSITY: f32 = 2.0;
    pub const EARTHQUAKE_DURATION_MS: f64 = 3000.0;

    /// Car swarm
    pub const CAR_SWARM_COUNT: usize = 50;
    pub const CAR_SWARM_INNER_RADIUS: f32 = 20.0;
    pub const CAR_SWARM_RING_WIDTH: f32 = 10.0;
    pub const CAR_SWARM_SPREAD: f32 = 0.2;

    /// Explosion
    pub const EXPLOSION_IMPULSE: f32 = 0.5;
    pub const EXPLOSION_LIFT: f32 = 0.3;

    /// Upper bound of the upward kick when gravity switches off
    pub const ANTIGRAVITY_KICK: f32 = 0.2;

    /// Giant mode scale factor
    pub const GIANT_SCALE: f32 = 3.0;

    /// Camera starting position
    pub const CAMERA_START: [f32; 3] = [30.0, 25.0, 30.0];
}

/// Distance from the origin in the ground (XZ) plane
#[inline]
pub fn horizontal_distance(pos: Vec3) -> f32 {
    (pos.x * pos.x + pos.z * pos.z).sqrt()
}

/// Heading in the ground plane that points from `pos` back at the origin
#[inline]
pub fn inward_angle(pos: Vec3) -> f32 {
    pos.z.atan2(pos.x) + std::f32::consts::PI
}

/// Unit vector in the ground plane for a heading
#[inline]
pub fn heading_to_xz(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Uniform random point on the ground inside a `side` x `side` square
/// centred on the origin
pub fn random_ground_point<R: Rng + ?Sized>(rng: &mut R, side: f32) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * side,
        0.0,
        (rng.random::<f32>() - 0.5) * side,
    )
}

/// Uniform random value in `[-spread/2, spread/2)`
#[inline]
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}
