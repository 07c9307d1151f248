//! Sandbox simulation module
//!
//! All scene logic lives here:
//! - One step per display frame, driven by an explicit clock
//! - Seeded RNG only
//! - Append-only registry, iterated in insertion order
//! - No rendering or platform dependencies

pub mod chaos;
pub mod entity;
pub mod npc;
pub mod physics;
pub mod registry;
pub mod state;
pub mod tick;

pub use chaos::{ChaosEffect, Tornado};
pub use entity::{Body, Entity, EntityId, EntityKind, NpcBrain, Rotation};
pub use npc::NpcMode;
pub use registry::Registry;
pub use state::{BuildMode, Camera, Command, SimState, WorldFlags};
pub use tick::{run_frames, tick};
