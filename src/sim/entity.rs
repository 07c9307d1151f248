//! Scene entities
//!
//! Every placed or spawned object is an [`Entity`]. What kind of object it is
//! lives in its [`Body`], which also carries the data only that kind needs.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::jitter;

/// Stable handle for an entity (its index in the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Road,
    Building,
    Car,
    Tree,
    Npc,
    Meteor,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Road => "road",
            EntityKind::Building => "building",
            EntityKind::Car => "car",
            EntityKind::Tree => "tree",
            EntityKind::Npc => "npc",
            EntityKind::Meteor => "meteor",
        }
    }

    /// Numeric code used in the instance buffer
    pub fn code(&self) -> u32 {
        match self {
            EntityKind::Road => 0,
            EntityKind::Building => 1,
            EntityKind::Car => 2,
            EntityKind::Tree => 3,
            EntityKind::Npc => 4,
            EntityKind::Meteor => 5,
        }
    }
}

/// Per-NPC behaviour memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcBrain {
    /// Current wander/panic destination
    pub target: Option<Vec3>,
    /// Dance animation phase (radians, grows while dancing)
    pub dance_phase: f32,
}

/// Kind-specific entity data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    Road,
    Building { height: f32 },
    Car,
    Tree,
    Npc(NpcBrain),
    Meteor,
}

impl Body {
    pub fn kind(&self) -> EntityKind {
        match self {
            Body::Road => EntityKind::Road,
            Body::Building { .. } => EntityKind::Building,
            Body::Car => EntityKind::Car,
            Body::Tree => EntityKind::Tree,
            Body::Npc(_) => EntityKind::Npc,
            Body::Meteor => EntityKind::Meteor,
        }
    }
}

/// Orientation: yaw about the vertical axis, tilt about the forward axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub tilt: f32,
}

/// A scene object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub(super) id: EntityId,
    pub body: Body,
    pub position: Vec3,
    pub rotation: Rotation,
    pub scale: Vec3,
    /// Present only for objects that move under physics
    pub velocity: Option<Vec3>,
    /// Scale before giant mode was switched on
    pub original_scale: Option<Vec3>,
}

impl Entity {
    /// Bare entity; the registry assigns the id on insert
    pub fn new(body: Body, position: Vec3) -> Self {
        Self {
            id: EntityId(0),
            body,
            position,
            rotation: Rotation::default(),
            scale: Vec3::ONE,
            velocity: None,
            original_scale: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    /// Velocity, created at rest if the entity had none
    pub fn velocity_mut(&mut self) -> &mut Vec3 {
        self.velocity.get_or_insert(Vec3::ZERO)
    }

    pub fn brain(&self) -> Option<&NpcBrain> {
        match &self.body {
            Body::Npc(brain) => Some(brain),
            _ => None,
        }
    }

    pub fn road(ground: Vec3) -> Self {
        Self::new(Body::Road, Vec3::new(ground.x, ROAD_Y, ground.z))
    }

    /// Building with a random height, standing on the ground
    pub fn building<R: Rng + ?Sized>(ground: Vec3, rng: &mut R) -> Self {
        let height = BUILDING_MIN_HEIGHT + rng.random::<f32>() * BUILDING_HEIGHT_SPAN;
        Self::new(
            Body::Building { height },
            Vec3::new(ground.x, height / 2.0, ground.z),
        )
    }

    /// Car at ride height with a small random drift
    pub fn car<R: Rng + ?Sized>(ground: Vec3, rng: &mut R) -> Self {
        Self::car_with_spread(ground, CAR_SPAWN_SPREAD, rng)
    }

    pub fn car_with_spread<R: Rng + ?Sized>(ground: Vec3, spread: f32, rng: &mut R) -> Self {
        let vx = jitter(rng, spread);
        let vz = jitter(rng, spread);
        Self::new(Body::Car, Vec3::new(ground.x, CAR_RIDE_HEIGHT, ground.z))
            .with_velocity(Vec3::new(vx, 0.0, vz))
    }

    pub fn tree(ground: Vec3) -> Self {
        Self::new(Body::Tree, Vec3::new(ground.x, 0.0, ground.z))
    }

    /// NPC with a small random drift and a random dance phase
    pub fn npc<R: Rng + ?Sized>(ground: Vec3, rng: &mut R) -> Self {
        let vx = jitter(rng, NPC_SPAWN_SPREAD);
        let vz = jitter(rng, NPC_SPAWN_SPREAD);
        let brain = NpcBrain {
            target: None,
            dance_phase: rng.random::<f32>() * std::f32::consts::TAU,
        };
        Self::new(Body::Npc(brain), Vec3::new(ground.x, 0.0, ground.z))
            .with_velocity(Vec3::new(vx, 0.0, vz))
    }

    /// Falling meteor
    pub fn meteor(position: Vec3) -> Self {
        Self::new(Body::Meteor, position).with_velocity(Vec3::new(0.0, -METEOR_SPEED, 0.0))
    }
}
