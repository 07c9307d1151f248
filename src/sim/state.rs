//! Simulation state and the externally callable entry points
//!
//! Everything the frame loop reads or writes lives in [`SimState`]. The
//! process-wide toggles are grouped in [`WorldFlags`] so the physics step and
//! chaos dispatcher receive them explicitly.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chaos::{ChaosEffect, Tornado};
use super::entity::{Entity, EntityId};
use super::npc::NpcMode;
use super::registry::Registry;
use crate::consts::*;
use crate::settings::Settings;

/// What the next ground click places
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Road,
    Building,
    Car,
    Tree,
    Npc,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Road => "road",
            BuildMode::Building => "building",
            BuildMode::Car => "car",
            BuildMode::Tree => "tree",
            BuildMode::Npc => "npc",
        }
    }

    /// Parse a build button name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "road" => Some(BuildMode::Road),
            "building" => Some(BuildMode::Building),
            "car" => Some(BuildMode::Car),
            "tree" => Some(BuildMode::Tree),
            "npc" => Some(BuildMode::Npc),
            _ => None,
        }
    }
}

/// Global toggles shared by every system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFlags {
    pub build_mode: BuildMode,
    pub gravity_enabled: bool,
    pub bounce_mode: bool,
    /// Camera jitter amplitude (0 = calm)
    pub shake_intensity: f32,
    pub npc_mode: NpcMode,
}

impl Default for WorldFlags {
    fn default() -> Self {
        Self {
            build_mode: BuildMode::Road,
            gravity_enabled: true,
            bounce_mode: false,
            shake_intensity: 0.0,
            npc_mode: NpcMode::Wander,
        }
    }
}

/// Viewer camera (only its position is simulated)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(CAMERA_START),
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub registry: Registry,
    pub flags: WorldFlags,
    pub camera: Camera,
    /// Live tornado tasks
    pub tornadoes: Vec<Tornado>,
    /// Pending earthquake stop times, one per trigger
    pub shake_deadlines: Vec<f64>,
    /// Whether earthquakes move the camera
    pub camera_shake: bool,
    /// Simulation clock (ms), set by each tick
    pub time_ms: f64,
    /// Frames simulated so far
    pub frame: u64,
}

impl SimState {
    /// Create an empty sandbox with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            registry: Registry::new(),
            flags: WorldFlags::default(),
            camera: Camera::default(),
            tornadoes: Vec::new(),
            shake_deadlines: Vec::new(),
            camera_shake: true,
            time_ms: 0.0,
            frame: 0,
        }
    }

    /// Create a sandbox honouring user preferences; `fallback_seed` is used
    /// unless the settings pin one
    pub fn with_settings(settings: &Settings, fallback_seed: u64) -> Self {
        let mut state = Self::new(settings.seed.unwrap_or(fallback_seed));
        state.camera_shake = settings.effective_screen_shake();
        state
    }

    /// Place an object of the given kind at a ground point
    pub fn place(&mut self, kind: BuildMode, ground: Vec3) -> EntityId {
        let entity = match kind {
            BuildMode::Road => Entity::road(ground),
            BuildMode::Building => Entity::building(ground, &mut self.rng),
            BuildMode::Car => Entity::car(ground, &mut self.rng),
            BuildMode::Tree => Entity::tree(ground),
            BuildMode::Npc => Entity::npc(ground, &mut self.rng),
        };
        let id = self.registry.insert(entity);
        log::debug!(
            "Placed {} #{} at ({:.1}, {:.1})",
            kind.as_str(),
            id.0,
            ground.x,
            ground.z
        );
        id
    }

    /// Place an object of the current build mode (ground click)
    pub fn place_at(&mut self, ground: Vec3) -> EntityId {
        self.place(self.flags.build_mode, ground)
    }

    pub fn set_build_mode(&mut self, mode: BuildMode) {
        self.flags.build_mode = mode;
        log::info!("Build mode: {}", mode.as_str());
    }

    /// Toggle an NPC mode; returns the mode now in effect
    pub fn set_npc_mode(&mut self, requested: NpcMode) -> NpcMode {
        self.flags.npc_mode = self.flags.npc_mode.toggled(requested);
        log::info!("NPC mode: {}", self.flags.npc_mode.as_str());
        self.flags.npc_mode
    }

    /// Fire a chaos effect at the current clock time
    pub fn trigger_chaos(&mut self, effect: ChaosEffect) {
        super::chaos::trigger(self, effect);
    }

    /// Apply a command from the input collaborator
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Place { kind, at } => {
                self.place(kind, at);
            }
            Command::PlaceAt(at) => {
                self.place_at(at);
            }
            Command::SetBuildMode(mode) => self.set_build_mode(mode),
            Command::Chaos(effect) => self.trigger_chaos(effect),
            Command::NpcMode(mode) => {
                self.set_npc_mode(mode);
            }
        }
    }
}

/// A UI event, already resolved to typed values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Place { kind: BuildMode, at: Vec3 },
    /// Ground click using the current build mode
    PlaceAt(Vec3),
    SetBuildMode(BuildMode),
    Chaos(ChaosEffect),
    NpcMode(NpcMode),
}

impl Command {
    /// Resolve a named button (`"build:car"`, `"chaos:meteor"`, `"npc:dance"`)
    pub fn from_button(name: &str) -> Option<Self> {
        let (group, value) = name.split_once(':')?;
        match group {
            "build" => BuildMode::from_name(value).map(Command::SetBuildMode),
            "chaos" => ChaosEffect::from_name(value).map(Command::Chaos),
            "npc" => NpcMode::from_name(value).map(Command::NpcMode),
            _ => None,
        }
    }
}
