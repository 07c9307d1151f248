//! Browser entry points
//!
//! The page (three.js) owns the canvas, meshes, ground raycast and buttons.
//! It creates one [`Sandbox`], forwards clicks and button presses to it, and
//! calls [`Sandbox::frame`] from `requestAnimationFrame` to get the packed
//! instance transforms to draw.

use std::sync::Once;

use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::platform::FpsCounter;
use crate::render::{extract_instances, instance_bytes};
use crate::settings::Settings;
use crate::sim::{BuildMode, ChaosEffect, Command, NpcMode, SimState, tick};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }
    });
}

/// Sandbox handle held by the page
#[wasm_bindgen]
pub struct Sandbox {
    state: SimState,
    settings: Settings,
    fps: FpsCounter,
}

#[wasm_bindgen]
impl Sandbox {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Sandbox {
        init_logging();
        let settings = Settings::load();
        let state = SimState::with_settings(&settings, js_sys::Date::now() as u64);
        log::info!("Chaos Sandbox starting (seed {})", state.seed);
        Sandbox {
            state,
            settings,
            fps: FpsCounter::new(),
        }
    }

    /// Ground click at (x, z) with the current build mode; returns the new id
    pub fn click(&mut self, x: f32, z: f32) -> u32 {
        self.state.place_at(Vec3::new(x, 0.0, z)).0
    }

    /// Place a named kind at (x, z)
    pub fn place(&mut self, kind: &str, x: f32, z: f32) -> Option<u32> {
        let Some(kind) = BuildMode::from_name(kind) else {
            log::warn!("Unknown build kind: {kind}");
            return None;
        };
        Some(self.state.place(kind, Vec3::new(x, 0.0, z)).0)
    }

    pub fn set_build_mode(&mut self, name: &str) -> bool {
        match BuildMode::from_name(name) {
            Some(mode) => {
                self.state.set_build_mode(mode);
                true
            }
            None => {
                log::warn!("Unknown build mode: {name}");
                false
            }
        }
    }

    pub fn trigger_chaos(&mut self, name: &str) -> bool {
        match ChaosEffect::from_name(name) {
            Some(effect) => {
                self.state.trigger_chaos(effect);
                true
            }
            None => {
                log::warn!("Unknown chaos effect: {name}");
                false
            }
        }
    }

    /// Toggle an NPC mode; returns the mode now in effect
    pub fn set_npc_mode(&mut self, name: &str) -> String {
        let mode = match NpcMode::from_name(name) {
            Some(mode) => self.state.set_npc_mode(mode),
            None => {
                log::warn!("Unknown NPC mode: {name}");
                self.state.flags.npc_mode
            }
        };
        mode.as_str().to_string()
    }

    /// Generic button dispatch (`data-command="chaos:meteor"` and friends)
    pub fn button(&mut self, name: &str) -> bool {
        match Command::from_button(name) {
            Some(command) => {
                self.state.apply(command);
                true
            }
            None => {
                log::warn!("Unknown button: {name}");
                false
            }
        }
    }

    /// Step one frame and return the instance buffer bytes
    pub fn frame(&mut self, now_ms: f64) -> js_sys::Uint8Array {
        tick(&mut self.state, now_ms);
        self.fps.record(now_ms);
        let instances = extract_instances(&self.state);
        js_sys::Uint8Array::from(instance_bytes(&instances))
    }

    /// Camera position after this frame's shake
    pub fn camera(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.state.camera.position.to_array()[..])
    }

    pub fn fps(&self) -> u32 {
        if self.settings.show_fps { self.fps.fps() } else { 0 }
    }

    pub fn entity_count(&self) -> u32 {
        self.settings.hud_entity_count(self.state.registry.len())
    }

    pub fn build_mode(&self) -> String {
        self.state.flags.build_mode.as_str().to_string()
    }

    pub fn npc_mode(&self) -> String {
        self.state.flags.npc_mode.as_str().to_string()
    }

    pub fn bounce_mode(&self) -> bool {
        self.state.flags.bounce_mode
    }

    pub fn gravity_enabled(&self) -> bool {
        self.state.flags.gravity_enabled
    }

    /// Accessibility toggle, persisted
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        self.settings.reduced_motion = enabled;
        self.state.camera_shake = self.settings.effective_screen_shake();
        self.settings.save();
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
