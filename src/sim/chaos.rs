//! Chaos effects
//!
//! One-shot perturbations applied straight to the registry, plus two timed
//! effects that the frame loop advances: tornadoes (pulsing attractors) and
//! the earthquake (camera shake with a deadline).

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::registry::Registry;
use super::state::SimState;
use crate::consts::*;
use crate::{heading_to_xz, random_ground_point};

/// Named chaos effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChaosEffect {
    Tornado,
    Meteor,
    Earthquake,
    Cars,
    Gravity,
    Explode,
    Bounce,
    Giant,
}

impl ChaosEffect {
    pub const ALL: [ChaosEffect; 8] = [
        ChaosEffect::Tornado,
        ChaosEffect::Meteor,
        ChaosEffect::Earthquake,
        ChaosEffect::Cars,
        ChaosEffect::Gravity,
        ChaosEffect::Explode,
        ChaosEffect::Bounce,
        ChaosEffect::Giant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChaosEffect::Tornado => "tornado",
            ChaosEffect::Meteor => "meteor",
            ChaosEffect::Earthquake => "earthquake",
            ChaosEffect::Cars => "cars",
            ChaosEffect::Gravity => "gravity",
            ChaosEffect::Explode => "explode",
            ChaosEffect::Bounce => "bounce",
            ChaosEffect::Giant => "giant",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

/// A live tornado: pulls nearby objects in and up until it expires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tornado {
    pub center: Vec3,
    pub born_ms: f64,
    pub next_pulse_ms: f64,
}

impl Tornado {
    pub fn new(center: Vec3, born_ms: f64) -> Self {
        Self {
            center,
            born_ms,
            next_pulse_ms: born_ms + TORNADO_PULSE_MS,
        }
    }

    /// Nudge everything within reach toward the funnel
    pub fn pulse(&self, registry: &mut Registry) {
        for entity in registry.iter_mut() {
            if entity.position.distance(self.center) < TORNADO_RADIUS {
                let pull = (self.center - entity.position).normalize_or_zero() * TORNADO_PULL;
                let velocity = entity.velocity_mut();
                *velocity += pull;
                velocity.y += TORNADO_LIFT;
            }
        }
    }

    /// Run every pulse due by `now_ms`; returns false once the tornado is
    /// spent
    pub fn advance(&mut self, registry: &mut Registry, now_ms: f64) -> bool {
        let mut pulses = 0;
        while self.next_pulse_ms <= now_ms {
            if pulses == TORNADO_MAX_PULSES_PER_FRAME {
                // Drop the backlog, keeping the pulse cadence
                let behind = ((now_ms - self.next_pulse_ms) / TORNADO_PULSE_MS).floor() + 1.0;
                self.next_pulse_ms += behind * TORNADO_PULSE_MS;
                break;
            }
            self.pulse(registry);
            pulses += 1;
            let pulsed_at = self.next_pulse_ms;
            self.next_pulse_ms += TORNADO_PULSE_MS;
            if pulsed_at - self.born_ms > TORNADO_LIFETIME_MS {
                return false;
            }
        }
        self.next_pulse_ms - TORNADO_PULSE_MS - self.born_ms <= TORNADO_LIFETIME_MS
    }
}

/// Apply a chaos effect to the simulation
pub fn trigger(state: &mut SimState, effect: ChaosEffect) {
    log::info!("Chaos: {}", effect.as_str());
    match effect {
        ChaosEffect::Tornado => {
            let center = random_ground_point(&mut state.rng, TORNADO_AREA);
            state.tornadoes.push(Tornado::new(center, state.time_ms));
            log::debug!(
                "Tornado touched down at ({:.1}, {:.1}), {} active",
                center.x,
                center.z,
                state.tornadoes.len()
            );
        }
        ChaosEffect::Meteor => {
            spawn_meteor(&mut state.registry, &mut state.rng);
        }
        ChaosEffect::Earthquake => {
            state.flags.shake_intensity = EARTHQUAKE_INTENSITY;
            state
                .shake_deadlines
                .push(state.time_ms + EARTHQUAKE_DURATION_MS);
        }
        ChaosEffect::Cars => spawn_car_swarm(&mut state.registry, &mut state.rng),
        ChaosEffect::Gravity => {
            state.flags.gravity_enabled = !state.flags.gravity_enabled;
            if !state.flags.gravity_enabled {
                float_everything(&mut state.registry, &mut state.rng);
            }
            log::info!(
                "Gravity {}",
                if state.flags.gravity_enabled { "on" } else { "off" }
            );
        }
        ChaosEffect::Explode => explode(&mut state.registry),
        ChaosEffect::Bounce => {
            state.flags.bounce_mode = !state.flags.bounce_mode;
            log::info!(
                "Bounce mode {}",
                if state.flags.bounce_mode { "on" } else { "off" }
            );
        }
        ChaosEffect::Giant => toggle_giant(&mut state.registry),
    }
}

/// Drop a meteor somewhere over the map
pub fn spawn_meteor<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R) {
    let mut position = random_ground_point(rng, METEOR_AREA);
    position.y = METEOR_HEIGHT;
    registry.insert(Entity::meteor(position));
}

/// Ring of cars around the origin
pub fn spawn_car_swarm<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R) {
    for i in 0..CAR_SWARM_COUNT {
        let angle = (i as f32 / CAR_SWARM_COUNT as f32) * std::f32::consts::TAU;
        let radius = CAR_SWARM_INNER_RADIUS + rng.random::<f32>() * CAR_SWARM_RING_WIDTH;
        let ground = heading_to_xz(angle) * radius;
        registry.insert(Entity::car_with_spread(ground, CAR_SWARM_SPREAD, rng));
    }
}

/// Gravity just switched off: give everything a gentle upward drift
pub fn float_everything<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R) {
    for entity in registry.iter_mut() {
        entity.velocity_mut().y = rng.random::<f32>() * ANTIGRAVITY_KICK;
    }
}

/// Blast everything away from the origin and up
pub fn explode(registry: &mut Registry) {
    for entity in registry.iter_mut() {
        let dir = entity.position.normalize_or_zero();
        let velocity = entity.velocity_mut();
        *velocity += dir * EXPLOSION_IMPULSE;
        velocity.y = EXPLOSION_LIFT;
    }
}

/// Scale everything up by the giant factor, or back to its remembered size
pub fn toggle_giant(registry: &mut Registry) {
    for entity in registry.iter_mut() {
        match entity.original_scale.take() {
            Some(original) => entity.scale = original,
            None => {
                entity.original_scale = Some(entity.scale);
                entity.scale = Vec3::splat(GIANT_SCALE);
            }
        }
    }
}

/// Retire spent tornadoes after running their due pulses
pub fn advance_tornadoes(state: &mut SimState, now_ms: f64) {
    let SimState {
        tornadoes, registry, ..
    } = state;
    let before = tornadoes.len();
    tornadoes.retain_mut(|t| t.advance(registry, now_ms));
    if tornadoes.len() < before {
        log::debug!(
            "{} tornado(es) dissipated, {} active",
            before - tornadoes.len(),
            tornadoes.len()
        );
    }
}

/// Stop the shaking when any earthquake's time is up
///
/// Every trigger keeps its own deadline, so an earlier quake still ends the
/// shaking even if another one started after it.
pub fn settle_earthquake(state: &mut SimState, now_ms: f64) {
    let before = state.shake_deadlines.len();
    state.shake_deadlines.retain(|&ends| now_ms < ends);
    if state.shake_deadlines.len() < before {
        state.flags.shake_intensity = 0.0;
        log::debug!(
            "Earthquake over, {} deadline(s) pending",
            state.shake_deadlines.len()
        );
    }
}

/// Jitter the camera while the ground shakes (the drift is kept)
pub fn shake_camera(state: &mut SimState) {
    let intensity = state.flags.shake_intensity;
    if intensity <= 0.0 || !state.camera_shake {
        return;
    }
    let rng = &mut state.rng;
    let offset = Vec3::new(
        (rng.random::<f32>() - 0.5) * intensity,
        (rng.random::<f32>() - 0.5) * intensity,
        (rng.random::<f32>() - 0.5) * intensity,
    );
    state.camera.position += offset;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;
    use crate::sim::state::BuildMode;

    #[test]
    fn test_names_round_trip() {
        for effect in ChaosEffect::ALL {
            assert_eq!(ChaosEffect::from_name(effect.as_str()), Some(effect));
        }
        assert_eq!(ChaosEffect::from_name("Tornado"), Some(ChaosEffect::Tornado));
        assert_eq!(ChaosEffect::from_name("flood"), None);
    }

    #[test]
    fn test_meteor_falls_from_the_sky() {
        let mut state = SimState::new(1);
        state.trigger_chaos(ChaosEffect::Meteor);
        let meteor = state.registry.iter().next().cloned().expect("meteor spawned");
        assert_eq!(meteor.kind(), EntityKind::Meteor);
        assert_eq!(meteor.position.y, METEOR_HEIGHT);
        assert!(meteor.position.x.abs() <= 30.0 && meteor.position.z.abs() <= 30.0);
        assert_eq!(meteor.velocity, Some(Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_car_swarm_ring() {
        let mut state = SimState::new(2);
        state.trigger_chaos(ChaosEffect::Cars);
        assert_eq!(state.registry.car_ids().len(), CAR_SWARM_COUNT);
        for car in state.registry.iter() {
            let r = crate::horizontal_distance(car.position);
            assert!((20.0 - 1e-4..30.0 + 1e-4).contains(&r), "radius {r}");
            assert_eq!(car.position.y, CAR_RIDE_HEIGHT);
            let v = car.velocity.unwrap_or(Vec3::NAN);
            assert!(v.x.abs() <= 0.1 && v.z.abs() <= 0.1 && v.y == 0.0);
        }
    }

    #[test]
    fn test_gravity_off_kicks_static_tree() {
        let mut state = SimState::new(3);
        let tree = state.place(BuildMode::Tree, Vec3::new(5.0, 0.0, 5.0));
        assert!(state.registry.get(tree).and_then(|e| e.velocity).is_none());

        state.trigger_chaos(ChaosEffect::Gravity);
        assert!(!state.flags.gravity_enabled);
        let v = state.registry.get(tree).and_then(|e| e.velocity).expect("tree velocity");
        assert!((0.0..ANTIGRAVITY_KICK).contains(&v.y));
        assert_eq!((v.x, v.z), (0.0, 0.0));

        // Turning gravity back on does not kick again
        state.trigger_chaos(ChaosEffect::Gravity);
        assert!(state.flags.gravity_enabled);
        assert_eq!(state.registry.get(tree).and_then(|e| e.velocity), Some(v));
    }

    #[test]
    fn test_explode_pushes_outward_and_up() {
        let mut state = SimState::new(4);
        let tree = state.place(BuildMode::Tree, Vec3::new(10.0, 0.0, 0.0));
        let center = state.place(BuildMode::Tree, Vec3::ZERO);
        state.trigger_chaos(ChaosEffect::Explode);

        let v = state.registry.get(tree).and_then(|e| e.velocity).expect("velocity");
        assert!((v.x - EXPLOSION_IMPULSE).abs() < 1e-6);
        assert_eq!(v.y, EXPLOSION_LIFT);
        // Nothing to push along at the exact origin, only the lift
        let v = state.registry.get(center).and_then(|e| e.velocity).expect("velocity");
        assert_eq!(v, Vec3::new(0.0, EXPLOSION_LIFT, 0.0));
    }

    #[test]
    fn test_giant_toggles_and_restores() {
        let mut state = SimState::new(5);
        let b = state.place(BuildMode::Building, Vec3::ZERO);
        let scale = |s: &SimState| s.registry.get(b).map(|e| e.scale);

        assert_eq!(scale(&state), Some(Vec3::ONE));
        state.trigger_chaos(ChaosEffect::Giant);
        assert_eq!(scale(&state), Some(Vec3::splat(3.0)));
        state.trigger_chaos(ChaosEffect::Giant);
        assert_eq!(scale(&state), Some(Vec3::ONE));
        state.trigger_chaos(ChaosEffect::Giant);
        assert_eq!(scale(&state), Some(Vec3::splat(3.0)));
    }

    #[test]
    fn test_bounce_and_earthquake_flags() {
        let mut state = SimState::new(6);
        state.trigger_chaos(ChaosEffect::Bounce);
        assert!(state.flags.bounce_mode);
        state.trigger_chaos(ChaosEffect::Bounce);
        assert!(!state.flags.bounce_mode);

        state.time_ms = 1000.0;
        state.trigger_chaos(ChaosEffect::Earthquake);
        assert_eq!(state.flags.shake_intensity, EARTHQUAKE_INTENSITY);
        settle_earthquake(&mut state, 3999.0);
        assert_eq!(state.flags.shake_intensity, EARTHQUAKE_INTENSITY);
        settle_earthquake(&mut state, 4000.0);
        assert_eq!(state.flags.shake_intensity, 0.0);
        assert!(state.shake_deadlines.is_empty());
    }

    #[test]
    fn test_first_earthquake_deadline_ends_the_shaking() {
        let mut state = SimState::new(8);
        crate::sim::tick(&mut state, 0.0);
        state.trigger_chaos(ChaosEffect::Earthquake);
        crate::sim::tick(&mut state, 2000.0);
        state.trigger_chaos(ChaosEffect::Earthquake);
        assert_eq!(state.shake_deadlines, vec![3000.0, 5000.0]);

        crate::sim::tick(&mut state, 3500.0);
        assert_eq!(state.flags.shake_intensity, 0.0);
        assert_eq!(state.shake_deadlines, vec![5000.0]);

        // A third quake shakes again until the next pending deadline
        state.trigger_chaos(ChaosEffect::Earthquake);
        crate::sim::tick(&mut state, 4000.0);
        assert_eq!(state.flags.shake_intensity, EARTHQUAKE_INTENSITY);
        crate::sim::tick(&mut state, 5000.0);
        assert_eq!(state.flags.shake_intensity, 0.0);
        assert_eq!(state.shake_deadlines, vec![6500.0]);
    }

    #[test]
    fn test_camera_shake_respects_preference() {
        let mut state = SimState::new(7);
        state.flags.shake_intensity = EARTHQUAKE_INTENSITY;
        let start = state.camera.position;
        shake_camera(&mut state);
        let moved = state.camera.position - start;
        assert!(moved.abs().max_element() <= 1.0);
        assert_ne!(state.camera.position, start);

        state.camera_shake = false;
        let held = state.camera.position;
        shake_camera(&mut state);
        assert_eq!(state.camera.position, held);
    }

    #[test]
    fn test_tornado_pulls_nearby_only() {
        let mut reg = Registry::new();
        let near = reg.insert(Entity::tree(Vec3::new(5.0, 0.0, 0.0)));
        let far = reg.insert(Entity::tree(Vec3::new(30.0, 0.0, 0.0)));
        let tornado = Tornado::new(Vec3::ZERO, 0.0);
        tornado.pulse(&mut reg);

        let v = reg.get(near).and_then(|e| e.velocity).expect("pulled");
        assert!((v.x + TORNADO_PULL).abs() < 1e-6);
        assert!((v.y - TORNADO_LIFT).abs() < 1e-6);
        assert!(reg.get(far).and_then(|e| e.velocity).is_none());
    }

    #[test]
    fn test_tornado_lifetime() {
        let mut reg = Registry::new();
        let id = reg.insert(Entity::tree(Vec3::new(1.0, 0.0, 0.0)));
        let mut tornado = Tornado::new(Vec3::ZERO, 1000.0);

        // Nothing due yet
        assert!(tornado.advance(&mut reg, 1010.0));
        assert!(reg.get(id).and_then(|e| e.velocity).is_none());

        // One pulse per 16ms
        assert!(tornado.advance(&mut reg, 1016.0));
        let lift = reg.get(id).and_then(|e| e.velocity).map(|v| v.y);
        assert!(lift.is_some_and(|y| (y - TORNADO_LIFT).abs() < 1e-6));

        // Still alive at the end of its lifetime, gone right after
        let mut alive = true;
        let mut now = 1016.0;
        while alive && now < 1000.0 + 2.0 * TORNADO_LIFETIME_MS {
            now += 16.0;
            alive = tornado.advance(&mut reg, now);
        }
        assert!(!alive);
        assert!(now > 1000.0 + TORNADO_LIFETIME_MS);
        assert!(now <= 1000.0 + TORNADO_LIFETIME_MS + 2.0 * TORNADO_PULSE_MS);
    }

    #[test]
    fn test_tornado_backlog_is_bounded() {
        let mut reg = Registry::new();
        let id = reg.insert(Entity::tree(Vec3::new(1.0, 0.0, 0.0)));
        let mut tornado = Tornado::new(Vec3::ZERO, 0.0);
        // A long stall: only a bounded number of pulses run
        assert!(tornado.advance(&mut reg, 1000.0));
        let lift = reg.get(id).and_then(|e| e.velocity).map(|v| v.y).unwrap_or(0.0);
        let max = TORNADO_MAX_PULSES_PER_FRAME as f32 * TORNADO_LIFT;
        assert!(lift <= max + 1e-5);
        assert!(tornado.next_pulse_ms > 1000.0);
    }
}
