//! Per-frame simulation step
//!
//! Advances the whole sandbox under a single clock supplied by the caller
//! (the browser's frame timestamp, or a fixed cadence natively).

use super::chaos::{advance_tornadoes, settle_earthquake, shake_camera};
use super::npc::step_npcs;
use super::physics::{step_bodies, step_cars};
use super::state::SimState;

/// Advance the simulation by one display frame ending at `now_ms`
pub fn tick(state: &mut SimState, now_ms: f64) {
    // The clock never runs backwards
    state.time_ms = now_ms.max(state.time_ms);
    state.frame += 1;
    let now_ms = state.time_ms;

    // Timed effects
    advance_tornadoes(state, now_ms);
    settle_earthquake(state, now_ms);

    // NPCs, then cars, then every body (cars intentionally get both passes)
    step_npcs(
        &mut state.registry,
        state.flags.npc_mode,
        now_ms,
        &mut state.rng,
    );
    step_cars(&mut state.registry, &state.flags);
    step_bodies(&mut state.registry, &state.flags);

    shake_camera(state);
}

/// Run `frames` ticks spaced `frame_ms` apart
pub fn run_frames(state: &mut SimState, frames: u32, frame_ms: f64) {
    for _ in 0..frames {
        let now = state.time_ms + frame_ms;
        tick(state, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::chaos::ChaosEffect;
    use crate::sim::entity::Body;
    use crate::sim::npc::NpcMode;
    use crate::sim::state::BuildMode;
    use glam::Vec3;

    #[test]
    fn test_tick_advances_clock() {
        let mut state = SimState::new(1);
        tick(&mut state, 16.0);
        tick(&mut state, 32.0);
        assert_eq!(state.frame, 2);
        assert_eq!(state.time_ms, 32.0);

        // Stale timestamps do not rewind
        tick(&mut state, 10.0);
        assert_eq!(state.time_ms, 32.0);
    }

    #[test]
    fn test_car_converges_to_ride_height() {
        let mut state = SimState::new(2);
        let car = state.place(BuildMode::Car, Vec3::ZERO);
        run_frames(&mut state, 600, FRAME_MS);
        for _ in 0..30 {
            run_frames(&mut state, 1, FRAME_MS);
            let y = state.registry.get(car).map(|e| e.position.y);
            assert_eq!(y, Some(CAR_RIDE_HEIGHT));
        }
    }

    #[test]
    fn test_cars_move_twice_per_frame() {
        let mut state = SimState::new(14);
        let car = state.place(BuildMode::Car, Vec3::ZERO);
        let start = state.registry.get(car).map(|e| e.position).unwrap_or(Vec3::NAN);
        let v0 = state.registry.get(car).and_then(|e| e.velocity).unwrap_or(Vec3::NAN);
        assert_eq!(v0.y, 0.0);

        tick(&mut state, FRAME_MS);

        let end = state.registry.get(car).map(|e| e.position).unwrap_or(Vec3::NAN);
        let v = state.registry.get(car).and_then(|e| e.velocity).unwrap_or(Vec3::NAN);
        // Car pass at ride height, then the generic pass on top of it
        assert!((end.x - start.x - 2.0 * v0.x).abs() < 1e-6);
        assert!((end.z - start.z - 2.0 * v0.z).abs() < 1e-6);
        assert_eq!(end.y, CAR_RIDE_HEIGHT);
        // Only the generic pass sees the car as airborne
        assert_eq!(v.y, -GRAVITY);
        assert_eq!((v.x, v.z), (v0.x, v0.z));
    }

    #[test]
    fn test_panic_then_freeze_holds_npcs() {
        let mut state = SimState::new(3);
        let npc = state.place(BuildMode::Npc, Vec3::new(2.0, 0.0, 2.0));
        state.set_npc_mode(NpcMode::Panic);
        run_frames(&mut state, 30, FRAME_MS);

        assert_eq!(state.set_npc_mode(NpcMode::Freeze), NpcMode::Freeze);
        let frozen = state.registry.get(npc).cloned().expect("npc");
        run_frames(&mut state, 60, FRAME_MS);
        let after = state.registry.get(npc).cloned().expect("npc");

        assert_eq!(after.position, frozen.position);
        assert_eq!(after.velocity, frozen.velocity);
        let target = |b: &Body| match b {
            Body::Npc(brain) => brain.target,
            _ => None,
        };
        assert!(target(&frozen.body).is_some());
        assert_eq!(target(&after.body), target(&frozen.body));
    }

    #[test]
    fn test_dance_over_frames() {
        let mut state = SimState::new(4);
        let npc = state.place(BuildMode::Npc, Vec3::new(-3.0, 0.0, 4.0));
        let phase = |s: &SimState| s.registry.get(npc).and_then(|e| e.brain()).map(|b| b.dance_phase);
        let start = phase(&state).expect("phase");
        state.set_npc_mode(NpcMode::Dance);
        for _ in 0..40 {
            run_frames(&mut state, 1, FRAME_MS);
            let v = state.registry.get(npc).and_then(|e| e.velocity).expect("velocity");
            assert_eq!((v.x, v.z), (0.0, 0.0));
        }
        let end = phase(&state).expect("phase");
        assert!((end - (start + 40.0 * DANCE_PHASE_STEP)).abs() < 1e-3);
    }

    #[test]
    fn test_meteor_lands_and_rests() {
        let mut state = SimState::new(5);
        state.trigger_chaos(ChaosEffect::Meteor);
        run_frames(&mut state, 400, FRAME_MS);
        let meteor = state.registry.iter().next().cloned().expect("meteor");
        assert_eq!(meteor.position.y, 0.0);
        assert_eq!(meteor.velocity.map(|v| v.y), Some(0.0));
    }

    #[test]
    fn test_earthquake_drifts_camera_then_stops() {
        let mut state = SimState::new(6);
        tick(&mut state, 0.0);
        state.trigger_chaos(ChaosEffect::Earthquake);
        run_frames(&mut state, 60, FRAME_MS);
        assert_ne!(state.camera.position, Vec3::from_array(CAMERA_START));
        assert_eq!(state.flags.shake_intensity, EARTHQUAKE_INTENSITY);

        run_frames(&mut state, 200, FRAME_MS);
        assert_eq!(state.flags.shake_intensity, 0.0);
        // Drift is not undone once the shaking stops
        let settled = state.camera.position;
        run_frames(&mut state, 10, FRAME_MS);
        assert_eq!(state.camera.position, settled);
        assert_ne!(settled, Vec3::from_array(CAMERA_START));
    }

    #[test]
    fn test_tornadoes_expire_under_the_clock() {
        let mut state = SimState::new(7);
        state.trigger_chaos(ChaosEffect::Tornado);
        state.trigger_chaos(ChaosEffect::Tornado);
        assert_eq!(state.tornadoes.len(), 2);
        run_frames(&mut state, 60, FRAME_MS);
        assert_eq!(state.tornadoes.len(), 2);
        run_frames(&mut state, 300, FRAME_MS);
        assert!(state.tornadoes.is_empty());
    }

    #[test]
    fn test_same_seed_same_world() {
        let script = |seed: u64| {
            let mut state = SimState::new(seed);
            state.place(BuildMode::Npc, Vec3::ZERO);
            state.place(BuildMode::Car, Vec3::new(5.0, 0.0, 5.0));
            state.trigger_chaos(ChaosEffect::Cars);
            state.trigger_chaos(ChaosEffect::Tornado);
            run_frames(&mut state, 120, FRAME_MS);
            state.set_npc_mode(NpcMode::Panic);
            state.trigger_chaos(ChaosEffect::Explode);
            run_frames(&mut state, 120, FRAME_MS);
            state
                .registry
                .iter()
                .map(|e| e.position)
                .collect::<Vec<_>>()
        };
        assert_eq!(script(99), script(99));
    }
}
