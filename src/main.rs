//! Chaos Sandbox entry point
//!
//! On the web the page drives `platform::web::Sandbox` directly; this binary
//! is a headless native run for smoke testing the simulation.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Chaos Sandbox (native) starting...");
    log::info!("Native mode is headless - serve the page for the interactive version");

    let seed = std::env::var("SANDBOX_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    run_demo(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The page constructs `Sandbox` itself, this is just to satisfy the compiler
}

/// Build a small town, unleash some chaos and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(seed: u64) {
    use chaos_sandbox::consts::FRAME_MS;
    use chaos_sandbox::render::frame_view;
    use chaos_sandbox::sim::{BuildMode, ChaosEffect, EntityKind, NpcMode, SimState, run_frames};
    use glam::Vec3;

    let settings = chaos_sandbox::Settings::load();
    let mut state = SimState::with_settings(&settings, seed);

    // A main street with a few blocks of buildings
    for i in -3..=3 {
        let z = i as f32 * 8.0;
        state.place(BuildMode::Road, Vec3::new(0.0, 0.0, z));
        state.place(BuildMode::Building, Vec3::new(-5.0, 0.0, z));
        state.place(BuildMode::Building, Vec3::new(5.0, 0.0, z));
        state.place(BuildMode::Tree, Vec3::new(-9.0, 0.0, z + 2.0));
    }
    for i in 0..6 {
        state.place(BuildMode::Car, Vec3::new(0.0, 0.0, -20.0 + i as f32 * 7.0));
        state.place(BuildMode::Npc, Vec3::new(i as f32 * 3.0 - 8.0, 0.0, 12.0));
    }
    run_frames(&mut state, 120, FRAME_MS);

    let script = [
        (ChaosEffect::Cars, None),
        (ChaosEffect::Tornado, Some(NpcMode::Panic)),
        (ChaosEffect::Meteor, None),
        (ChaosEffect::Earthquake, Some(NpcMode::Dance)),
        (ChaosEffect::Bounce, None),
        (ChaosEffect::Explode, Some(NpcMode::Freeze)),
        (ChaosEffect::Giant, None),
        (ChaosEffect::Gravity, Some(NpcMode::Freeze)),
    ];
    for (effect, npc_mode) in script {
        state.trigger_chaos(effect);
        if let Some(mode) = npc_mode {
            state.set_npc_mode(mode);
        }
        run_frames(&mut state, 180, FRAME_MS);
    }

    let highest = state
        .registry
        .iter()
        .map(|e| e.position.y)
        .fold(f32::MIN, f32::max);
    println!(
        "\n{} frames, {} entities ({} cars, {} NPCs, {} meteors), highest object at y={:.1}",
        state.frame,
        state.registry.len(),
        state.registry.count(EntityKind::Car),
        state.registry.count(EntityKind::Npc),
        state.registry.count(EntityKind::Meteor),
        highest
    );

    let view = frame_view(&state);
    match serde_json::to_string(&view) {
        Ok(json) => log::debug!("Final frame: {json}"),
        Err(e) => log::warn!("Could not serialize final frame: {e}"),
    }
    println!(
        "Camera drifted to ({:.1}, {:.1}, {:.1})",
        view.camera[0], view.camera[1], view.camera[2]
    );
}
