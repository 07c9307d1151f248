//! Render extraction
//!
//! The page owns meshes and drawing. Each frame it receives one packed
//! [`InstanceTransform`] per entity, in registry order, and moves its meshes
//! to match.

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::sim::{Entity, SimState};

/// Per-entity transform as laid out in the shared buffer (48 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct InstanceTransform {
    pub position: [f32; 3],
    pub yaw: f32,
    pub scale: [f32; 3],
    pub tilt: f32,
    /// `EntityKind::code`
    pub kind: u32,
    pub id: u32,
    pub _pad: [u32; 2],
}

impl InstanceTransform {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            position: entity.position.to_array(),
            yaw: entity.rotation.yaw,
            scale: entity.scale.to_array(),
            tilt: entity.rotation.tilt,
            kind: entity.kind().code(),
            id: entity.id().0,
            _pad: [0; 2],
        }
    }
}

/// Everything the display needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub frame: u64,
    pub camera: [f32; 3],
    pub shake: f32,
    pub instances: Vec<InstanceTransform>,
}

/// Pack every entity's transform
pub fn extract_instances(state: &SimState) -> Vec<InstanceTransform> {
    state
        .registry
        .iter()
        .map(InstanceTransform::from_entity)
        .collect()
}

/// Pack the whole frame
pub fn frame_view(state: &SimState) -> FrameView {
    FrameView {
        frame: state.frame,
        camera: state.camera.position.to_array(),
        shake: state.flags.shake_intensity,
        instances: extract_instances(state),
    }
}

/// Raw bytes of an instance slice, ready to hand to the page
pub fn instance_bytes(instances: &[InstanceTransform]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
