use glam::{Quat, Vec3};

/// Position and rotation of an entity, as exposed by the host engine's
/// transform get/set contract (spec §6). The core never reaches into the
/// engine for this directly — `Controller` owns a copy and the integrating
/// code is responsible for writing it back to the renderable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// A position/rotation delta layered on top of a `Transform` to hide a
/// reconciliation snap (§4.4). Identity at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOffset {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for TransformOffset {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TransformOffset {
    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.position.length_squared() < epsilon * epsilon && self.rotation.angle_between(Quat::IDENTITY) < epsilon
    }

    /// `rotationOffset` is defined as `newRot.inverse() * visRot` (§4.2 step 6),
    /// so recovering the visible rotation is `newRot * rotationOffset`.
    pub fn apply(&self, transform: Transform) -> Transform {
        Transform {
            position: transform.position + self.position,
            rotation: transform.rotation * self.rotation,
        }
    }
}
