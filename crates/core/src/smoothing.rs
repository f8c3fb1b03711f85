use crate::transform::TransformOffset;

/// `ErrorSmoothTime` default, §6.
pub const DEFAULT_ERROR_SMOOTH_TIME: f32 = 0.1;

/// Epsilon below which an offset is clamped to identity rather than decayed
/// forever.
const IDENTITY_EPSILON: f32 = 1e-4;

/// Exponential decay of a local controller's visual offset (§4.4). Owns
/// nothing but the decay time constant — the offset itself lives on
/// `Controller` since it is reset at the moment of reconciliation, not by
/// this type.
#[derive(Debug, Clone, Copy)]
pub struct VisualSmoother {
    pub error_smooth_time: f32,
}

impl Default for VisualSmoother {
    fn default() -> Self {
        Self {
            error_smooth_time: DEFAULT_ERROR_SMOOTH_TIME,
        }
    }
}

impl VisualSmoother {
    pub fn new(error_smooth_time: f32) -> Self {
        Self { error_smooth_time }
    }

    /// Decays `offset` toward identity in place by one frame of `dt`
    /// seconds, clamping to exact identity once both channels are
    /// negligible so callers don't keep re-lerping forever.
    pub fn decay(&self, offset: &mut TransformOffset, dt: f32) {
        if offset.is_identity(IDENTITY_EPSILON) {
            *offset = TransformOffset::default();
            return;
        }

        let decay = 1.0 - (-dt / self.error_smooth_time).exp();
        offset.position = offset.position.lerp(glam::Vec3::ZERO, decay);
        offset.rotation = offset.rotation.lerp(glam::Quat::IDENTITY, decay).normalize();

        if offset.is_identity(IDENTITY_EPSILON) {
            *offset = TransformOffset::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn decay_is_monotonically_non_increasing() {
        let smoother = VisualSmoother::default();
        let mut offset = TransformOffset {
            position: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let mut last = offset.position.length();
        for _ in 0..50 {
            smoother.decay(&mut offset, 1.0 / 30.0);
            let mag = offset.position.length();
            assert!(mag <= last + 1e-6);
            last = mag;
        }
    }

    #[test]
    fn converges_to_identity() {
        let smoother = VisualSmoother::default();
        let mut offset = TransformOffset {
            position: Vec3::new(2.0, 0.0, 0.0),
            ..Default::default()
        };
        for _ in 0..1000 {
            smoother.decay(&mut offset, 1.0 / 30.0);
        }
        assert_eq!(offset, TransformOffset::default());
    }
}
