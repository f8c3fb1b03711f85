use glam::Vec3;

/// Movement state carried across ticks as the `Simulator::StatePayload`.
///
/// Ported from `player/state.rs`'s `PlayerState`. The deferred-impulse pair
/// is dropped: nothing in the ported controller path reads it, and carrying
/// unused fields through every reconcile/replay cycle would just be dead
/// weight here.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    pub strafe_ground_time: f32,
    pub stunned_duration: f32,
    pub crouch_amount: f32,
    pub velocity: Vec3,
    pub grounded: bool,
    pub jump_held: bool,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            strafe_ground_time: 0.0,
            stunned_duration: 0.0,
            crouch_amount: 0.0,
            velocity: Vec3::ZERO,
            grounded: true,
            jump_held: false,
        }
    }
}

impl MovementState {
    pub fn is_stunned(&self) -> bool {
        self.stunned_duration > 0.0
    }
}
