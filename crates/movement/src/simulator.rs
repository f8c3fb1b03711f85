use glam::{Quat, Vec3};
use rapier3d::dynamics::RigidBodyHandle;
use rewind_core::{Simulator, StateSnapshot, Transform};

use crate::config::MovementConfig;
use crate::controller::compute_velocity;
use crate::input::MoveInput;
use crate::physics::MovementPhysics;
use crate::state::MovementState;

/// Concrete [`rewind_core::Simulator`] for the quake-style strafe-jump
/// character, grounded in `player/controller.rs` + `physics/world.rs`.
///
/// Each instance owns an isolated physics world (one player capsule over
/// one ground plane): the CORE's rollback/replay works by re-invoking
/// `simulate` against recorded inputs, not by snapshotting a shared rapier
/// world, so there is nothing to restore at the physics layer beyond
/// syncing the body to whatever `Transform` the controller hands in.
pub struct MovementSimulator {
    config: MovementConfig,
    physics: MovementPhysics,
    handle: RigidBodyHandle,
    state: MovementState,
    pending_input: MoveInput,
}

impl MovementSimulator {
    pub fn new(config: MovementConfig, spawn: Vec3) -> Self {
        let mut physics = MovementPhysics::new();
        physics.add_ground(0.0, 50.0);
        let handle = physics.add_player(spawn, config.player_radius, config.player_height);

        Self {
            config,
            physics,
            handle,
            state: MovementState::default(),
            pending_input: MoveInput::default(),
        }
    }

    /// Called by whatever samples local input (keyboard, a replayed demo
    /// script, …) once per frame, ahead of the tick loop that calls
    /// `build_input`.
    pub fn queue_input(&mut self, input: MoveInput) {
        self.pending_input = input;
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }
}

impl Simulator for MovementSimulator {
    type InputPayload = MoveInput;
    type StatePayload = MovementState;

    fn build_input(&mut self) -> MoveInput {
        self.pending_input
    }

    fn simulate(&mut self, transform: &mut Transform, input: &MoveInput, dt: f32) {
        self.physics.set_body_position(self.handle, transform.position);

        let grounded = self.physics.is_grounded(self.handle, self.config.ground_check_threshold);
        let current = self.physics.body_velocity(self.handle).unwrap_or(Vec3::ZERO);

        let velocity = compute_velocity(&self.config, current, input, grounded, &mut self.state, dt);
        self.state.velocity = velocity;

        self.physics.set_body_velocity(self.handle, velocity);
        self.physics.step(dt);

        transform.position = self.physics.body_position(self.handle).unwrap_or(transform.position);
        transform.rotation = Quat::from_euler(glam::EulerRot::YXZ, input.yaw, -input.pitch, 0.0);
    }

    fn write_state(&self) -> MovementState {
        self.state.clone()
    }

    fn read_state(&mut self, payload: &MovementState) {
        self.state = payload.clone();
        self.physics.set_body_velocity(self.handle, self.state.velocity);
    }

    fn on_reconcile(&mut self, _server: &StateSnapshot<MovementState>, _predicted: &StateSnapshot<MovementState>) {
        log::debug!("movement simulator reconciled, velocity now {:?}", self.state.velocity);
    }
}
