use glam::Vec3;
use rapier3d::prelude::*;

/// Trimmed down from `physics/world.rs`'s `PhysicsWorld`: one kinematic
/// player capsule over a static ground plane is all a single `Simulator`
/// instance needs, since rollback/replay here works by re-running
/// [`crate::MovementSimulator::simulate`] against history, not by
/// snapshotting and restoring a shared rapier world (that capability stays
/// with `rewind_core::RingHistory` at the transform/state-payload level).
pub struct MovementPhysics {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector,
}

impl MovementPhysics {
    const TICK_RATE: Real = 1.0 / 30.0;

    pub fn new() -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = Self::TICK_RATE;

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, -9.81, 0.0),
        }
    }

    pub fn add_player(&mut self, position: Vec3, radius: Real, height: Real) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(Vector::new(position.x, position.y, position.z))
            .lock_rotations()
            .build();
        let handle = self.bodies.insert(body);

        let half_height = height / 2.0;
        let collider = ColliderBuilder::cylinder(half_height, radius)
            .friction(0.0)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    pub fn add_ground(&mut self, y: Real, half_size: Real) {
        let collider = ColliderBuilder::cuboid(half_size, 0.1, half_size)
            .translation(Vector::new(0.0, y, 0.0))
            .build();
        self.colliders.insert(collider);
    }

    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let current_rot = *body.rotation();
            let new_pose =
                Pose::from_parts(Vector::new(position.x, position.y, position.z), current_rot);
            body.set_position(new_pose, true);
        }
    }

    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(Vector::new(velocity.x, velocity.y, velocity.z), true);
        }
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| {
            let t = b.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| {
            let v = b.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    pub fn is_grounded(&self, handle: RigidBodyHandle, threshold: Real) -> bool {
        let Some(body) = self.bodies.get(handle) else {
            return false;
        };

        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::default().exclude_rigid_body(handle),
        );

        let pos = body.translation();
        let ray = Ray::new(
            Vector::new(pos.x, pos.y, pos.z),
            Vector::new(0.0, -1.0, 0.0),
        );

        query.cast_ray(&ray, threshold, true).is_some()
    }
}
