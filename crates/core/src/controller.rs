use std::collections::VecDeque;

use crate::context::RuntimeContext;
use crate::history::RingHistory;
use crate::ids::{ConnectionId, EntityId, Tick};
use crate::interpolation::{InterpolatorConfig, RemoteInterpolator, DEFAULT_INTERPOLATION_DELAY, DEFAULT_TELEPORT_THRESHOLD};
use crate::record::InputRecord;
use crate::record::StateSnapshot;
use crate::simulator::Simulator;
use crate::smoothing::{VisualSmoother, DEFAULT_ERROR_SMOOTH_TIME};
use crate::transform::{Transform, TransformOffset};
use crate::transport::{ClientInputMessage, HostStateMessage, RoutingFilter, Transport};

/// Per-controller tunables from §6, everything except `TickInterval`
/// (scene-wide, owned by `Clock`/`TickCoordinator`).
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub history_size: usize,
    pub reconciliation_tolerance: f32,
    pub max_visual_offset: f32,
    pub max_inputs_per_tick: usize,
    pub error_smooth_time: f32,
    pub interpolation_delay: f32,
    pub teleport_threshold: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            history_size: 128,
            reconciliation_tolerance: 0.1,
            max_visual_offset: 2.0,
            max_inputs_per_tick: 5,
            error_smooth_time: DEFAULT_ERROR_SMOOTH_TIME,
            interpolation_delay: DEFAULT_INTERPOLATION_DELAY,
            teleport_threshold: DEFAULT_TELEPORT_THRESHOLD,
        }
    }
}

/// `{Dormant, Local-Client, Local-Host, Proxied-Host, Remote-Observer}` (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerRole {
    Dormant,
    LocalClient,
    LocalHost,
    ProxiedHost,
    RemoteObserver,
}

fn resolve_role(connection_id: Option<ConnectionId>, local_id: Option<ConnectionId>, is_host: bool) -> ControllerRole {
    let Some(owner) = connection_id else {
        return ControllerRole::Dormant;
    };
    let is_local = local_id == Some(owner);
    match (is_host, is_local) {
        (true, true) => ControllerRole::LocalHost,
        (true, false) => ControllerRole::ProxiedHost,
        (false, true) => ControllerRole::LocalClient,
        (false, false) => ControllerRole::RemoteObserver,
    }
}

/// The per-entity prediction/reconciliation state machine (§4.2). Owns its
/// histories, visual offset, and (for proxied controllers) the host-side
/// input queue exclusively — the `TickCoordinator` only holds a reference
/// to drive it.
pub struct Controller<S: Simulator> {
    entity_id: EntityId,
    connection_id: Option<ConnectionId>,
    role: ControllerRole,
    config: ControllerConfig,
    simulator: Option<S>,

    transform: Transform,
    visual_offset: TransformOffset,
    smoother: VisualSmoother,

    input_history: RingHistory<InputRecord<S::InputPayload>>,
    state_history: RingHistory<StateSnapshot<S::StatePayload>>,
    previous_input: Option<InputRecord<S::InputPayload>>,
    last_reconciled_tick: Tick,

    interpolator: RemoteInterpolator<S::StatePayload>,

    // Host-proxy bookkeeping (§4.2 "Host-proxy input handling").
    input_queue: VecDeque<InputRecord<S::InputPayload>>,
    last_server_input: Option<InputRecord<S::InputPayload>>,
    server_tick: Tick,
    last_queued_input_tick: Tick,
}

impl<S: Simulator> Controller<S> {
    pub fn new(entity_id: EntityId, config: ControllerConfig) -> Self {
        let interp_config = InterpolatorConfig {
            interpolation_delay: config.interpolation_delay,
            teleport_threshold: config.teleport_threshold,
            history_size: config.history_size,
        };
        Self {
            entity_id,
            connection_id: None,
            role: ControllerRole::Dormant,
            simulator: None,
            transform: Transform::default(),
            visual_offset: TransformOffset::default(),
            smoother: VisualSmoother::new(config.error_smooth_time),
            input_history: RingHistory::new(config.history_size),
            state_history: RingHistory::new(config.history_size),
            previous_input: None,
            last_reconciled_tick: 0,
            interpolator: RemoteInterpolator::new(interp_config),
            input_queue: VecDeque::new(),
            last_server_input: None,
            server_tick: 0,
            last_queued_input_tick: 0,
            config,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.connection_id
    }

    pub fn role(&self) -> ControllerRole {
        self.role
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// §7 "Fatal: absence of a Simulator ... the controller becomes inert
    /// until one appears." Attaching one later re-enables `simulate_local`
    /// / `process_input_queue`.
    pub fn attach_simulator(&mut self, simulator: S) {
        self.simulator = Some(simulator);
    }

    pub fn has_simulator(&self) -> bool {
        self.simulator.is_some()
    }

    /// Lets the host application feed this tick's input into the attached
    /// `Simulator` (keyboard/mouse state, bot logic) before `build_input()`
    /// is called inside `simulate_local`.
    pub fn simulator_mut(&mut self) -> Option<&mut S> {
        self.simulator.as_mut()
    }

    /// Assigns the replicated owner, host→all, once. Immutable thereafter
    /// per §3 — callers should not call this a second time with a
    /// different id.
    pub fn assign_connection(&mut self, connection_id: ConnectionId) {
        self.connection_id = Some(connection_id);
    }

    /// Re-evaluates role from `(host?, local?)` and the replicated owner,
    /// re-initializing the histories relevant to the newly entered state.
    /// A no-op if the role hasn't changed.
    pub fn update_role(&mut self, ctx: &RuntimeContext) {
        let new_role = resolve_role(self.connection_id, ctx.local_connection_id, ctx.is_host);
        if new_role == self.role {
            return;
        }
        self.on_role_entered(new_role);
        self.role = new_role;
    }

    fn on_role_entered(&mut self, role: ControllerRole) {
        match role {
            ControllerRole::LocalClient => {
                self.input_history.clear();
                self.state_history.clear();
                self.last_reconciled_tick = 0;
                self.previous_input = None;
            }
            ControllerRole::LocalHost => {
                self.state_history.clear();
            }
            ControllerRole::ProxiedHost => {
                self.input_queue.clear();
                self.last_server_input = None;
                self.server_tick = 0;
                self.last_queued_input_tick = 0;
            }
            ControllerRole::RemoteObserver => {
                let interp_config = InterpolatorConfig {
                    interpolation_delay: self.config.interpolation_delay,
                    teleport_threshold: self.config.teleport_threshold,
                    history_size: self.config.history_size,
                };
                self.interpolator = RemoteInterpolator::new(interp_config);
            }
            ControllerRole::Dormant => {}
        }
    }

    /// `simulate()` for local controllers (host or client), §4.2.
    pub fn simulate_local<T>(&mut self, ctx: &RuntimeContext, current_tick: Tick, dt: f32, transport: &mut T)
    where
        T: Transport<InputPayload = S::InputPayload, StatePayload = S::StatePayload>,
    {
        if !matches!(self.role, ControllerRole::LocalClient | ControllerRole::LocalHost) {
            return;
        }
        let Some(sim) = self.simulator.as_mut() else {
            log::warn!("entity {:?}: no Simulator attached, controller is inert", self.entity_id);
            return;
        };

        let payload = sim.build_input();
        let input = InputRecord { tick: current_tick, payload };
        sim.simulate(&mut self.transform, &input.payload, dt);
        let state_payload = sim.write_state();
        let snapshot = StateSnapshot {
            tick: current_tick,
            wall_time: ctx.wall_now,
            transform: self.transform,
            payload: state_payload,
        };

        match self.role {
            ControllerRole::LocalHost => {
                self.state_history.push(snapshot.clone());
                if let Some(owner) = self.connection_id {
                    transport.send_state(
                        HostStateMessage {
                            controller_id: owner,
                            snapshot,
                        },
                        RoutingFilter::EveryoneExceptOwner(owner),
                    );
                }
            }
            ControllerRole::LocalClient => {
                self.input_history.push(input.clone());
                self.state_history.push(snapshot);
                if let Some(owner) = self.connection_id {
                    transport.send_input(ClientInputMessage {
                        controller_id: owner,
                        input: input.clone(),
                        previous_input: self.previous_input.clone(),
                    });
                }
                self.previous_input = Some(input);
            }
            _ => unreachable!(),
        }
    }

    /// Host-side input arrival (§4.2 "Host-proxy input handling").
    pub fn receive_client_input(&mut self, message: ClientInputMessage<S::InputPayload>) {
        if let Some(prev) = message.previous_input {
            if prev.tick > self.last_queued_input_tick {
                self.enqueue_input(prev);
            }
        }
        if message.input.tick <= self.last_queued_input_tick {
            return;
        }
        self.enqueue_input(message.input);
    }

    fn enqueue_input(&mut self, input: InputRecord<S::InputPayload>) {
        self.last_queued_input_tick = input.tick;
        self.input_queue.push_back(input);
        while self.input_queue.len() > self.config.history_size {
            self.input_queue.pop_front();
        }
    }

    /// `processInputQueue()`, §4.2: host-proxy drain, gap-fill, broadcast.
    pub fn process_input_queue<T>(&mut self, ctx: &RuntimeContext, dt: f32, transport: &mut T)
    where
        T: Transport<InputPayload = S::InputPayload, StatePayload = S::StatePayload>,
    {
        if self.role != ControllerRole::ProxiedHost {
            return;
        }
        let Some(owner) = self.connection_id else { return };

        let mut consumed = 0;
        while consumed < self.config.max_inputs_per_tick {
            let Some(input) = self.input_queue.pop_front() else { break };
            consumed += 1;

            if input.tick <= self.server_tick && self.server_tick != 0 {
                continue; // strictly old, drop
            }

            let Some(sim) = self.simulator.as_mut() else {
                log::warn!("entity {:?}: no Simulator attached, dropping queued input", self.entity_id);
                continue;
            };

            while self.server_tick + 1 < input.tick {
                if let Some(filler) = self.last_server_input.clone() {
                    sim.simulate(&mut self.transform, &filler.payload, dt);
                    log::debug!("entity {:?}: host gap-filled tick {}", self.entity_id, self.server_tick + 1);
                }
                self.server_tick += 1;
            }

            sim.simulate(&mut self.transform, &input.payload, dt);
            self.server_tick = input.tick;
            let state_payload = sim.write_state();
            self.last_server_input = Some(input);

            let snapshot = StateSnapshot {
                tick: self.server_tick,
                wall_time: ctx.wall_now,
                transform: self.transform,
                payload: state_payload,
            };
            transport.send_state(
                HostStateMessage {
                    controller_id: owner,
                    snapshot: snapshot.clone(),
                },
                RoutingFilter::SpecificOwner(owner),
            );
            transport.send_state(
                HostStateMessage {
                    controller_id: owner,
                    snapshot,
                },
                RoutingFilter::EveryoneExceptOwner(owner),
            );
        }
    }

    /// Receives an authoritative snapshot. Dispatches to reconciliation
    /// (owner) or the interpolation buffer (observer); a no-op otherwise.
    /// Returns the tick that was just reconciled, if any, so the caller can
    /// advance `lastAckTick` (§4.2 step 2) — `Controller` has no handle
    /// back to the `TickCoordinator` that owns the clock.
    pub fn receive_host_state(&mut self, snapshot: StateSnapshot<S::StatePayload>, dt: f32) -> Option<Tick> {
        match self.role {
            ControllerRole::LocalClient => self.reconcile(snapshot, dt),
            ControllerRole::RemoteObserver => {
                self.interpolator.push_snapshot(snapshot);
                None
            }
            _ => None,
        }
    }

    /// The reconciliation algorithm, §4.2, run on the controlled client.
    fn reconcile(&mut self, server_snapshot: StateSnapshot<S::StatePayload>, dt: f32) -> Option<Tick> {
        let t_s = server_snapshot.tick;
        if t_s <= self.last_reconciled_tick {
            return None; // benign drop: duplicate or out-of-order (§7, §8)
        }

        let Some(predicted) = self.state_history.get(t_s).cloned() else {
            // History aged out: drop silently, wait for a more recent snapshot.
            return None;
        };

        self.input_history.retain_after(t_s);
        self.state_history.retain_after(t_s);
        self.last_reconciled_tick = t_s;

        if predicted.approx_eq(&server_snapshot, self.config.reconciliation_tolerance) {
            return Some(t_s); // happy path
        }

        let visible = self.visual_offset.apply(self.transform);
        self.visual_offset = TransformOffset::default();
        self.transform = server_snapshot.transform;
        if let Some(sim) = self.simulator.as_mut() {
            sim.read_state(&server_snapshot.payload);
        }

        let to_replay = self.input_history.take_after(t_s);
        self.state_history.clear();

        if let Some(sim) = self.simulator.as_mut() {
            for input in &to_replay {
                sim.simulate(&mut self.transform, &input.payload, dt);
                let replayed_snapshot = StateSnapshot {
                    tick: input.tick,
                    wall_time: server_snapshot.wall_time,
                    transform: self.transform,
                    payload: sim.write_state(),
                };
                self.input_history.push(input.clone());
                self.state_history.push(replayed_snapshot);
            }
        }

        let new_transform = self.transform;
        let mut position_offset = visible.position - new_transform.position;
        let mut rotation_offset = new_transform.rotation.inverse() * visible.rotation;
        if position_offset.length() > self.config.max_visual_offset {
            position_offset = glam::Vec3::ZERO;
            rotation_offset = glam::Quat::IDENTITY;
        }
        self.visual_offset = TransformOffset {
            position: position_offset,
            rotation: rotation_offset,
        };

        if let Some(sim) = self.simulator.as_mut() {
            sim.on_reconcile(&server_snapshot, &predicted);
        }

        Some(t_s)
    }

    /// `updateVisuals()`, §4.2: interpolate (observer) or decay offset
    /// (local). Returns the transform the host engine should render.
    pub fn update_visuals(&mut self, ctx: &RuntimeContext, dt: f32) -> Transform {
        match self.role {
            ControllerRole::RemoteObserver => match self.interpolator.sample(ctx.wall_now) {
                Some(sampled) => sampled.transform,
                None => self.transform,
            },
            ControllerRole::LocalClient | ControllerRole::LocalHost => {
                self.smoother.decay(&mut self.visual_offset, dt);
                self.visual_offset.apply(self.transform)
            }
            _ => self.transform,
        }
    }

    pub fn visual_offset_magnitude(&self) -> f32 {
        self.visual_offset.position.length()
    }

    pub fn input_history_len(&self) -> usize {
        self.input_history.len()
    }

    pub fn state_history_len(&self) -> usize {
        self.state_history.len()
    }

    pub fn server_tick(&self) -> Tick {
        self.server_tick
    }
}
