use std::collections::HashMap;

use crate::clock::{Clock, ClockConfig};
use crate::context::RuntimeContext;
use crate::controller::{Controller, ControllerRole};
use crate::error::{CoreError, CoreResult};
use crate::ids::{ConnectionId, EntityId, Tick};
use crate::simulator::Simulator;
use crate::transport::Transport;

/// Scene-wide clock plus per-tick dispatch to registered controllers
/// (§4.1). Grounded on `SimulationLoop` (`simulation/tick.rs`), generalized
/// from one hardcoded tick function to the two-phase proxied/local
/// dispatch the distilled spec requires.
pub struct TickCoordinator<S: Simulator> {
    clock: Clock,
    is_host: bool,
    local_connection_id: Option<ConnectionId>,
    controllers: HashMap<EntityId, Controller<S>>,
}

impl<S: Simulator> TickCoordinator<S> {
    pub fn new_host(clock_config: ClockConfig) -> Self {
        Self {
            clock: Clock::new_host(clock_config),
            is_host: true,
            local_connection_id: None,
            controllers: HashMap::new(),
        }
    }

    pub fn new_client(clock_config: ClockConfig, local_connection_id: ConnectionId) -> Self {
        Self {
            clock: Clock::new_client(clock_config),
            is_host: false,
            local_connection_id: Some(local_connection_id),
            controllers: HashMap::new(),
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Idempotent set membership: registering an already-present entity id
    /// is an error rather than silently replacing it, since that would
    /// drop in-flight history.
    pub fn register(&mut self, controller: Controller<S>) -> CoreResult<()> {
        if self.controllers.contains_key(&controller.entity_id()) {
            return Err(CoreError::DuplicateController(controller.entity_id()));
        }
        self.controllers.insert(controller.entity_id(), controller);
        Ok(())
    }

    pub fn unregister(&mut self, entity_id: EntityId) -> Option<Controller<S>> {
        self.controllers.remove(&entity_id)
    }

    pub fn controller(&self, entity_id: EntityId) -> Option<&Controller<S>> {
        self.controllers.get(&entity_id)
    }

    pub fn controller_mut(&mut self, entity_id: EntityId) -> Option<&mut Controller<S>> {
        self.controllers.get_mut(&entity_id)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller<S>> {
        self.controllers.values()
    }

    pub fn acknowledge_tick(&mut self, t: Tick) {
        self.clock.acknowledge_tick(t);
    }

    /// Non-host only; see `Clock::update_server_tick`.
    pub fn update_server_tick(&mut self, t: Tick) {
        self.clock.update_server_tick(t, self.is_host);
    }

    /// Routes an inbound client input to the addressed controller, if any.
    pub fn receive_client_input(&mut self, entity_id: EntityId, message: crate::transport::ClientInputMessage<S::InputPayload>) {
        if let Some(controller) = self.controllers.get_mut(&entity_id) {
            controller.receive_client_input(message);
        }
    }

    /// Routes an inbound authoritative state to the addressed controller and
    /// advances `lastAckTick` (§4.2 step 2) when it actually reconciles.
    pub fn receive_host_state(&mut self, entity_id: EntityId, snapshot: crate::record::StateSnapshot<S::StatePayload>) {
        let dt = self.clock.config().tick_interval;
        let acked = self
            .controllers
            .get_mut(&entity_id)
            .and_then(|controller| controller.receive_host_state(snapshot, dt));
        if let Some(tick) = acked {
            self.acknowledge_tick(tick);
        }
    }

    /// The per-frame driver (§4.1). `wall_now` and `frame_delta` come from
    /// the host engine per the transport/engine contract (§6); this never
    /// reads a wall clock itself, matching design notes §9.
    pub fn update<T>(&mut self, wall_now: f64, frame_delta: f32, transport: &mut T)
    where
        T: Transport<InputPayload = S::InputPayload, StatePayload = S::StatePayload>,
    {
        let tick_interval = self.clock.config().tick_interval;
        let ticks = self.clock.begin_frame(frame_delta, self.is_host);

        for _ in 0..ticks {
            let ctx = RuntimeContext::new(self.local_connection_id, self.is_host, wall_now, tick_interval);

            for controller in self.controllers.values_mut() {
                controller.update_role(&ctx);
            }

            for controller in self.controllers.values_mut() {
                if controller.role() == ControllerRole::ProxiedHost {
                    controller.process_input_queue(&ctx, tick_interval, transport);
                }
            }

            for controller in self.controllers.values_mut() {
                controller.simulate_local(&ctx, self.clock.current_tick(), tick_interval, transport);
            }

            if self.is_host {
                self.clock.advance_host_tick();
            } else {
                self.clock.advance_tick();
            }
        }

        let visual_ctx = RuntimeContext::new(self.local_connection_id, self.is_host, wall_now, frame_delta);
        for controller in self.controllers.values_mut() {
            controller.update_visuals(&visual_ctx, frame_delta);
        }
    }
}
