use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use glam::Vec3;

use rewind_core::{
    ClientInputMessage, ClockConfig, ConnectionId, Controller, ControllerConfig, EntityId,
    InputRecord, StateSnapshot, TickCoordinator, Transform, Transport,
};
use rewind_movement::{MoveInput, MovementConfig, MovementSimulator};
use rewind_transport_udp::{Incoming, NetworkStats, UdpTransport};

use crate::config::ClientConfig;

const SPAWN_POINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// The predicted/reconciled local player plus whatever remote entities the
/// host has told this client about. There is no connect handshake (§4.5,
/// Non-goals): `local_connection_id` is generated locally and carried as
/// the `controller_id` on every outbound packet; the host learns it, and
/// this client, from the first `HostState` addressed to that id.
pub struct GameClient {
    transport: UdpTransport,
    coordinator: TickCoordinator<MovementSimulator>,
    local_connection_id: ConnectionId,
    local_entity_id: Option<EntityId>,
    host_addr: SocketAddr,
    last_tick_time: Instant,
    start_time: Instant,
    bootstrap_input: MoveInput,
    bootstrap_tick: u32,
}

impl GameClient {
    pub fn new(bind_addr: &str, host_addr: SocketAddr, config: ClientConfig) -> io::Result<Self> {
        let mut transport = UdpTransport::bind(bind_addr)?;
        transport.set_host(host_addr);

        let clock_config = ClockConfig {
            tick_interval: 1.0 / config.tick_rate as f32,
            ..Default::default()
        };
        let local_connection_id = ConnectionId(generate_connection_id());

        Ok(Self {
            transport,
            coordinator: TickCoordinator::new_client(clock_config, local_connection_id),
            local_connection_id,
            local_entity_id: None,
            host_addr,
            last_tick_time: Instant::now(),
            start_time: Instant::now(),
            bootstrap_input: MoveInput::default(),
            bootstrap_tick: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn is_connected(&self) -> bool {
        self.local_entity_id.is_some()
    }

    pub fn stats(&self) -> &NetworkStats {
        self.transport.stats()
    }

    /// Feeds this tick's sampled input into the local `Simulator` before
    /// `TickCoordinator::update` calls `build_input()` on it. Before the
    /// host has assigned an entity, there is nowhere to queue it yet, so a
    /// raw probe input is sent instead to provoke that assignment.
    pub fn set_input(&mut self, input: MoveInput) {
        match self.local_entity_id {
            Some(entity_id) => {
                if let Some(controller) = self.coordinator.controller_mut(entity_id) {
                    if let Some(sim) = controller.simulator_mut() {
                        sim.queue_input(input);
                    }
                }
            }
            None => self.bootstrap_input = input,
        }
    }

    pub fn tick_once(&mut self) -> io::Result<()> {
        let now = Instant::now();
        let delta = (now - self.last_tick_time).as_secs_f32();
        self.last_tick_time = now;

        self.process_network()?;

        if self.local_entity_id.is_none() {
            self.send_bootstrap_probe();
            return Ok(());
        }

        let wall_now = self.start_time.elapsed().as_secs_f64();
        self.coordinator.update(wall_now, delta, &mut self.transport);
        Ok(())
    }

    fn send_bootstrap_probe(&mut self) {
        self.bootstrap_tick += 1;
        self.transport.send_input(ClientInputMessage {
            controller_id: self.local_connection_id,
            input: InputRecord {
                tick: self.bootstrap_tick,
                payload: self.bootstrap_input,
            },
            previous_input: None,
        });
    }

    fn process_network(&mut self) -> io::Result<()> {
        let incoming = self.transport.poll_incoming()?;
        for item in incoming {
            if let Incoming::HostState { entity_id, controller_id, snapshot, .. } = item {
                if controller_id != self.local_connection_id {
                    continue; // not ours; remote-entity replication is a Non-goal for this demo
                }
                if self.local_entity_id.is_none() {
                    self.adopt_local_entity(entity_id, &snapshot);
                }
                self.coordinator.update_server_tick(snapshot.tick);
                self.coordinator.receive_host_state(entity_id, snapshot);
            }
        }
        Ok(())
    }

    fn adopt_local_entity(&mut self, entity_id: EntityId, snapshot: &StateSnapshot<rewind_movement::MovementState>) {
        let mut controller = Controller::<MovementSimulator>::new(entity_id, ControllerConfig::default());
        controller.assign_connection(self.local_connection_id);
        controller.attach_simulator(MovementSimulator::new(MovementConfig::default(), SPAWN_POINT));
        controller.set_transform(snapshot.transform);
        self.coordinator
            .register(controller)
            .expect("local entity is only adopted once");
        self.local_entity_id = Some(entity_id);
        log::info!("assigned entity {}", entity_id.0);
    }

    pub fn local_transform(&self) -> Option<Transform> {
        let entity_id = self.local_entity_id?;
        self.coordinator.controller(entity_id).map(|c| c.transform())
    }

    pub fn local_entity_id(&self) -> Option<EntityId> {
        self.local_entity_id
    }

    pub fn current_tick(&self) -> u32 {
        self.coordinator.clock().current_tick()
    }
}

fn generate_connection_id() -> u32 {
    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    hasher.write_u128(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos(),
    );
    (hasher.finish() as u32) | 1
}
