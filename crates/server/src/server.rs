use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec3;

use rewind_core::{ClockConfig, ConnectionId, Controller, ControllerConfig, EntityId, TickCoordinator};
use rewind_movement::{MovementConfig, MovementSimulator};
use rewind_transport_udp::{Incoming, NetworkStats, UdpTransport};

use crate::config::ServerConfig;
use crate::events::{DisconnectReason, ServerEvent};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
const SPAWN_POINT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

struct ClientInfo {
    entity_id: EntityId,
    addr: SocketAddr,
    last_seen: Instant,
}

/// The host demo binary's core loop, grounded on `server/server.rs`'s
/// `GameServer`. Unlike the teacher it has no `ConnectionManager`/salt
/// handshake: a `ConnectionId` arrives self-assigned in the first packet a
/// client sends, and the host learns the peer's address from that packet
/// (§4.5, Non-goals — no session establishment in the core contract).
pub struct GameServer {
    config: ServerConfig,
    transport: UdpTransport,
    coordinator: TickCoordinator<MovementSimulator>,
    clients: HashMap<ConnectionId, ClientInfo>,
    next_entity_id: u32,
    last_tick_time: Instant,
    running: Arc<AtomicBool>,
    start_time: Instant,
    pending_events: VecDeque<ServerEvent>,
}

impl GameServer {
    pub fn new(bind_addr: &str, config: ServerConfig) -> io::Result<Self> {
        let transport = UdpTransport::bind(bind_addr)?;
        let clock_config = ClockConfig {
            tick_interval: 1.0 / config.tick_rate as f32,
            ..Default::default()
        };

        Ok(Self {
            config,
            transport,
            coordinator: TickCoordinator::new_host(clock_config),
            clients: HashMap::new(),
            next_entity_id: 1,
            last_tick_time: Instant::now(),
            running: Arc::new(AtomicBool::new(true)),
            start_time: Instant::now(),
            pending_events: VecDeque::new(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn run(&mut self) {
        while self.running.load(Ordering::SeqCst) {
            self.tick_once();
            std::thread::sleep(Duration::from_millis(1));
        }
        self.shutdown_connections();
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = (now - self.last_tick_time).as_secs_f32();
        self.last_tick_time = now;

        if let Err(e) = self.process_network() {
            self.pending_events.push_back(ServerEvent::Error {
                message: format!("network error: {e}"),
            });
        }

        let wall_now = self.start_time.elapsed().as_secs_f64();
        self.coordinator.update(wall_now, delta, &mut self.transport);

        self.cleanup_timed_out();
    }

    fn process_network(&mut self) -> io::Result<()> {
        let incoming = self.transport.poll_incoming()?;
        for item in incoming {
            match item {
                Incoming::ClientInput { message, addr, .. } => {
                    let connection_id = message.controller_id;
                    let entity_id = self.ensure_client(connection_id, addr);
                    self.coordinator.receive_client_input(entity_id, message);
                }
                Incoming::HostState { .. } => {
                    // a host never accepts authoritative state from a peer
                }
            }
        }
        Ok(())
    }

    /// Registers a never-before-seen connection on first contact, spawning
    /// a fresh `MovementSimulator` and entity for it; otherwise refreshes
    /// the timeout clock and returns the entity it already owns.
    fn ensure_client(&mut self, connection_id: ConnectionId, addr: SocketAddr) -> EntityId {
        if let Some(client) = self.clients.get_mut(&connection_id) {
            client.last_seen = Instant::now();
            client.addr = addr;
            return client.entity_id;
        }

        let entity_id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;

        let mut controller = Controller::<MovementSimulator>::new(entity_id, ControllerConfig::default());
        controller.assign_connection(connection_id);
        controller.attach_simulator(MovementSimulator::new(MovementConfig::default(), SPAWN_POINT));
        self.coordinator
            .register(controller)
            .expect("entity ids are assigned sequentially and never reused");

        self.transport.register_peer(connection_id, entity_id, addr);
        self.clients.insert(
            connection_id,
            ClientInfo {
                entity_id,
                addr,
                last_seen: Instant::now(),
            },
        );

        self.pending_events.push_back(ServerEvent::ClientConnected { addr, entity_id: entity_id.0 });
        entity_id
    }

    fn cleanup_timed_out(&mut self) {
        let stale: Vec<ConnectionId> = self
            .clients
            .iter()
            .filter(|(_, client)| client.last_seen.elapsed() > CLIENT_TIMEOUT)
            .map(|(id, _)| *id)
            .collect();

        for connection_id in stale {
            self.drop_client(connection_id, DisconnectReason::Timeout);
        }
    }

    pub fn kick_client(&mut self, connection_id: ConnectionId) {
        self.drop_client(connection_id, DisconnectReason::Kicked);
    }

    fn drop_client(&mut self, connection_id: ConnectionId, reason: DisconnectReason) {
        let Some(client) = self.clients.remove(&connection_id) else {
            return;
        };
        self.coordinator.unregister(client.entity_id);
        self.transport.unregister_peer(connection_id);
        self.pending_events.push_back(ServerEvent::ClientDisconnected {
            entity_id: client.entity_id.0,
            reason,
        });
    }

    pub fn shutdown_connections(&mut self) {
        let connection_ids: Vec<ConnectionId> = self.clients.keys().copied().collect();
        for connection_id in connection_ids {
            self.kick_client(connection_id);
        }
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            uptime_secs: self.start_time.elapsed().as_secs(),
            tick: self.coordinator.clock().current_tick(),
            client_count: self.clients.len(),
            max_clients: self.config.max_clients,
            network_stats: self.transport.stats().clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerStats {
    pub uptime_secs: u64,
    pub tick: u32,
    pub client_count: usize,
    pub max_clients: usize,
    pub network_stats: NetworkStats,
}
