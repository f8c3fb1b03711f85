use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;

use rewind_core::{
    ClientInputMessage, ConnectionId, EntityId, HostStateMessage, InputRecord, RoutingFilter,
    Transport,
};
use rewind_movement::{MoveInput, MovementState};

use crate::endpoint::NetworkEndpoint;
use crate::stats::NetworkStats;
use crate::wire::{decode_input, decode_state, encode_input, encode_state, WirePacket, WirePayload};

/// A decoded inbound message, ready to route into a `TickCoordinator`. Carries
/// the sender's socket address so a host can learn a new peer from its first
/// packet instead of requiring a separate handshake (§4.5, Non-goals).
pub enum Incoming {
    ClientInput {
        entity_id: EntityId,
        message: ClientInputMessage<MoveInput>,
        addr: SocketAddr,
    },
    HostState {
        entity_id: EntityId,
        controller_id: ConnectionId,
        snapshot: rewind_core::StateSnapshot<MovementState>,
        addr: SocketAddr,
    },
}

/// Concrete `rewind_core::Transport` over a UDP socket, grounded in
/// `net/protocol.rs` + `net/endpoint.rs`. Peer addressing is a flat
/// `ConnectionId -> SocketAddr` table the binary populates as connections
/// are accepted; there is no handshake here (§4.5, Non-goals) — a peer is
/// "known" the moment the binary calls [`UdpTransport::register_peer`].
pub struct UdpTransport {
    endpoint: NetworkEndpoint,
    peers: HashMap<ConnectionId, SocketAddr>,
    entities: HashMap<ConnectionId, EntityId>,
    host_addr: Option<SocketAddr>,
}

impl UdpTransport {
    pub fn bind<A: std::net::ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Ok(Self {
            endpoint: NetworkEndpoint::bind(addr)?,
            peers: HashMap::new(),
            entities: HashMap::new(),
            host_addr: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }

    pub fn stats(&self) -> &NetworkStats {
        self.endpoint.stats()
    }

    /// Client-side: point every future `send_input` at the host.
    pub fn set_host(&mut self, addr: SocketAddr) {
        self.host_addr = Some(addr);
    }

    /// Host-side: a client has been accepted and owns `entity_id` via
    /// `connection_id`. Future `SpecificOwner`/`EveryoneExceptOwner` sends
    /// reach this address.
    pub fn register_peer(&mut self, connection_id: ConnectionId, entity_id: EntityId, addr: SocketAddr) {
        self.peers.insert(connection_id, addr);
        self.entities.insert(connection_id, entity_id);
    }

    pub fn unregister_peer(&mut self, connection_id: ConnectionId) {
        self.peers.remove(&connection_id);
        self.entities.remove(&connection_id);
    }

    /// Client-side: also needs to know its own entity id to stamp outbound
    /// input packets.
    pub fn set_local_entity(&mut self, connection_id: ConnectionId, entity_id: EntityId) {
        self.entities.insert(connection_id, entity_id);
    }

    fn send_packet(&mut self, payload: WirePayload, addr: SocketAddr) {
        let packet = WirePacket::new(payload);
        if let Err(e) = self.endpoint.send_to(&packet, addr) {
            log::warn!("send to {addr} failed: {e}");
        }
    }

    /// Non-blocking drain of everything queued on the socket, decoded and
    /// ready to hand to `TickCoordinator::receive_client_input`/
    /// `receive_host_state`.
    pub fn poll_incoming(&mut self) -> io::Result<Vec<Incoming>> {
        let mut out = Vec::new();
        for (packet, addr) in self.endpoint.receive()? {
            match packet.payload {
                WirePayload::ClientInput {
                    entity_id,
                    controller_id,
                    tick,
                    input,
                    previous,
                } => {
                    let message = ClientInputMessage {
                        controller_id: ConnectionId(controller_id),
                        input: InputRecord {
                            tick,
                            payload: decode_input(&input),
                        },
                        previous_input: previous.map(|(prev_tick, prev_input)| InputRecord {
                            tick: prev_tick,
                            payload: decode_input(&prev_input),
                        }),
                    };
                    out.push(Incoming::ClientInput {
                        entity_id: EntityId(entity_id),
                        message,
                        addr,
                    });
                }
                WirePayload::HostState { entity_id, controller_id, state } => {
                    out.push(Incoming::HostState {
                        entity_id: EntityId(entity_id),
                        controller_id: ConnectionId(controller_id),
                        snapshot: decode_state(&state),
                        addr,
                    });
                }
            }
        }
        Ok(out)
    }
}

impl Transport for UdpTransport {
    type InputPayload = MoveInput;
    type StatePayload = MovementState;

    fn send_input(&mut self, message: ClientInputMessage<MoveInput>) {
        let Some(addr) = self.host_addr else {
            log::warn!("send_input with no host address set");
            return;
        };
        let entity_id = self
            .entities
            .get(&message.controller_id)
            .copied()
            .unwrap_or(EntityId(0));

        let payload = WirePayload::ClientInput {
            entity_id: entity_id.0,
            controller_id: message.controller_id.0,
            tick: message.input.tick,
            input: encode_input(&message.input.payload),
            previous: message
                .previous_input
                .as_ref()
                .map(|p| (p.tick, encode_input(&p.payload))),
        };
        self.send_packet(payload, addr);
    }

    fn send_state(&mut self, message: HostStateMessage<MovementState>, filter: RoutingFilter) {
        let entity_id = self
            .entities
            .get(&message.controller_id)
            .copied()
            .unwrap_or(EntityId(0));

        let payload = WirePayload::HostState {
            entity_id: entity_id.0,
            controller_id: message.controller_id.0,
            state: encode_state(&message.snapshot),
        };

        match filter {
            RoutingFilter::Host => {
                if let Some(addr) = self.host_addr {
                    self.send_packet(payload, addr);
                }
            }
            RoutingFilter::SpecificOwner(owner) => {
                if let Some(&addr) = self.peers.get(&owner) {
                    self.send_packet(payload, addr);
                }
            }
            RoutingFilter::EveryoneExceptOwner(owner) => {
                let targets: Vec<SocketAddr> = self
                    .peers
                    .iter()
                    .filter(|&(&id, _)| id != owner)
                    .map(|(_, &addr)| addr)
                    .collect();
                for addr in targets {
                    self.send_packet(payload.clone(), addr);
                }
            }
        }
    }
}
