use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::stats::NetworkStats;
use crate::wire::{WirePacket, MAX_PACKET_SIZE};

/// Thin non-blocking UDP socket wrapper, ported from `net/endpoint.rs`.
/// The handshake/ack-tracking machinery that also lived in that module
/// (and its `connection.rs` sibling) is dropped: the CORE's transport
/// contract is already unreliable/unordered with no session concept
/// (§4.5, Non-goals), so there is nothing here to acknowledge.
pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    recv_buffer: [u8; MAX_PACKET_SIZE],
    stats: NetworkStats,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            recv_buffer: [0u8; MAX_PACKET_SIZE],
            stats: NetworkStats::default(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn send_to(&mut self, packet: &WirePacket, addr: SocketAddr) -> io::Result<()> {
        let data = packet
            .serialize()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let bytes = self.socket.send_to(&data, addr)?;
        self.stats.packets_sent += 1;
        self.stats.bytes_sent += bytes as u64;
        Ok(())
    }

    /// Drains every packet currently queued on the socket without blocking.
    pub fn receive(&mut self) -> io::Result<Vec<(WirePacket, SocketAddr)>> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => match WirePacket::deserialize(&self.recv_buffer[..size]) {
                    Ok(packet) if packet.header.is_valid() => {
                        self.stats.packets_received += 1;
                        self.stats.bytes_received += size as u64;
                        packets.push((packet, addr));
                    }
                    Ok(_) => log::warn!("dropped packet from {addr}: invalid header"),
                    Err(e) => log::warn!("dropped malformed packet from {addr}: {e}"),
                },
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        Ok(packets)
    }
}
