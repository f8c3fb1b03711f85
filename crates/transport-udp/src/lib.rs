//! UDP `rewind_core::Transport` adapter, wiring the `rewind_movement`
//! `Simulator`'s input/state payloads onto the wire with the fixed-point
//! scaling `net/protocol.rs` uses for its own wire types.

pub mod endpoint;
pub mod stats;
pub mod transport;
pub mod wire;

pub use endpoint::NetworkEndpoint;
pub use stats::NetworkStats;
pub use transport::{Incoming, UdpTransport};
