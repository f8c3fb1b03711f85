/// A non-negative, monotonically increasing simulation step counter.
///
/// Wraps `u32` rather than a newtype struct so callers can do ordinary
/// arithmetic against it; `tick_drift` below is the one place wraparound
/// needs care.
pub type Tick = u32;

/// Identifies a replicated entity within a scene, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Identifies the connection that owns (controls) an entity. Assigned once
/// by the host and replicated host-to-all; immutable thereafter. A
/// `Controller` with no `ConnectionId` is dormant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u32);

/// Signed distance between two ticks, accounting for the fact that a
/// client can briefly run ahead of or behind the host.
pub fn tick_drift(current: Tick, server: Tick) -> i64 {
    current as i64 - server as i64
}
