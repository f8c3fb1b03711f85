use crate::ids::ConnectionId;
use crate::record::InputRecord;
use crate::record::StateSnapshot;

/// Which peers a message must be routed to. The transport is responsible
/// for honoring this; the core never reaches into a peer list itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingFilter {
    /// Deliver to the host only.
    Host,
    /// Deliver to exactly one connection — the controller's owner.
    SpecificOwner(ConnectionId),
    /// Deliver to every connection except the controller's owner.
    EveryoneExceptOwner(ConnectionId),
}

/// `ClientInput → Host`: §4.5. Carries the current input paired with the
/// previous one for redundancy against packet loss.
#[derive(Debug, Clone)]
pub struct ClientInputMessage<P> {
    pub controller_id: ConnectionId,
    pub input: InputRecord<P>,
    pub previous_input: Option<InputRecord<P>>,
}

/// `HostAuthoritativeState → Owner` or `→ Observers`: §4.5. The routing
/// filter used to send it (not carried on the wire) distinguishes the two.
#[derive(Debug, Clone)]
pub struct HostStateMessage<P> {
    pub controller_id: ConnectionId,
    pub snapshot: StateSnapshot<P>,
}

/// Best-effort, unordered, unreliable publish surface (§4.5). No
/// reliability, ordering, or deduplication is assumed — the core enforces
/// what it needs via tick-monotonic guards on the receiving side.
pub trait Transport {
    type InputPayload: Clone;
    type StatePayload: Clone;

    fn send_input(&mut self, message: ClientInputMessage<Self::InputPayload>);

    fn send_state(&mut self, message: HostStateMessage<Self::StatePayload>, filter: RoutingFilter);
}
