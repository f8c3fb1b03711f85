use crate::ids::Tick;
use crate::transform::Transform;

/// Anything stamped with a `Tick`, so `RingHistory` can stay generic over
/// both `InputRecord` and `StateSnapshot`.
pub trait Ticked {
    fn tick(&self) -> Tick;
}

/// A single tick's worth of application-defined control input.
///
/// Lifecycle (§3): built by the local controller in the build-input phase
/// of tick T, enqueued to local history, transmitted to the host paired
/// with the record of tick T-1 for redundancy, consumed once on the host
/// and discarded.
#[derive(Debug, Clone)]
pub struct InputRecord<P> {
    pub tick: Tick,
    pub payload: P,
}

impl<P> Ticked for InputRecord<P> {
    fn tick(&self) -> Tick {
        self.tick
    }
}

/// The application's simulation state at the end of a specific tick.
///
/// `payload` is opaque to the core; `transform` is the position/rotation
/// pair every controller role needs (for reconciliation, interpolation,
/// and visual smoothing) regardless of what the application tracks.
#[derive(Debug, Clone)]
pub struct StateSnapshot<P> {
    pub tick: Tick,
    pub wall_time: f64,
    pub transform: Transform,
    pub payload: P,
}

impl<P> Ticked for StateSnapshot<P> {
    fn tick(&self) -> Tick {
        self.tick
    }
}

impl<P> StateSnapshot<P> {
    /// Tolerance-based equality on position only, per §3.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        self.transform.position.distance(other.transform.position) <= tolerance
    }
}
