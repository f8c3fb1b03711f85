use crate::record::StateSnapshot;
use crate::transform::Transform;

/// The capability set a `Controller` delegates to the application (§6).
///
/// Design notes §9: the controller never discovers its simulator via
/// reflection — the integrating code constructs one and hands it to the
/// controller explicitly.
pub trait Simulator {
    /// Application-defined per-tick control payload (movement vector,
    /// view angles, action bits).
    type InputPayload: Clone;
    /// Application-defined simulation payload beyond position/rotation
    /// (velocity, grounded flag, animation state, ...).
    type StatePayload: Clone;

    /// Produces the current frame's input payload.
    fn build_input(&mut self) -> Self::InputPayload;

    /// Advances application state by exactly `dt` seconds, which the
    /// coordinator always sets to `TickInterval` regardless of real frame
    /// time, so that replays are deterministic with respect to
    /// `(input, starting snapshot)`.
    fn simulate(&mut self, transform: &mut Transform, input: &Self::InputPayload, dt: f32);

    /// Captures application state beyond the transform.
    fn write_state(&self) -> Self::StatePayload;

    /// Restores application state captured by `write_state`.
    fn read_state(&mut self, payload: &Self::StatePayload);

    /// Invoked once per correction so the application can cancel predicted
    /// side effects (sounds, particles). No-op by default.
    fn on_reconcile(&mut self, _server: &StateSnapshot<Self::StatePayload>, _predicted: &StateSnapshot<Self::StatePayload>) {}
}
