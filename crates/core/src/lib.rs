//! Client-side prediction and server reconciliation engine core.
//!
//! Generic over an application-supplied [`Simulator`] and [`Transport`];
//! owns the tick-synchronized state machine described in the accompanying
//! specification (`SPEC_FULL.md` at the workspace root) — history, clock,
//! reconciliation, remote interpolation, and visual smoothing — and
//! nothing else. Character movement, wire formats, and host-engine
//! wiring live in sibling crates.

pub mod clock;
pub mod context;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod history;
pub mod ids;
pub mod interpolation;
pub mod record;
pub mod simulator;
pub mod smoothing;
pub mod transform;
pub mod transport;

pub use clock::{Clock, ClockConfig};
pub use context::RuntimeContext;
pub use controller::{Controller, ControllerConfig, ControllerRole};
pub use coordinator::TickCoordinator;
pub use error::{CoreError, CoreResult};
pub use history::RingHistory;
pub use ids::{ConnectionId, EntityId, Tick};
pub use interpolation::{InterpolatorConfig, RemoteInterpolator, SampledTransform};
pub use record::{InputRecord, StateSnapshot, Ticked};
pub use simulator::Simulator;
pub use smoothing::VisualSmoother;
pub use transform::{Transform, TransformOffset};
pub use transport::{ClientInputMessage, HostStateMessage, RoutingFilter, Transport};
