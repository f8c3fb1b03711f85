//! Quake-style strafe-jump character movement: the concrete
//! `rewind_core::Simulator` that demonstrates the CORE engine is generic
//! over application movement code, grounded in `player/*` + `physics/*`.

pub mod config;
pub mod controller;
pub mod input;
pub mod physics;
pub mod state;
pub mod simulator;

pub use config::MovementConfig;
pub use input::{MoveFlags, MoveInput};
pub use physics::MovementPhysics;
pub use simulator::MovementSimulator;
pub use state::MovementState;
