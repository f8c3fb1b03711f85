use thiserror::Error;

/// Boundary failures the core surfaces as `Result`. Per §7, most runtime
/// conditions (stale packets, drift, gap-fill) are self-repairing and are
/// logged, not returned as errors — this enum is reserved for the handful
/// of genuinely fatal setup mistakes.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("controller for entity {0:?} is already registered with the coordinator")]
    DuplicateController(crate::ids::EntityId),

    #[error("no Simulator attached to controller for entity {0:?}")]
    MissingSimulator(crate::ids::EntityId),
}

pub type CoreResult<T> = Result<T, CoreError>;
