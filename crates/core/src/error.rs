use crate::core_types::leaf::LeafClass;
use thiserror::Error;

/// Errors that abort a canopy simulation run.
///
/// None of these are recoverable within the run: callers are expected to stop
/// the current simulation and report the diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanopyError {
    #[error("C4 photosynthesis not implemented")]
    C4NotImplemented,
    #[error("No convergence in canopy loop: {leaf} leaf after {iterations} iterations (last step {last_step:.4}°C)")]
    NonConvergence {
        leaf: LeafClass,
        iterations: usize,
        last_step: f64,
    },
    #[error("Meteorological forcing exhausted at half-hour {cursor} (only {len} samples)")]
    ForcingExhausted { cursor: usize, len: usize },
    #[error("Invalid canopy parameter {name}={value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Convenience type for `Result<T, CanopyError>`.
pub type CanopyResult<T> = Result<T, CanopyError>;
