//! Canopy simulation driver
//!
//! `CanopyModel` runs the half-hourly two-leaf loop for one site;
//! `run_ensemble` runs independent sites in parallel.

pub mod canopy;
pub mod ensemble;

pub use canopy::{
    CanopyAggregate, CanopyModel, DaySummary, HalfHourRecord, SlotBranch, PAR_DARK_THRESHOLD,
};
pub use ensemble::{run_ensemble, SiteDay};
