//! Two-Leaf Canopy Core Library
//!
//! Half-hourly canopy photosynthesis and transpiration for a sunlit and a
//! shaded big leaf. Leaf temperature, leaf-surface CO2 and leaf-surface vapour
//! pressure deficit are solved by coupling a photosynthesis model with a leaf
//! energy balance (isothermal net radiation, boundary-layer conductances and
//! Penman-Monteith transpiration) until leaf temperature settles.
//!
//! ## Layout
//!
//! - [`core_types`] - units, leaf classes, meteorological forcing, parameters
//! - [`physics`] - conductances, psychrometrics, leaf energy balance, nitrogen
//! - [`solver`] - the per-leaf stability loop
//! - [`simulation`] - the half-hourly canopy day driver and parallel ensembles
//! - [`collaborators`] - radiation, photosynthesis and water balance interfaces
//! - [`fluxes`] - daily carbon and water accumulators

pub mod collaborators;
pub mod core_types;
pub mod error;
pub mod fluxes;
pub mod physics;
pub mod simulation;
pub mod solver;

pub use collaborators::{
    AbsorbedRadiation, GasExchange, LeafEnvironment, PhotosynthesisModel, RadiationModel,
    SunPosition, WaterBalance,
};
pub use core_types::{
    CanopyParams, CanopyState, Celsius, CelsiusDelta, Control, Kelvin, Kilopascals, LeafClass,
    LeafPair, LeafState, MetForcing, MeteorologicalSample, NetRadiationCoupling, Pascals,
    PhotosynthesisPathway,
};
pub use error::{CanopyError, CanopyResult};
pub use fluxes::DailyFluxes;
pub use simulation::{
    run_ensemble, CanopyAggregate, CanopyModel, DaySummary, HalfHourRecord, SiteDay, SlotBranch,
};
pub use solver::{LeafSolution, LoopExit};
