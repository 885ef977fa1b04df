//! Core types and utilities

pub mod leaf;
pub mod met;
pub mod params;
pub mod units;

pub use leaf::{LeafClass, LeafPair, LeafState};
pub use met::{MetForcing, MeteorologicalSample};
pub use params::{CanopyParams, CanopyState, Control, NetRadiationCoupling, PhotosynthesisPathway};
pub use units::{Celsius, CelsiusDelta, Kelvin, Kilopascals, Pascals};
