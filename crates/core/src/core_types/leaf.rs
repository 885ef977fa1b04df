//! Sunlit/shaded leaf classes
//!
//! The canopy is represented by exactly two big leaves. Values that exist once
//! per class are carried in a [`LeafPair`] rather than an indexed array so the
//! cardinality is part of the type.

use crate::core_types::units::{Celsius, Pascals};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Representative leaf class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafClass {
    /// Leaves receiving direct beam plus diffuse radiation
    Sunlit,
    /// Leaves receiving diffuse and scattered radiation only
    Shaded,
}

impl LeafClass {
    pub fn name(&self) -> &'static str {
        match self {
            LeafClass::Sunlit => "sunlit",
            LeafClass::Shaded => "shaded",
        }
    }
}

impl fmt::Display for LeafClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per leaf class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeafPair<T> {
    pub sunlit: T,
    pub shaded: T,
}

impl<T> LeafPair<T> {
    pub const fn new(sunlit: T, shaded: T) -> Self {
        Self { sunlit, shaded }
    }

    pub fn get(&self, class: LeafClass) -> &T {
        match class {
            LeafClass::Sunlit => &self.sunlit,
            LeafClass::Shaded => &self.shaded,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> LeafPair<U> {
        LeafPair {
            sunlit: f(self.sunlit),
            shaded: f(self.shaded),
        }
    }
}

impl LeafPair<f64> {
    /// Sum of both classes
    pub fn total(&self) -> f64 {
        self.sunlit + self.shaded
    }

    /// LAI-weighted sum used to scale leaf fluxes to the canopy:
    /// `weights.sunlit × sunlit + weights.shaded × shaded`
    pub fn weighted_sum(&self, weights: &LeafPair<f64>) -> f64 {
        weights.sunlit * self.sunlit + weights.shaded * self.shaded
    }
}

/// Mutable state of one leaf class inside the stability loop
///
/// Created from air-space values at the start of each solve and discarded once
/// the leaf fluxes have been scaled to the canopy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafState {
    /// Leaf temperature
    pub tleaf: Celsius,
    /// CO2 concentration at the leaf surface (µmol mol⁻¹)
    pub cs: f64,
    /// Vapour pressure deficit at the leaf surface
    pub dleaf: Pascals,
    /// Absorbed PAR (µmol m⁻² s⁻¹)
    pub apar: f64,
    /// Stomatal conductance to CO2 (mol m⁻² s⁻¹)
    pub gsc: f64,
    /// Net assimilation (µmol m⁻² s⁻¹)
    pub anleaf: f64,
    /// Transpiration (mol H2O m⁻² s⁻¹)
    pub transpiration: f64,
    /// Isothermal net radiation from the last energy-balance pass (W m⁻²)
    pub rnet: f64,
}

impl LeafState {
    /// Initialise leaf temperature, surface VPD and surface CO2 from the air
    pub fn from_air(tair: Celsius, vpd: Pascals, co2: f64, apar: f64) -> Self {
        Self {
            tleaf: tair,
            cs: co2,
            dleaf: vpd,
            apar,
            gsc: 0.0,
            anleaf: 0.0,
            transpiration: 0.0,
            rnet: 0.0,
        }
    }
}
