//! Collaborator interfaces consumed by the canopy loop
//!
//! The canopy loop couples leaf physics it owns with models it does not:
//! solar geometry and radiation partitioning, the photosynthesis biochemistry
//! and the sub-daily water balance. Each is a trait so a site can plug in its
//! own implementation (or a test can plug in a stub).

use crate::core_types::leaf::LeafPair;
use crate::core_types::units::{Celsius, Pascals};

/// Sun position for one half-hour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    /// Cosine of the solar zenith angle
    pub cos_zenith: f64,
    /// Solar elevation (radians); the sun is up when positive
    pub elevation: f64,
}

/// Radiation absorbed by the two leaf classes and their leaf area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AbsorbedRadiation {
    /// Absorbed PAR per unit leaf area (µmol m⁻² s⁻¹)
    pub apar: LeafPair<f64>,
    /// Sunlit/shaded leaf area index; sums to total LAI when the sun is up
    pub lai: LeafPair<f64>,
}

/// Solar geometry and canopy radiation partitioning
pub trait RadiationModel {
    /// Solar zenith angle and elevation for a day of year and half-hour slot
    fn zenith_angle(&self, doy: u16, half_hour: usize) -> SunPosition;

    /// Fraction of incident PAR that is diffuse, in [0, 1]
    fn diffuse_fraction(&self, doy: u16, cos_zenith: f64, par: f64) -> f64;

    /// Partition incident PAR between sunlit and shaded leaves
    fn absorbed_radiation(
        &self,
        par: f64,
        diffuse_frac: f64,
        elevation: f64,
        cos_zenith: f64,
        total_lai: f64,
    ) -> AbsorbedRadiation;
}

/// Leaf conditions handed to the photosynthesis model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafEnvironment {
    /// Nitrogen content of the leaf class (g N m⁻²)
    pub ncontent: f64,
    pub tleaf: Celsius,
    /// Absorbed PAR (µmol m⁻² s⁻¹)
    pub apar: f64,
    /// CO2 at the leaf surface (µmol mol⁻¹)
    pub cs: f64,
    /// Vapour pressure deficit at the leaf surface
    pub dleaf: Pascals,
}

/// Stomatal conductance and net assimilation of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GasExchange {
    /// Stomatal conductance to CO2 (mol m⁻² s⁻¹)
    pub gsc: f64,
    /// Net assimilation (µmol m⁻² s⁻¹)
    pub assimilation: f64,
}

/// Leaf photosynthesis biochemistry
///
/// Only the C3 pathway exists; the canopy loop refuses to run a C4
/// configuration before calling into the model.
pub trait PhotosynthesisModel {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange;
}

/// Sub-daily soil and canopy water balance
pub trait WaterBalance {
    /// Advance the water balance by one half-hour
    ///
    /// # Arguments
    /// * `total_rnet` - Net radiation handed over by the canopy loop (W m⁻²)
    /// * `canopy_transpiration` - Canopy transpiration (mol H2O m⁻² s⁻¹)
    fn sub_daily_water_balance(&mut self, total_rnet: f64, canopy_transpiration: f64);
}

impl<T: RadiationModel + ?Sized> RadiationModel for &T {
    fn zenith_angle(&self, doy: u16, half_hour: usize) -> SunPosition {
        (**self).zenith_angle(doy, half_hour)
    }

    fn diffuse_fraction(&self, doy: u16, cos_zenith: f64, par: f64) -> f64 {
        (**self).diffuse_fraction(doy, cos_zenith, par)
    }

    fn absorbed_radiation(
        &self,
        par: f64,
        diffuse_frac: f64,
        elevation: f64,
        cos_zenith: f64,
        total_lai: f64,
    ) -> AbsorbedRadiation {
        (**self).absorbed_radiation(par, diffuse_frac, elevation, cos_zenith, total_lai)
    }
}

impl<T: PhotosynthesisModel + ?Sized> PhotosynthesisModel for &T {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange {
        (**self).photosynthesis_c3(leaf)
    }
}

impl<T: WaterBalance + ?Sized> WaterBalance for &mut T {
    fn sub_daily_water_balance(&mut self, total_rnet: f64, canopy_transpiration: f64) {
        (**self).sub_daily_water_balance(total_rnet, canopy_transpiration);
    }
}
