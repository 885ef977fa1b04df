//! Daily flux accumulators
//!
//! Zeroed at the start of each simulated day, accumulated once per half-hour
//! by the canopy loop and read by the caller at the end of the day.

use crate::physics::constants::{
    GRAM_C_2_TONNES_HA, G_TO_KG, MOLE_WATER_2_G_WATER, MOL_C_TO_GRAMS_C, SEC_2_HLFHR, UMOL_TO_MOL,
};
use serde::{Deserialize, Serialize};

/// Running daily carbon and water totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyFluxes {
    /// Gross primary production (g C m⁻² d⁻¹)
    pub gpp_gcm2: f64,
    /// Net primary production (g C m⁻² d⁻¹)
    pub npp_gcm2: f64,
    /// Gross primary production (t C ha⁻¹ d⁻¹)
    pub gpp: f64,
    /// Net primary production (t C ha⁻¹ d⁻¹)
    pub npp: f64,
    /// Autotrophic respiration, GPP − NPP (t C ha⁻¹ d⁻¹)
    pub auto_resp: f64,
    /// Absorbed PAR summed over half-hours (µmol m⁻² s⁻¹ per slot)
    pub apar: f64,
    /// Canopy transpiration (mm d⁻¹)
    pub transpiration: f64,
    /// Net radiation handed to the water balance, summed over half-hours (W m⁻²)
    pub total_rnet: f64,
}

impl DailyFluxes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every carbon counter at the start of a day
    pub fn zero_carbon_fluxes(&mut self) {
        self.gpp_gcm2 = 0.0;
        self.npp_gcm2 = 0.0;
        self.gpp = 0.0;
        self.npp = 0.0;
        self.auto_resp = 0.0;
        self.apar = 0.0;
    }

    /// Reset the water-side counters at the start of a day
    pub fn zero_water_fluxes(&mut self) {
        self.transpiration = 0.0;
        self.total_rnet = 0.0;
    }

    /// Accumulate one half-hour of canopy assimilation
    ///
    /// # Arguments
    /// * `acanopy` - Canopy net assimilation (µmol m⁻² s⁻¹)
    /// * `total_apar` - APAR of both leaf classes for the slot
    /// * `cue` - Carbon use efficiency (NPP/GPP)
    pub fn update_daily_carbon_fluxes(&mut self, acanopy: f64, total_apar: f64, cue: f64) {
        // umol m-2 s-1 -> gC m-2 30 min-1
        self.gpp_gcm2 += acanopy * UMOL_TO_MOL * MOL_C_TO_GRAMS_C * SEC_2_HLFHR;
        self.npp_gcm2 = self.gpp_gcm2 * cue;
        self.gpp = self.gpp_gcm2 * GRAM_C_2_TONNES_HA;
        self.npp = self.npp_gcm2 * GRAM_C_2_TONNES_HA;
        self.auto_resp = self.gpp - self.npp;
        self.apar += total_apar;
    }

    /// Accumulate one half-hour of canopy transpiration and the net radiation
    /// forwarded to the water balance
    ///
    /// # Arguments
    /// * `trans_canopy` - Canopy transpiration (mol H2O m⁻² s⁻¹)
    /// * `total_rnet` - Net radiation handed to the water balance (W m⁻²)
    pub fn update_daily_water_fluxes(&mut self, trans_canopy: f64, total_rnet: f64) {
        // mol m-2 s-1 -> mm 30 min-1
        self.transpiration += trans_canopy * MOLE_WATER_2_G_WATER * G_TO_KG * SEC_2_HLFHR;
        self.total_rnet += total_rnet;
    }
}
