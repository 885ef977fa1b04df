//! Leaf energy balance
//!
//! Partitions the isothermal net radiation absorbed by a leaf into latent and
//! sensible heat, and from that partition derives the leaf-surface CO2
//! concentration, the leaf-surface vapour pressure deficit and a new estimate
//! of leaf temperature. Called once per pass of the stability loop; there is
//! no iteration in here.
//!
//! # Scientific References
//! - Leuning, R. et al. (1995). Plant, Cell & Environment, 18, 1183-1200,
//!   Appendix (isothermal net radiation, eqn D4 apparent emissivity)
//! - Wang, Y.P. & Leuning, R. (1998). Agricultural and Forest Meteorology,
//!   91, 89-111
//! - Brutsaert, W. (1975). Water Resources Research, 11, 742-744

use crate::core_types::met::MeteorologicalSample;
use crate::core_types::units::{Celsius, CelsiusDelta, Pascals};
use crate::physics::conductance::LeafConductances;
use crate::physics::constants::{CP, KD, MASS_AIR, PAR_2_SW, SIGMA};
use crate::physics::psychrometrics::{penman_leaf, saturation_vapour_pressure};

/// Leaf properties the energy balance needs beyond the met forcing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafProperties {
    /// Characteristic leaf width (m)
    pub leaf_width: f64,
    /// Leaf absorptance of solar radiation (0-1)
    pub leaf_abs: f64,
    /// Total canopy LAI attenuating the longwave term
    pub lai: f64,
}

/// Result of one energy-balance pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafEnergyBalance {
    /// CO2 concentration at the leaf surface (µmol mol⁻¹)
    pub cs: f64,
    /// Vapour pressure deficit at the leaf surface
    pub dleaf: Pascals,
    /// Candidate leaf temperature for the next pass
    pub new_tleaf: Celsius,
    /// Transpiration (mol H2O m⁻² s⁻¹)
    pub transpiration: f64,
    /// Isothermal net radiation (W m⁻²)
    pub rnet: f64,
    /// Latent heat flux (W m⁻²)
    pub latent_heat: f64,
    /// Sensible heat exchanged between leaf and surroundings (W m⁻²)
    pub sensible_heat: f64,
    pub conductances: LeafConductances,
}

/// Apparent emissivity of a hemisphere radiating at air temperature
///
/// Leuning et al. (1995) eqn D4: `ε_a = 0.642·(e_a/T_k)^(1/7)`, `e_a` in Pa.
pub fn apparent_atmospheric_emissivity(ea: Pascals, tk: f64) -> f64 {
    0.642 * (ea.value() / tk).powf(1.0 / 7.0)
}

/// Isothermal net radiation of a leaf (W m⁻²)
///
/// Absorbed shortwave less the isothermal net longwave loss at the top of the
/// canopy (canopy emissivity of 1), attenuated through the canopy with the
/// diffuse extinction coefficient for black leaves.
///
/// A deficit larger than the saturation vapour pressure leaves no vapour in
/// the air, so `e_a` is floored at zero.
pub fn isothermal_net_radiation(
    met: &MeteorologicalSample,
    apar: f64,
    leaf: &LeafProperties,
) -> f64 {
    let tk = *met.tair.to_kelvin();
    let ea = Pascals::new(
        (saturation_vapour_pressure(met.tair) - met.vpd.to_pascals())
            .value()
            .max(0.0),
    );
    let emissivity_atm = apparent_atmospheric_emissivity(ea, tk);

    let sw_rad = apar * PAR_2_SW;
    let net_lw_rad = (1.0 - emissivity_atm) * SIGMA * tk.powi(4);

    leaf.leaf_abs * sw_rad - net_lw_rad * KD * (-KD * leaf.lai).exp()
}

/// Solve the coupled leaf energy balance for one pass
///
/// # Arguments
/// * `met` - Meteorology of the current half-hour
/// * `leaf` - Leaf geometry/optics and canopy LAI
/// * `tleaf` - Current leaf temperature estimate
/// * `gsc` - Stomatal conductance to CO2 (mol m⁻² s⁻¹)
/// * `anleaf` - Net assimilation (µmol m⁻² s⁻¹)
/// * `apar` - Absorbed PAR (µmol m⁻² s⁻¹)
pub fn solve_leaf_energy_balance(
    met: &MeteorologicalSample,
    leaf: &LeafProperties,
    tleaf: Celsius,
    gsc: f64,
    anleaf: f64,
    apar: f64,
) -> LeafEnergyBalance {
    let press = met.press.to_pascals();
    let vpd = met.vpd.to_pascals();
    let tair = met.tair;

    let g = LeafConductances::new(tair, tleaf, press, met.wind, leaf.leaf_width, gsc);

    let rnet = isothermal_net_radiation(met, apar, leaf);
    let evap = penman_leaf(press, rnet, vpd, tair, g.gh, g.gv);

    let sensible_heat = if g.gbh > 0.0 {
        (1.0 / (1.0 + g.gradn / g.gbh)) * (rnet - evap.latent_heat)
    } else {
        0.0
    };

    // Leaf-air temperature difference; only a quarter of it is taken per pass
    let tdiff = (rnet - evap.latent_heat) / (CP * MASS_AIR * g.gh);
    let new_tleaf = tair + CelsiusDelta::new(tdiff / 4.0);

    let cs = if g.gbc > 0.0 { met.co2 - anleaf / g.gbc } else { met.co2 };
    let dleaf = if g.gv > 0.0 {
        Pascals::new(evap.transpiration * press.value() / g.gv)
    } else {
        vpd
    };

    LeafEnergyBalance {
        cs,
        dleaf,
        new_tleaf,
        transpiration: evap.transpiration,
        rnet,
        latent_heat: evap.latent_heat,
        sensible_heat,
        conductances: g,
    }
}
