//! Leaf boundary-layer and radiative conductances
//!
//! Pure functions of the instantaneous meteorology and leaf geometry. All
//! conductances are molar (mol m⁻² s⁻¹) and single-sided unless noted.
//!
//! # Scientific References
//! - Leuning, R. et al. (1995). "Leaf nitrogen, photosynthesis, conductance
//!   and transpiration: scaling from leaves to canopies"
//!   Plant, Cell & Environment, 18, 1183-1200, Appendix E
//! - Wang, Y.P. & Leuning, R. (1998). Agricultural and Forest Meteorology,
//!   91, 89-111, Table 1
//! - Jones, H.G. (1992). Plants and Microclimate, p. 108

use crate::core_types::units::{Celsius, Pascals};
use crate::physics::constants::{
    CP, DHEAT, GBHGBC, GBVGBH, GSVGSC, LEAF_EMISSIVITY, MASS_AIR, RGAS, SIGMA,
};

/// Leaf/air temperature difference below which free convection is zero (°C)
const FREE_CONVECTION_TOLERANCE: f64 = 1e-8;

/// Molar concentration of air, P/(R·T) (mol m⁻³)
#[inline]
fn molar_concentration(tair: Celsius, press: Pascals) -> f64 {
    press.value() / (RGAS * *tair.to_kelvin())
}

/// Radiation conductance at the given air temperature (mol m⁻² s⁻¹)
///
/// `g_r = 4·σ·Tk³·ε_leaf / (Cp·M_air)`
///
/// Tk³ rather than the Tk⁴ sometimes quoted (Medlyn 2007, eqn A3); see Wang &
/// Leuning (1998), Table 1.
pub fn radiation_conductance(tair: Celsius) -> f64 {
    let tk = *tair.to_kelvin();
    4.0 * SIGMA * tk.powi(3) * LEAF_EMISSIVITY / (CP * MASS_AIR)
}

/// Boundary layer conductance for heat, single sided, forced convection
/// (mol m⁻² s⁻¹)
///
/// Leuning et al. (1995) eqn E1: `0.003·√(u/w)·P/(R·Tk)`.
/// Still air (or a nonsensical negative speed) gives zero.
///
/// # Arguments
/// * `wind` - Wind speed (m s⁻¹)
/// * `leaf_width` - Characteristic leaf width (m), must be > 0
pub fn forced_convection_conductance(
    tair: Celsius,
    press: Pascals,
    wind: f64,
    leaf_width: f64,
) -> f64 {
    let wind = wind.max(0.0);
    0.003 * (wind / leaf_width).sqrt() * molar_concentration(tair, press)
}

/// Boundary layer conductance for heat, single sided, free convection
/// (mol m⁻² s⁻¹)
///
/// Leuning et al. (1995) eqns E3 & E4:
/// `Gr = 1.6e8·|Tl − Ta|·w³`, `g = 0.5·D_H·Gr^¼ / w · P/(R·Tk)`.
///
/// Returns exactly zero when leaf and air temperature coincide.
pub fn free_convection_conductance(
    tair: Celsius,
    tleaf: Celsius,
    press: Pascals,
    leaf_width: f64,
) -> f64 {
    let dt = (tleaf - tair).abs().value();
    if dt < FREE_CONVECTION_TOLERANCE {
        return 0.0;
    }

    let grashof = 1.6e8 * dt * leaf_width.powi(3);
    0.5 * DHEAT * grashof.powf(0.25) / leaf_width * molar_concentration(tair, press)
}

/// Full set of leaf conductances for one energy-balance pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafConductances {
    /// Radiation conductance
    pub gradn: f64,
    /// Boundary layer, heat, forced convection
    pub gbhu: f64,
    /// Boundary layer, heat, free convection
    pub gbhf: f64,
    /// Total boundary layer conductance for heat (single sided)
    pub gbh: f64,
    /// Total conductance for heat, two sided
    pub gh: f64,
    /// Boundary layer conductance for water vapour
    pub gbv: f64,
    /// Stomatal conductance for water vapour
    pub gsv: f64,
    /// Total conductance for water vapour (boundary layer and stomata in series)
    pub gv: f64,
    /// Boundary layer conductance for CO2
    pub gbc: f64,
}

impl LeafConductances {
    /// Combine the estimators for a leaf with stomatal conductance to CO2 `gsc`
    pub fn new(
        tair: Celsius,
        tleaf: Celsius,
        press: Pascals,
        wind: f64,
        leaf_width: f64,
        gsc: f64,
    ) -> Self {
        let gradn = radiation_conductance(tair);
        let gbhu = forced_convection_conductance(tair, press, wind, leaf_width);
        let gbhf = free_convection_conductance(tair, tleaf, press, leaf_width);
        let gbh = gbhu + gbhf;
        let gh = 2.0 * (gbh + gradn);

        let gbv = GBVGBH * gbh;
        let gsv = GSVGSC * gsc;
        let gv = if gbv + gsv > 0.0 {
            (gbv * gsv) / (gbv + gsv)
        } else {
            0.0
        };

        Self {
            gradn,
            gbhu,
            gbhf,
            gbh,
            gh,
            gbv,
            gsv,
            gv,
            gbc: gbh / GBHGBC,
        }
    }
}
