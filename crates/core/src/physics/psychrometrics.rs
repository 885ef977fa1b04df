//! Psychrometrics and the Penman-Monteith leaf equation
//!
//! # Scientific References
//! - Jones, H.G. (1992). Plants and Microclimate, 2nd ed., Cambridge UP
//! - Leuning, R. et al. (1995). Plant, Cell & Environment, 18, 1183-1200
//! - Monteith, J.L. & Unsworth, M.H. (1990). Principles of Environmental Physics

use crate::core_types::units::{Celsius, Pascals};
use crate::physics::constants::{CP, H2OLV0, H2OMW, MASS_AIR};

/// Saturation vapour pressure of water over a flat surface
///
/// Jones (1992) p. 110: `e_s = 613.75·exp(17.502·T/(240.97 + T))` (Pa).
pub fn saturation_vapour_pressure(tair: Celsius) -> Pascals {
    let t = tair.value();
    Pascals::new(613.75 * (17.502 * t / (240.97 + t)).exp())
}

/// Slope of the saturation vapour pressure curve (Pa K⁻¹)
///
/// Forward difference over 0.1 K.
pub fn slope_of_saturation_curve(tair: Celsius) -> f64 {
    const STEP: f64 = 0.1;
    let upper = saturation_vapour_pressure(Celsius::new(tair.value() + STEP));
    let lower = saturation_vapour_pressure(tair);
    (upper - lower).value() / STEP
}

/// Latent heat of vaporisation of water (J mol⁻¹)
pub fn latent_heat_of_vapourisation(tair: Celsius) -> f64 {
    (H2OLV0 - 2.365e3 * tair.value()) * H2OMW
}

/// Psychrometric constant (Pa K⁻¹)
///
/// `γ = Cp·M_air·P/λ`, with λ in J mol⁻¹.
pub fn psychrometric_constant(press: Pascals, lambda: f64) -> f64 {
    CP * MASS_AIR * press.value() / lambda
}

/// Latent heat flux and transpiration from a leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafEvaporation {
    /// Latent heat flux (W m⁻²)
    pub latent_heat: f64,
    /// Transpiration (mol H2O m⁻² s⁻¹)
    pub transpiration: f64,
}

/// Penman-Monteith equation for a leaf
///
/// `LE = (s·Rn + D·g_h·Cp·M_air) / (s + γ·g_h/g_v)`, `E = LE/λ`
///
/// With closed stomata (`g_v ≤ 0`) there is no latent heat exchange.
///
/// # Arguments
/// * `press` - Atmospheric pressure
/// * `rnet` - Isothermal net radiation (W m⁻²)
/// * `vpd` - Vapour pressure deficit of the air
/// * `tair` - Air temperature
/// * `gh` - Total two-sided conductance for heat (mol m⁻² s⁻¹)
/// * `gv` - Total conductance for water vapour (mol m⁻² s⁻¹)
pub fn penman_leaf(
    press: Pascals,
    rnet: f64,
    vpd: Pascals,
    tair: Celsius,
    gh: f64,
    gv: f64,
) -> LeafEvaporation {
    if gv <= 0.0 {
        return LeafEvaporation {
            latent_heat: 0.0,
            transpiration: 0.0,
        };
    }

    let lambda = latent_heat_of_vapourisation(tair);
    let gamma = psychrometric_constant(press, lambda);
    let slope = slope_of_saturation_curve(tair);

    let arg1 = slope * rnet + vpd.value() * gh * CP * MASS_AIR;
    let arg2 = slope + gamma * gh / gv;
    let latent_heat = arg1 / arg2;

    LeafEvaporation {
        latent_heat,
        transpiration: latent_heat / lambda,
    }
}
