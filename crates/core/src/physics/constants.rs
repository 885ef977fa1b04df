//! Physical constants shared by the leaf physics
//!
//! # References
//! - Leuning, R. et al. (1995) PC&E 18:1183-1200, Appendix
//! - Jones, H.G. (1992) Plants and Microclimate, 2nd ed.
//! - Wang, Y.P. & Leuning, R. (1998) Agric. For. Meteorol. 91:89-111, Table 1

/// Stefan-Boltzmann constant (W m⁻² K⁻⁴)
pub const SIGMA: f64 = 5.6703e-8;

/// Thermal emissivity of leaves (dimensionless)
pub const LEAF_EMISSIVITY: f64 = 0.95;

/// Specific heat of dry air at constant pressure (J kg⁻¹ K⁻¹)
pub const CP: f64 = 1010.0;

/// Molecular mass of air (kg mol⁻¹)
pub const MASS_AIR: f64 = 29.0e-3;

/// Universal gas constant (J mol⁻¹ K⁻¹)
pub const RGAS: f64 = 8.314;

/// Molecular diffusivity of heat in air (m² s⁻¹)
pub const DHEAT: f64 = 21.5e-6;

/// Ratio of boundary-layer conductances for heat and CO2
pub const GBHGBC: f64 = 1.32;

/// Ratio of boundary-layer conductances for water vapour and heat
pub const GBVGBH: f64 = 1.075;

/// Ratio of stomatal conductances for water vapour and CO2
pub const GSVGSC: f64 = 1.57;

/// Latent heat of vaporisation of water at 0°C (J kg⁻¹)
pub const H2OLV0: f64 = 2.501e6;

/// Molecular mass of water (kg mol⁻¹)
pub const H2OMW: f64 = 18.0e-3;

/// PAR (µmol m⁻² s⁻¹) to shortwave (W m⁻²)
pub const PAR_2_SW: f64 = 1.0 / 2.3;

/// Extinction coefficient for diffuse radiation and black leaves
/// (m² ground m⁻² leaf)
pub const KD: f64 = 0.8;

// ----------------------------------------------------------------------------
// Unit conversions
// ----------------------------------------------------------------------------

/// µmol to mol
pub const UMOL_TO_MOL: f64 = 1e-6;

/// mol C to g C
pub const MOL_C_TO_GRAMS_C: f64 = 12.0;

/// Seconds per half-hour timestep
pub const SEC_2_HLFHR: f64 = 1800.0;

/// g C m⁻² to t C ha⁻¹
pub const GRAM_C_2_TONNES_HA: f64 = 0.01;

/// mol H2O to g H2O
pub const MOLE_WATER_2_G_WATER: f64 = 18.02;

/// g to kg; one kg of water over one m² is one mm
pub const G_TO_KG: f64 = 0.001;

/// kg to g
pub const KG_AS_G: f64 = 1000.0;
