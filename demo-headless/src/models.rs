//! Reference collaborators for the canopy loop
//!
//! Compact textbook versions of the submodels the canopy core expects to be
//! supplied with: solar geometry, diffuse fraction, two-leaf radiation
//! partitioning, C3 photosynthesis with optimal stomatal control and a soil
//! water bucket.

use canopy_core::physics::constants::{G_TO_KG, MOLE_WATER_2_G_WATER, PAR_2_SW, RGAS, SEC_2_HLFHR};
use canopy_core::physics::top_of_canopy_nitrogen;
use canopy_core::{
    AbsorbedRadiation, CanopyParams, CanopyState, Celsius, GasExchange, LeafEnvironment,
    LeafPair, PhotosynthesisModel, RadiationModel, SunPosition, WaterBalance,
};
use serde::Serialize;
use std::f64::consts::PI;

/// Solar constant (W m⁻²)
const SOLAR_CONSTANT: f64 = 1361.0;

/// Leaf scattering coefficient for PAR
const PAR_SCATTERING: f64 = 0.15;

/// Canopy reflection coefficient for diffuse PAR
const DIFFUSE_REFLECTION: f64 = 0.036;

/// Diffuse extinction coefficient for black leaves
const KD_BLACK: f64 = 0.78;

// ============================================================================
// RADIATION
// ============================================================================

/// Sun position from latitude, with De Pury & Farquhar (1997) sunlit/shaded
/// partitioning and the Spitters et al. (1986) diffuse fraction
#[derive(Debug, Clone, Copy)]
pub struct SolarCanopy {
    /// Site latitude (degrees, negative south)
    pub latitude: f64,
}

impl SolarCanopy {
    pub fn new(latitude: f64) -> Self {
        Self { latitude }
    }

    /// Solar declination (radians)
    fn declination(doy: u16) -> f64 {
        -(23.44_f64.to_radians()) * (2.0 * PI * (f64::from(doy) + 10.0) / 365.0).cos()
    }
}

impl RadiationModel for SolarCanopy {
    fn zenith_angle(&self, doy: u16, half_hour: usize) -> SunPosition {
        // Slot midpoint in local solar time
        let hour = (half_hour as f64 + 0.5) * 0.5;
        let hour_angle = (15.0 * (hour - 12.0)).to_radians();
        let lat = self.latitude.to_radians();
        let dec = Self::declination(doy);

        let cos_zenith = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos())
            .clamp(-1.0, 1.0);

        SunPosition {
            cos_zenith,
            elevation: cos_zenith.asin(),
        }
    }

    fn diffuse_fraction(&self, doy: u16, cos_zenith: f64, par: f64) -> f64 {
        if cos_zenith <= 0.0 {
            return 1.0;
        }

        let extraterrestrial =
            SOLAR_CONSTANT * (1.0 + 0.033 * (2.0 * PI * f64::from(doy) / 365.0).cos()) * cos_zenith;
        let tau = par * PAR_2_SW / extraterrestrial;

        // Spitters hourly relationship; cos_zenith is sin(elevation)
        let r = 0.847 - 1.61 * cos_zenith + 1.04 * cos_zenith * cos_zenith;
        let k = (1.47 - r) / 1.66;
        let frac = if tau <= 0.22 {
            1.0
        } else if tau <= 0.35 {
            1.0 - 6.4 * (tau - 0.22).powi(2)
        } else if tau <= k {
            1.47 - 1.66 * tau
        } else {
            r
        };

        frac.clamp(0.0, 1.0)
    }

    fn absorbed_radiation(
        &self,
        par: f64,
        diffuse_frac: f64,
        _elevation: f64,
        cos_zenith: f64,
        total_lai: f64,
    ) -> AbsorbedRadiation {
        if cos_zenith <= 0.0 || total_lai <= 0.0 {
            return AbsorbedRadiation::default();
        }

        // Beam extinction for a spherical leaf angle distribution
        let kb = 0.5 / cos_zenith;
        let scatter = (1.0 - PAR_SCATTERING).sqrt();
        let kb_scat = kb * scatter;
        let kd_scat = KD_BLACK * scatter;
        let rho_h = (1.0 - scatter) / (1.0 + scatter);
        let rho_cb = 1.0 - (-2.0 * rho_h * kb / (1.0 + kb)).exp();

        let beam = par * (1.0 - diffuse_frac);
        let diffuse = par * diffuse_frac;

        let canopy = (1.0 - rho_cb) * beam * (1.0 - (-kb_scat * total_lai).exp())
            + (1.0 - DIFFUSE_REFLECTION) * diffuse * (1.0 - (-kd_scat * total_lai).exp());

        let direct_sun = beam * (1.0 - PAR_SCATTERING) * (1.0 - (-kb * total_lai).exp());
        let diffuse_sun = diffuse
            * (1.0 - DIFFUSE_REFLECTION)
            * (1.0 - (-(kd_scat + kb) * total_lai).exp())
            * kd_scat
            / (kd_scat + kb);
        let scattered_sun = beam
            * ((1.0 - rho_cb) * kb_scat / (kb_scat + kb)
                * (1.0 - (-(kb_scat + kb) * total_lai).exp())
                - (1.0 - PAR_SCATTERING) * (1.0 - (-2.0 * kb * total_lai).exp()) / 2.0);
        let sunlit = (direct_sun + diffuse_sun + scattered_sun).max(0.0);
        let shaded = (canopy - sunlit).max(0.0);

        let lai_sun = ((1.0 - (-kb * total_lai).exp()) / kb).min(total_lai);
        let lai = LeafPair::new(lai_sun, total_lai - lai_sun);

        // Canopy totals per unit ground become per unit leaf area
        let per_leaf = |absorbed: f64, area: f64| if area > 0.0 { absorbed / area } else { 0.0 };
        AbsorbedRadiation {
            apar: LeafPair::new(per_leaf(sunlit, lai.sunlit), per_leaf(shaded, lai.shaded)),
            lai,
        }
    }
}

// ============================================================================
// PHOTOSYNTHESIS
// ============================================================================

/// Farquhar C3 biochemistry with Medlyn et al. (2011) optimal stomatal control
///
/// Uses the closed-form optimal `ci/cs = g1 / (g1 + √D)` so no inner iteration is
/// needed; the canopy stability loop handles the coupling to leaf temperature.
/// Vcmax and Jmax follow the nitrogen of the top leaf layer, N0, recovered from
/// the class nitrogen through the exponential canopy profile.
#[derive(Debug, Clone, Copy)]
pub struct MedlynFarquhar {
    /// Vcmax at 25°C per unit top-of-canopy nitrogen (µmol gN⁻¹ s⁻¹)
    pub vcmax_per_n: f64,
    /// Ratio of Jmax to Vcmax
    pub jv_ratio: f64,
    /// Stomatal slope (kPa^0.5)
    pub g1: f64,
    /// Residual conductance to CO2 (mol m⁻² s⁻¹)
    pub g0: f64,
    /// Extinction coefficient of the nitrogen profile
    pub kext: f64,
    /// Canopy LAI the nitrogen is spread over
    pub lai: f64,
}

impl Default for MedlynFarquhar {
    fn default() -> Self {
        Self {
            vcmax_per_n: 15.0,
            jv_ratio: 1.67,
            g1: 3.0,
            g0: 0.001,
            kext: 0.5,
            lai: 1.0,
        }
    }
}

impl MedlynFarquhar {
    /// Model for a canopy with the nitrogen profile of `params` and the LAI of
    /// `state`
    pub fn for_canopy(params: &CanopyParams, state: &CanopyState) -> Self {
        Self {
            kext: params.kext,
            lai: state.lai,
            ..Self::default()
        }
    }

    /// Arrhenius temperature response normalised to 25°C
    fn arrhenius(k25: f64, ea: f64, tleaf: Celsius) -> f64 {
        let tk = *tleaf.to_kelvin();
        k25 * (ea * (tk - 298.15) / (298.15 * RGAS * tk)).exp()
    }
}

impl PhotosynthesisModel for MedlynFarquhar {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange {
        let n0 = top_of_canopy_nitrogen(leaf.ncontent, self.kext, self.lai);
        let vcmax25 = self.vcmax_per_n * n0;
        let vcmax = Self::arrhenius(vcmax25, 58_520.0, leaf.tleaf);
        let jmax = Self::arrhenius(self.jv_ratio * vcmax25, 37_400.0, leaf.tleaf);
        let gamma_star = Self::arrhenius(42.75, 37_830.0, leaf.tleaf);
        let kc = Self::arrhenius(404.9, 79_430.0, leaf.tleaf);
        let ko = Self::arrhenius(278.4, 36_380.0, leaf.tleaf);
        let km = kc * (1.0 + 210.0 / ko);
        let rd = 0.015 * vcmax;

        // Electron transport, non-rectangular hyperbola
        let alpha_i = 0.3 * leaf.apar;
        let theta = 0.7;
        let sum = alpha_i + jmax;
        let j = (sum - (sum * sum - 4.0 * theta * alpha_i * jmax).max(0.0).sqrt()) / (2.0 * theta);

        let dleaf_kpa = (leaf.dleaf.value() / 1000.0).max(0.05);
        let ci = leaf.cs * self.g1 / (self.g1 + dleaf_kpa.sqrt());

        let ac = vcmax * (ci - gamma_star) / (ci + km);
        let aj = j / 4.0 * (ci - gamma_star) / (ci + 2.0 * gamma_star);
        let assimilation = ac.min(aj) - rd;

        let gsc = if assimilation > 0.0 && leaf.cs > ci {
            self.g0 + assimilation / (leaf.cs - ci)
        } else {
            self.g0
        };

        GasExchange { gsc, assimilation }
    }
}

// ============================================================================
// WATER BALANCE
// ============================================================================

/// Single-layer soil water bucket
///
/// Transpiration is drawn from the bucket; a fixed share of positive net
/// radiation evaporates from the soil surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SoilBucket {
    /// Plant-available capacity (mm)
    pub capacity: f64,
    /// Current plant-available water (mm)
    pub water: f64,
    /// Running transpiration total (mm)
    pub transpired: f64,
    /// Running soil evaporation total (mm)
    pub evaporated: f64,
    /// Half-hours advanced
    pub steps: usize,
}

/// Share of net radiation reaching and evaporating from the soil
const SOIL_EVAPORATION_SHARE: f64 = 0.1;

/// Latent heat of vaporisation for soil evaporation (J kg⁻¹)
const SOIL_LAMBDA: f64 = 2.45e6;

impl SoilBucket {
    pub fn full(capacity: f64) -> Self {
        Self {
            capacity,
            water: capacity,
            transpired: 0.0,
            evaporated: 0.0,
            steps: 0,
        }
    }

    /// Relative plant-available water in [0, 1]
    pub fn wetness(&self) -> f64 {
        if self.capacity > 0.0 {
            self.water / self.capacity
        } else {
            0.0
        }
    }
}

impl WaterBalance for SoilBucket {
    fn sub_daily_water_balance(&mut self, total_rnet: f64, canopy_transpiration: f64) {
        // mol m-2 s-1 -> mm per half-hour
        let transpiration = canopy_transpiration * MOLE_WATER_2_G_WATER * G_TO_KG * SEC_2_HLFHR;
        // W m-2 -> kg m-2 (= mm) per half-hour
        let evaporation =
            SOIL_EVAPORATION_SHARE * total_rnet.max(0.0) * SEC_2_HLFHR / SOIL_LAMBDA;

        let demand = transpiration + evaporation;
        let supplied = demand.min(self.water);
        let scale = if demand > 0.0 { supplied / demand } else { 0.0 };

        self.water -= supplied;
        self.transpired += transpiration * scale;
        self.evaporated += evaporation * scale;
        self.steps += 1;
    }
}
