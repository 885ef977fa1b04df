//! Canopy parameters, canopy state and run control

use crate::error::{CanopyError, CanopyResult};
use serde::{Deserialize, Serialize};

/// Photosynthetic pathway of the vegetation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotosynthesisPathway {
    #[default]
    C3,
    /// Not implemented; selecting it aborts the run
    C4,
}

/// Which net radiation is handed to the sub-daily water balance
///
/// `Legacy` forwards the running total the canopy loop has always forwarded,
/// which is never fed from the leaf energy balance and therefore stays at
/// zero. `LeafEnergyBalance` forwards the LAI-weighted isothermal net
/// radiation of the two leaf classes for the current half-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRadiationCoupling {
    #[default]
    Legacy,
    LeafEnergyBalance,
}

/// Vegetation and solver parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyParams {
    /// Preset name for reporting
    pub name: String,
    /// Characteristic leaf width (m)
    pub leaf_width: f64,
    /// Leaf absorptance of solar radiation (0-1)
    pub leaf_abs: f64,
    /// Carbon use efficiency, NPP/GPP (0-1)
    pub cue: f64,
    /// Carbon fraction of dry matter
    pub cfracts: f64,
    /// Specific leaf area (m² leaf kg⁻¹ C)
    pub sla: f64,
    /// Extinction coefficient used for the vertical nitrogen profile
    pub kext: f64,
    pub ps_pathway: PhotosynthesisPathway,
    pub rnet_coupling: NetRadiationCoupling,
    /// Cap on stability-loop passes per leaf class
    pub max_iterations: usize,
    /// Leaf-temperature convergence tolerance (°C)
    pub tleaf_tolerance: f64,
}

impl Default for CanopyParams {
    fn default() -> Self {
        Self::evergreen_forest()
    }
}

impl CanopyParams {
    /// Stability loop pass limit
    pub const MAX_ITERATIONS: usize = 100;

    /// Leaf-temperature convergence tolerance (°C)
    pub const TLEAF_TOLERANCE: f64 = 0.02;

    /// Evergreen needleleaf/broadleaf forest
    pub fn evergreen_forest() -> Self {
        CanopyParams {
            name: "Evergreen Forest".to_string(),
            leaf_width: 0.02,
            leaf_abs: 0.5,
            cue: 0.5,
            cfracts: 0.5,
            sla: 4.4,
            kext: 0.5,
            ps_pathway: PhotosynthesisPathway::C3,
            rnet_coupling: NetRadiationCoupling::Legacy,
            max_iterations: Self::MAX_ITERATIONS,
            tleaf_tolerance: Self::TLEAF_TOLERANCE,
        }
    }

    /// Temperate deciduous forest (broader, thinner leaves)
    pub fn deciduous_forest() -> Self {
        CanopyParams {
            name: "Deciduous Forest".to_string(),
            leaf_width: 0.05,
            sla: 10.0,
            cue: 0.45,
            ..Self::evergreen_forest()
        }
    }

    /// C3 grassland (narrow leaves, high carbon-use efficiency)
    pub fn grassland() -> Self {
        CanopyParams {
            name: "C3 Grassland".to_string(),
            leaf_width: 0.01,
            sla: 20.0,
            cue: 0.55,
            kext: 0.6,
            ..Self::evergreen_forest()
        }
    }

    /// Look up a preset by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "evergreen" | "evergreen-forest" => Some(Self::evergreen_forest()),
            "deciduous" | "deciduous-forest" => Some(Self::deciduous_forest()),
            "grass" | "grassland" => Some(Self::grassland()),
            _ => None,
        }
    }

    /// Reject parameter sets the physics cannot use
    ///
    /// # Errors
    /// [`CanopyError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> CanopyResult<()> {
        let invalid =
            |name: &'static str, value: f64| CanopyError::InvalidParameter { name, value };

        if self.leaf_width.is_nan() || self.leaf_width <= 0.0 {
            return Err(invalid("leaf_width", self.leaf_width));
        }
        if !(0.0..=1.0).contains(&self.leaf_abs) {
            return Err(invalid("leaf_abs", self.leaf_abs));
        }
        if !(0.0..=1.0).contains(&self.cue) {
            return Err(invalid("cue", self.cue));
        }
        if self.sla.is_nan() || self.sla <= 0.0 {
            return Err(invalid("sla", self.sla));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", 0.0));
        }
        if self.tleaf_tolerance.is_nan() || self.tleaf_tolerance <= 0.0 {
            return Err(invalid("tleaf_tolerance", self.tleaf_tolerance));
        }
        Ok(())
    }
}

/// Vegetation state that is constant within a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanopyState {
    /// Total canopy leaf area index (m² m⁻²)
    pub lai: f64,
    /// Shoot nitrogen:carbon ratio
    pub shootnc: f64,
}

impl CanopyState {
    pub fn new(lai: f64, shootnc: f64) -> Self {
        Self {
            lai: lai.max(0.0),
            shootnc,
        }
    }
}

/// Run control: slot count and the half-hour cursor into the forcing
///
/// The cursor persists across days; each call to the canopy loop advances it
/// by exactly `num_half_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Number of half-hour slots per simulated day
    pub num_half_hours: usize,
    /// Index of the next meteorological sample
    pub hrly_idx: usize,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            num_half_hours: Self::HALF_HOURS_PER_DAY,
            hrly_idx: 0,
        }
    }
}

impl Control {
    pub const HALF_HOURS_PER_DAY: usize = 48;

    /// Control starting at an arbitrary cursor position
    pub fn starting_at(hrly_idx: usize) -> Self {
        Self {
            hrly_idx,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for params in [
            CanopyParams::evergreen_forest(),
            CanopyParams::deciduous_forest(),
            CanopyParams::grassland(),
        ] {
            assert!(params.validate().is_ok(), "{} should validate", params.name);
            assert_eq!(params.ps_pathway, PhotosynthesisPathway::C3);
            assert_eq!(params.max_iterations, 100);
        }
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(
            CanopyParams::from_name("Grassland").map(|p| p.leaf_width),
            Some(0.01)
        );
        assert!(CanopyParams::from_name("tundra").is_none());
    }

    #[test]
    fn test_zero_leaf_width_rejected() {
        let params = CanopyParams {
            leaf_width: 0.0,
            ..CanopyParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(CanopyError::InvalidParameter {
                name: "leaf_width",
                ..
            })
        ));
    }

    #[test]
    fn test_cue_out_of_range_rejected() {
        let params = CanopyParams {
            cue: 1.5,
            ..CanopyParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_lai_clamped() {
        assert_eq!(CanopyState::new(-1.0, 0.03).lai, 0.0);
    }

    #[test]
    fn test_control_defaults_to_full_day() {
        let control = Control::starting_at(96);
        assert_eq!(control.num_half_hours, 48);
        assert_eq!(control.hrly_idx, 96);
    }
}
