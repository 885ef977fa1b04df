//! Canopy nitrogen
//!
//! # Scientific References
//! - Chen, J.L. et al. (1993). "Effects of canopy nitrogen distribution on
//!   canopy photosynthesis" Oecologia, 93, 63-69

use crate::core_types::leaf::LeafPair;
use crate::core_types::params::{CanopyParams, CanopyState};
use crate::physics::constants::KG_AS_G;

/// Average leaf nitrogen content (g N m⁻² leaf)
///
/// `N_leaf = shoot N:C × C fraction / SLA`, with SLA per kg converted to g.
pub fn leaf_nitrogen(params: &CanopyParams, state: &CanopyState) -> f64 {
    state.shootnc * params.cfracts / params.sla * KG_AS_G
}

/// Nitrogen content of the sunlit and shaded leaf classes (g N m⁻²)
///
/// The average leaf nitrogen is distributed in proportion to each class's LAI.
/// A canopy without leaves carries no nitrogen.
pub fn canopy_nitrogen_content(
    params: &CanopyParams,
    state: &CanopyState,
    lai: &LeafPair<f64>,
) -> LeafPair<f64> {
    if state.lai > 0.0 {
        let leafn = leaf_nitrogen(params, state);
        lai.map(|class_lai| leafn * class_lai)
    } else {
        LeafPair::new(0.0, 0.0)
    }
}

/// Nitrogen at the top of the canopy, N0 (g N m⁻²)
///
/// Inverts the exponential profile `N(L) = N0·exp(−k·L)` integrated over the
/// canopy: `N0 = N_total·k / (1 − exp(−k·LAI))`.
pub fn top_of_canopy_nitrogen(ncontent: f64, kext: f64, lai: f64) -> f64 {
    if lai > 0.0 {
        ncontent * kext / (1.0 - (-kext * lai).exp())
    } else {
        0.0
    }
}
