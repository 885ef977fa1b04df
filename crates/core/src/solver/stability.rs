//! Leaf stability loop
//!
//! Photosynthesis depends on the CO2 concentration and vapour pressure deficit
//! at the leaf surface; both depend on the assimilation and transpiration the
//! energy balance derives from photosynthesis. Leaf temperature couples the
//! two and changes slowly between passes, so the circular dependency is
//! resolved by fixed-point iteration on leaf temperature:
//!
//! 1. photosynthesis at the current leaf surface conditions
//! 2. stop if assimilation is not positive (nothing left to refine)
//! 3. energy balance → new Cs, Ds, transpiration and leaf temperature
//! 4. stop once leaf temperature moves by less than the tolerance
//!
//! The loop is bounded; running out of passes is reported as
//! [`LoopExit::MaxIterationsExceeded`] and is fatal to the run.

use crate::collaborators::{LeafEnvironment, PhotosynthesisModel};
use crate::core_types::leaf::{LeafClass, LeafState};
use crate::core_types::met::MeteorologicalSample;
use crate::core_types::params::{CanopyParams, PhotosynthesisPathway};
use crate::core_types::units::CelsiusDelta;
use crate::error::{CanopyError, CanopyResult};
use crate::physics::energy_balance::{solve_leaf_energy_balance, LeafProperties};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

/// Why the stability loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopExit {
    /// Leaf temperature moved by less than the tolerance
    Converged,
    /// Assimilation was zero or negative; transpiration set to zero
    NonPositiveAssimilation,
    /// Pass limit reached without convergence
    MaxIterationsExceeded,
}

/// Final state of one leaf class after the stability loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafSolution {
    pub class: LeafClass,
    pub state: LeafState,
    pub exit: LoopExit,
    /// Passes performed (photosynthesis calls)
    pub iterations: usize,
    /// Magnitude of the last leaf-temperature update
    pub last_step: CelsiusDelta,
}

impl LeafSolution {
    /// Turn a non-converged solution into the fatal error
    ///
    /// # Errors
    /// [`CanopyError::NonConvergence`] when the loop hit its pass limit.
    pub fn ensure_converged(self) -> CanopyResult<Self> {
        match self.exit {
            LoopExit::Converged | LoopExit::NonPositiveAssimilation => Ok(self),
            LoopExit::MaxIterationsExceeded => {
                error!(
                    leaf = %self.class,
                    iterations = self.iterations,
                    last_step = self.last_step.value(),
                    "No convergence in canopy loop"
                );
                Err(CanopyError::NonConvergence {
                    leaf: self.class,
                    iterations: self.iterations,
                    last_step: self.last_step.value(),
                })
            }
        }
    }
}

/// Refuse pathways without an implementation
///
/// # Errors
/// [`CanopyError::C4NotImplemented`] for the C4 pathway.
pub fn check_pathway(pathway: PhotosynthesisPathway) -> CanopyResult<()> {
    match pathway {
        PhotosynthesisPathway::C3 => Ok(()),
        PhotosynthesisPathway::C4 => {
            error!("C4 photosynthesis not implemented");
            Err(CanopyError::C4NotImplemented)
        }
    }
}

/// Coupled photosynthesis/energy-balance solve for one leaf class
///
/// Leaf temperature, leaf-surface VPD and leaf-surface CO2 start from the air
/// values of `met`.
///
/// # Arguments
/// * `photosynthesis` - C3 photosynthesis model
/// * `params` - Leaf geometry/optics, pathway and loop limits
/// * `met` - Meteorology of the current half-hour
/// * `lai` - Total canopy LAI
/// * `class` - Leaf class being solved (for diagnostics)
/// * `ncontent` - Nitrogen content of the leaf class (g N m⁻²)
/// * `apar` - Absorbed PAR of the leaf class (µmol m⁻² s⁻¹)
///
/// # Errors
/// [`CanopyError::C4NotImplemented`] before any leaf state is created when the
/// configured pathway is C4. Exhausting the pass limit is not an error here;
/// it is reported through [`LoopExit::MaxIterationsExceeded`] (see
/// [`LeafSolution::ensure_converged`]).
pub fn solve_leaf<P: PhotosynthesisModel + ?Sized>(
    photosynthesis: &P,
    params: &CanopyParams,
    met: &MeteorologicalSample,
    lai: f64,
    class: LeafClass,
    ncontent: f64,
    apar: f64,
) -> CanopyResult<LeafSolution> {
    check_pathway(params.ps_pathway)?;

    let props = LeafProperties {
        leaf_width: params.leaf_width,
        leaf_abs: params.leaf_abs,
        lai,
    };
    let mut leaf = LeafState::from_air(met.tair, met.vpd.to_pascals(), met.co2, apar);
    let mut last_step = CelsiusDelta::new(0.0);

    let finish = |leaf: LeafState, exit: LoopExit, iterations: usize, last_step: CelsiusDelta| {
        LeafSolution {
            class,
            state: leaf,
            exit,
            iterations,
            last_step,
        }
    };

    for iteration in 1..=params.max_iterations {
        let gas = photosynthesis.photosynthesis_c3(&LeafEnvironment {
            ncontent,
            tleaf: leaf.tleaf,
            apar,
            cs: leaf.cs,
            dleaf: leaf.dleaf,
        });
        leaf.gsc = gas.gsc;
        leaf.anleaf = gas.assimilation;

        if leaf.anleaf <= 0.0 {
            leaf.transpiration = 0.0;
            trace!(leaf = %class, iteration, an = leaf.anleaf, "non-positive assimilation");
            return Ok(finish(leaf, LoopExit::NonPositiveAssimilation, iteration, last_step));
        }

        let eb = solve_leaf_energy_balance(met, &props, leaf.tleaf, leaf.gsc, leaf.anleaf, apar);
        leaf.cs = eb.cs;
        leaf.dleaf = eb.dleaf;
        leaf.transpiration = eb.transpiration;
        leaf.rnet = eb.rnet;

        last_step = (leaf.tleaf - eb.new_tleaf).abs();
        trace!(
            leaf = %class,
            iteration,
            tleaf = leaf.tleaf.value(),
            new_tleaf = eb.new_tleaf.value(),
            an = leaf.anleaf,
            gsc = leaf.gsc,
            "stability pass"
        );

        if last_step.value() < params.tleaf_tolerance {
            return Ok(finish(leaf, LoopExit::Converged, iteration, last_step));
        }
        leaf.tleaf = eb.new_tleaf;
    }

    Ok(finish(
        leaf,
        LoopExit::MaxIterationsExceeded,
        params.max_iterations,
        last_step,
    ))
}
