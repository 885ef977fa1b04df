//! Half-hourly two-leaf canopy loop
//!
//! Two-leaf canopy model:
//! 1. a radiation submodel partitions incident PAR between sunlit and shaded
//!    leaves (supplied through [`RadiationModel`])
//! 2. a coupled model of stomatal conductance, photosynthesis and the
//!    partitioning of absorbed net radiation into sensible and latent heat
//!    (the stability loop)
//!
//! The sunlit and shaded big leaves stand for all respective leaves of the
//! canopy. For dense canopies that does not strictly hold, but fluxes from
//! canopy elements near the base are small so the error is acceptable.
//!
//! # Scientific References
//! - Wang, Y.P. & Leuning, R. (1998). Agricultural and Forest Meteorology,
//!   91, 89-111
//! - Dai, Y. et al. (2004). Journal of Climate, 17, 2281-2299
//! - De Pury, D.G.G. & Farquhar, G.D. (1997). Plant, Cell & Environment, 20,
//!   537-557

use crate::collaborators::{
    AbsorbedRadiation, PhotosynthesisModel, RadiationModel, SunPosition, WaterBalance,
};
use crate::core_types::leaf::{LeafClass, LeafPair};
use crate::core_types::met::{MetForcing, MeteorologicalSample};
use crate::core_types::params::{CanopyParams, CanopyState, Control, NetRadiationCoupling};
use crate::error::CanopyResult;
use crate::fluxes::DailyFluxes;
use crate::physics::nitrogen::canopy_nitrogen_content;
use crate::solver::stability::{check_pathway, solve_leaf, LeafSolution};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Incident PAR below which the canopy is treated as dark (µmol m⁻² s⁻¹)
pub const PAR_DARK_THRESHOLD: f64 = 50.0;

/// Which branch of the canopy loop a half-hour took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotBranch {
    /// Sun above the horizon and PAR above the dark threshold
    Sunlit,
    Dark,
}

/// Canopy-scale fluxes of one half-hour
///
/// Leaf-level values scaled by LAI weighting:
/// `canopy = sunlit_LAI × sunlit + shaded_LAI × shaded`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanopyAggregate {
    /// Canopy net assimilation (µmol m⁻² s⁻¹)
    pub acanopy: f64,
    /// Canopy stomatal conductance to CO2 (mol m⁻² s⁻¹)
    pub gsc_canopy: f64,
    /// Canopy transpiration (mol H2O m⁻² s⁻¹)
    pub trans_canopy: f64,
    /// APAR of both leaf classes
    pub total_apar: f64,
    /// Net radiation handed to the water balance (W m⁻²)
    pub total_rnet: f64,
}

impl CanopyAggregate {
    /// Scale the two leaf solutions to the canopy
    pub fn from_leaves(leaves: &LeafPair<LeafSolution>, lai: &LeafPair<f64>) -> Self {
        let an = leaves.map(|l| l.state.anleaf);
        let gsc = leaves.map(|l| l.state.gsc);
        let trans = leaves.map(|l| l.state.transpiration);
        let apar = leaves.map(|l| l.state.apar);

        Self {
            acanopy: an.weighted_sum(lai),
            gsc_canopy: gsc.weighted_sum(lai),
            trans_canopy: trans.weighted_sum(lai),
            total_apar: apar.total(),
            total_rnet: 0.0,
        }
    }
}

/// Record of one half-hour slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfHourRecord {
    /// Slot within the day (0-based)
    pub slot: usize,
    /// Forcing index the slot consumed
    pub cursor: usize,
    pub cos_zenith: f64,
    pub elevation: f64,
    pub diffuse_frac: f64,
    pub branch: SlotBranch,
    pub aggregate: CanopyAggregate,
    /// Sunlit/shaded LAI used for scaling (zero in the dark)
    pub lai: LeafPair<f64>,
    /// Leaf solutions on the sunlit branch
    pub leaves: Option<LeafPair<LeafSolution>>,
}

/// Result of one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub records: Vec<HalfHourRecord>,
    /// Daily totals at the end of the day
    pub fluxes: DailyFluxes,
}

impl DaySummary {
    /// Number of half-hours that ran the sunlit branch
    pub fn sunlit_slots(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.branch == SlotBranch::Sunlit)
            .count()
    }
}

/// Canopy model for one site: parameters plus its collaborators
pub struct CanopyModel<R, P, W> {
    pub params: CanopyParams,
    pub radiation: R,
    pub photosynthesis: P,
    pub water: W,
}

impl<R, P, W> CanopyModel<R, P, W>
where
    R: RadiationModel,
    P: PhotosynthesisModel,
    W: WaterBalance,
{
    pub fn new(params: CanopyParams, radiation: R, photosynthesis: P, water: W) -> Self {
        Self {
            params,
            radiation,
            photosynthesis,
            water,
        }
    }

    /// Run the canopy loop over one simulated day
    ///
    /// Zeroes the daily accumulators, then runs `control.num_half_hours` slots,
    /// each consuming the meteorological sample under the cursor and advancing
    /// the cursor exactly once.
    ///
    /// # Errors
    /// - [`CanopyError::InvalidParameter`](crate::CanopyError::InvalidParameter)
    ///   or [`CanopyError::C4NotImplemented`](crate::CanopyError::C4NotImplemented)
    ///   before anything is touched
    /// - [`CanopyError::NonConvergence`](crate::CanopyError::NonConvergence)
    ///   when a leaf class fails to converge
    /// - [`CanopyError::ForcingExhausted`](crate::CanopyError::ForcingExhausted)
    ///   when the forcing runs out mid-day
    pub fn run_day(
        &mut self,
        control: &mut Control,
        met: &MetForcing,
        state: &CanopyState,
        fluxes: &mut DailyFluxes,
    ) -> CanopyResult<DaySummary> {
        self.params.validate()?;
        check_pathway(self.params.ps_pathway)?;

        info!(
            canopy = %self.params.name,
            start = control.hrly_idx,
            lai = state.lai,
            "Starting canopy day"
        );

        fluxes.zero_carbon_fluxes();
        fluxes.zero_water_fluxes();

        // APAR of the last sunlit slot; dark slots report it again
        let mut last_apar = LeafPair::new(0.0, 0.0);
        let mut records = Vec::with_capacity(control.num_half_hours);

        for hod in 0..control.num_half_hours {
            let cursor = control.hrly_idx;
            let sample = met.sample(cursor)?;
            let sun = self.radiation.zenith_angle(sample.doy, hod);

            // diffuse fraction from half-hourly incident radiation
            let diffuse_frac = self
                .radiation
                .diffuse_fraction(sample.doy, sun.cos_zenith, sample.par);

            let record = if sun.elevation > 0.0 && sample.par > PAR_DARK_THRESHOLD {
                let absorbed = self.radiation.absorbed_radiation(
                    sample.par,
                    diffuse_frac,
                    sun.elevation,
                    sun.cos_zenith,
                    state.lai,
                );
                last_apar = absorbed.apar;
                self.sunlit_slot(hod, cursor, sample, state, sun, diffuse_frac, &absorbed, fluxes)?
            } else {
                self.dark_slot(hod, cursor, sun, diffuse_frac, last_apar, fluxes)
            };

            debug!(
                slot = hod,
                cursor,
                branch = ?record.branch,
                par = sample.par,
                acanopy = record.aggregate.acanopy,
                trans_canopy = record.aggregate.trans_canopy,
                "half-hour complete"
            );
            records.push(record);
            control.hrly_idx += 1;
        }

        info!(
            canopy = %self.params.name,
            gpp_gcm2 = fluxes.gpp_gcm2,
            npp_gcm2 = fluxes.npp_gcm2,
            transpiration_mm = fluxes.transpiration,
            "Canopy day complete"
        );

        Ok(DaySummary {
            records,
            fluxes: *fluxes,
        })
    }

    /// Run consecutive days until `days` have been simulated
    ///
    /// # Errors
    /// The first error any day returns; the cursor stays where that day stopped.
    pub fn run_days(
        &mut self,
        control: &mut Control,
        met: &MetForcing,
        state: &CanopyState,
        days: usize,
    ) -> CanopyResult<Vec<DaySummary>> {
        let mut fluxes = DailyFluxes::new();
        (0..days)
            .map(|_| self.run_day(control, met, state, &mut fluxes))
            .collect()
    }

    fn sunlit_slot(
        &mut self,
        hod: usize,
        cursor: usize,
        sample: &MeteorologicalSample,
        state: &CanopyState,
        sun: SunPosition,
        diffuse_frac: f64,
        absorbed: &AbsorbedRadiation,
        fluxes: &mut DailyFluxes,
    ) -> CanopyResult<HalfHourRecord> {
        let ncontent = canopy_nitrogen_content(&self.params, state, &absorbed.lai);

        let solve = |class: LeafClass| {
            solve_leaf(
                &self.photosynthesis,
                &self.params,
                sample,
                state.lai,
                class,
                *ncontent.get(class),
                *absorbed.apar.get(class),
            )
            .and_then(LeafSolution::ensure_converged)
        };
        let leaves = LeafPair::new(solve(LeafClass::Sunlit)?, solve(LeafClass::Shaded)?);

        let mut aggregate = CanopyAggregate::from_leaves(&leaves, &absorbed.lai);
        aggregate.total_rnet = match self.params.rnet_coupling {
            // The per-leaf net radiation never reaches this total
            NetRadiationCoupling::Legacy => 0.0,
            NetRadiationCoupling::LeafEnergyBalance => {
                leaves.map(|l| l.state.rnet).weighted_sum(&absorbed.lai)
            }
        };

        fluxes.update_daily_carbon_fluxes(aggregate.acanopy, aggregate.total_apar, self.params.cue);
        fluxes.update_daily_water_fluxes(aggregate.trans_canopy, aggregate.total_rnet);
        self.water
            .sub_daily_water_balance(aggregate.total_rnet, aggregate.trans_canopy);

        Ok(HalfHourRecord {
            slot: hod,
            cursor,
            cos_zenith: sun.cos_zenith,
            elevation: sun.elevation,
            diffuse_frac,
            branch: SlotBranch::Sunlit,
            aggregate,
            lai: absorbed.lai,
            leaves: Some(leaves),
        })
    }

    /// No photosynthesis in the dark, but the water balance still runs (soil
    /// evaporation continues)
    fn dark_slot(
        &mut self,
        hod: usize,
        cursor: usize,
        sun: SunPosition,
        diffuse_frac: f64,
        last_apar: LeafPair<f64>,
        fluxes: &mut DailyFluxes,
    ) -> HalfHourRecord {
        let aggregate = CanopyAggregate {
            total_apar: last_apar.total(),
            ..CanopyAggregate::default()
        };

        fluxes.update_daily_carbon_fluxes(aggregate.acanopy, aggregate.total_apar, self.params.cue);
        fluxes.update_daily_water_fluxes(aggregate.trans_canopy, aggregate.total_rnet);
        self.water
            .sub_daily_water_balance(aggregate.total_rnet, aggregate.trans_canopy);

        HalfHourRecord {
            slot: hod,
            cursor,
            cos_zenith: sun.cos_zenith,
            elevation: sun.elevation,
            diffuse_frac,
            branch: SlotBranch::Dark,
            aggregate,
            lai: LeafPair::new(0.0, 0.0),
            leaves: None,
        }
    }
}
