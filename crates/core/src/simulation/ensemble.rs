//! Independent site-days run in parallel
//!
//! Each site owns its model, control cursor, forcing and accumulators, so the
//! days share nothing and can be spread across the rayon pool. Results come
//! back in input order.

use crate::collaborators::{PhotosynthesisModel, RadiationModel, WaterBalance};
use crate::core_types::met::MetForcing;
use crate::core_types::params::{CanopyState, Control};
use crate::error::CanopyResult;
use crate::fluxes::DailyFluxes;
use crate::simulation::canopy::{CanopyModel, DaySummary};
use rayon::prelude::*;
use tracing::info;

/// Everything one site needs to simulate a day
pub struct SiteDay<R, P, W> {
    pub model: CanopyModel<R, P, W>,
    pub control: Control,
    pub met: MetForcing,
    pub state: CanopyState,
    pub fluxes: DailyFluxes,
}

impl<R, P, W> SiteDay<R, P, W>
where
    R: RadiationModel,
    P: PhotosynthesisModel,
    W: WaterBalance,
{
    pub fn new(model: CanopyModel<R, P, W>, met: MetForcing, state: CanopyState) -> Self {
        Self {
            model,
            control: Control::default(),
            met,
            state,
            fluxes: DailyFluxes::new(),
        }
    }

    /// Run the next day of this site
    ///
    /// # Errors
    /// Whatever [`CanopyModel::run_day`] returns for the site.
    pub fn run(&mut self) -> CanopyResult<DaySummary> {
        self.model
            .run_day(&mut self.control, &self.met, &self.state, &mut self.fluxes)
    }
}

/// Run one day for every site in parallel
///
/// A failing site does not stop the others; its error is returned in its slot.
pub fn run_ensemble<R, P, W>(sites: &mut [SiteDay<R, P, W>]) -> Vec<CanopyResult<DaySummary>>
where
    R: RadiationModel + Send,
    P: PhotosynthesisModel + Send,
    W: WaterBalance + Send,
{
    info!(sites = sites.len(), "Running canopy ensemble");
    sites.par_iter_mut().map(SiteDay::run).collect()
}
