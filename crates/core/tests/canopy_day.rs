//! End-to-end canopy day tests with stub collaborators
//!
//! Radiation, photosynthesis and the water balance are replaced by stubs so
//! the canopy loop itself (branching, scaling, accumulation, abort paths) can
//! be checked against hand-computed values.

use approx::assert_relative_eq;
use canopy_core::collaborators::{
    AbsorbedRadiation, GasExchange, LeafEnvironment, PhotosynthesisModel, RadiationModel,
    SunPosition, WaterBalance,
};
use canopy_core::core_types::units::{Celsius, Kilopascals};
use canopy_core::{
    run_ensemble, CanopyError, CanopyModel, CanopyParams, CanopyState, Control, DailyFluxes,
    LeafClass, LeafPair, MetForcing, MeteorologicalSample, NetRadiationCoupling,
    PhotosynthesisPathway, SiteDay, SlotBranch,
};
use std::cell::{Cell, RefCell};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sun up between `sunrise` and `sunset` (half-hour slots), fixed partitioning
struct StubRadiation {
    sunrise: usize,
    sunset: usize,
    apar_share: LeafPair<f64>,
    lai_share: LeafPair<f64>,
}

impl StubRadiation {
    fn all_day() -> Self {
        Self {
            sunrise: 0,
            sunset: 48,
            apar_share: LeafPair::new(1.0, 0.4),
            lai_share: LeafPair::new(0.6, 0.4),
        }
    }
}

impl RadiationModel for StubRadiation {
    fn zenith_angle(&self, _doy: u16, half_hour: usize) -> SunPosition {
        if (self.sunrise..self.sunset).contains(&half_hour) {
            SunPosition {
                cos_zenith: 0.48,
                elevation: 0.5,
            }
        } else {
            SunPosition {
                cos_zenith: 0.0,
                elevation: -0.2,
            }
        }
    }

    fn diffuse_fraction(&self, _doy: u16, _cos_zenith: f64, _par: f64) -> f64 {
        0.25
    }

    fn absorbed_radiation(
        &self,
        par: f64,
        _diffuse_frac: f64,
        _elevation: f64,
        _cos_zenith: f64,
        total_lai: f64,
    ) -> AbsorbedRadiation {
        AbsorbedRadiation {
            apar: self.apar_share.map(|s| s * par),
            lai: self.lai_share.map(|s| s * total_lai),
        }
    }
}

/// Per-class constant gas exchange with a call counter
struct StubPhotosynthesis {
    sunlit: GasExchange,
    shaded: GasExchange,
    calls: Cell<usize>,
}

impl StubPhotosynthesis {
    fn constant(gsc: f64, assimilation: f64) -> Self {
        let gas = GasExchange { gsc, assimilation };
        Self {
            sunlit: gas,
            shaded: gas,
            calls: Cell::new(0),
        }
    }
}

impl PhotosynthesisModel for StubPhotosynthesis {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange {
        self.calls.set(self.calls.get() + 1);
        // The stub radiation gives sunlit leaves the larger APAR
        if leaf.apar >= 1000.0 {
            self.sunlit
        } else {
            self.shaded
        }
    }
}

/// Stomata that snap between nearly closed and wide open on every call
struct Flapping {
    calls: Cell<usize>,
}

impl PhotosynthesisModel for Flapping {
    fn photosynthesis_c3(&self, _leaf: &LeafEnvironment) -> GasExchange {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        GasExchange {
            gsc: if n % 2 == 1 { 0.01 } else { 0.5 },
            assimilation: 10.0,
        }
    }
}

/// Constant gas exchange that keeps the nitrogen handed to each call
struct NitrogenRecorder {
    gas: GasExchange,
    ncontent: RefCell<Vec<f64>>,
}

impl PhotosynthesisModel for NitrogenRecorder {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange {
        self.ncontent.borrow_mut().push(leaf.ncontent);
        self.gas
    }
}

#[derive(Default)]
struct RecordingWater {
    calls: Vec<(f64, f64)>,
}

impl WaterBalance for RecordingWater {
    fn sub_daily_water_balance(&mut self, total_rnet: f64, canopy_transpiration: f64) {
        self.calls.push((total_rnet, canopy_transpiration));
    }
}

fn forcing(len: usize, par: f64) -> MetForcing {
    (0..len)
        .map(|_| {
            MeteorologicalSample::new(180, par, Celsius::new(25.0), Kilopascals::new(1.5), 2.0)
        })
        .collect()
}

#[test]
fn test_single_slot_gpp_increment() {
    let radiation = StubRadiation {
        apar_share: LeafPair::new(2.4, 0.6),
        lai_share: LeafPair::new(0.6, 0.4),
        ..StubRadiation::all_day()
    };
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        radiation,
        StubPhotosynthesis::constant(0.3, 15.0),
        RecordingWater::default(),
    );
    let mut control = Control {
        num_half_hours: 1,
        hrly_idx: 0,
    };
    let mut fluxes = DailyFluxes::new();

    // LAI 2.0 splits into 1.2 sunlit and 0.8 shaded
    let day = model
        .run_day(&mut control, &forcing(1, 500.0), &CanopyState::new(2.0, 0.03), &mut fluxes)
        .expect("one slot");

    let record = &day.records[0];
    assert_eq!(record.branch, SlotBranch::Sunlit);
    assert_relative_eq!(record.lai.sunlit, 1.2);
    assert_relative_eq!(record.lai.shaded, 0.8);
    assert_relative_eq!(record.aggregate.acanopy, 30.0, max_relative = 1e-12);
    // (1.2 × 15 + 0.8 × 15) µmol m⁻² s⁻¹ over half an hour in g C m⁻²
    assert_relative_eq!(fluxes.gpp_gcm2, 0.648, max_relative = 1e-12);
    assert_relative_eq!(fluxes.npp_gcm2, 0.324, max_relative = 1e-12);
    assert_relative_eq!(fluxes.apar, 1500.0);
    assert_eq!(control.hrly_idx, 1);
}

#[test]
fn test_canopy_fluxes_are_lai_weighted_leaf_fluxes() {
    let photosynthesis = StubPhotosynthesis {
        sunlit: GasExchange {
            gsc: 0.35,
            assimilation: 18.0,
        },
        shaded: GasExchange {
            gsc: 0.12,
            assimilation: 6.0,
        },
        calls: Cell::new(0),
    };
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        StubRadiation::all_day(),
        photosynthesis,
        RecordingWater::default(),
    );
    let mut control = Control::default();
    let mut fluxes = DailyFluxes::new();
    let day = model
        .run_day(&mut control, &forcing(48, 1200.0), &CanopyState::new(4.0, 0.03), &mut fluxes)
        .expect("full day");

    for record in &day.records {
        let leaves = record.leaves.expect("sun is up all day");
        let weighted = |f: fn(&canopy_core::LeafSolution) -> f64| {
            record.lai.sunlit * f(&leaves.sunlit) + record.lai.shaded * f(&leaves.shaded)
        };
        assert_relative_eq!(record.aggregate.acanopy, weighted(|l| l.state.anleaf));
        assert_relative_eq!(record.aggregate.gsc_canopy, weighted(|l| l.state.gsc));
        assert_relative_eq!(record.aggregate.trans_canopy, weighted(|l| l.state.transpiration));
        assert_relative_eq!(
            record.aggregate.acanopy,
            2.4 * 18.0 + 1.6 * 6.0,
            max_relative = 1e-12
        );
        assert_eq!(leaves.sunlit.class, LeafClass::Sunlit);
        assert_eq!(leaves.shaded.class, LeafClass::Shaded);
    }
}

#[test]
fn test_dark_and_dim_slots_have_no_leaf_fluxes() {
    let radiation = StubRadiation {
        sunrise: 12,
        sunset: 36,
        ..StubRadiation::all_day()
    };
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        radiation,
        StubPhotosynthesis::constant(0.3, 12.0),
        RecordingWater::default(),
    );

    // Sun is up at slots 12..36 but PAR sits on the threshold for 20..24
    let mut samples: Vec<MeteorologicalSample> = forcing(48, 900.0).samples().to_vec();
    for s in &mut samples[20..24] {
        s.par = 50.0;
    }
    let met = MetForcing::new(samples);

    let mut control = Control::default();
    let mut fluxes = DailyFluxes::new();
    let day = model
        .run_day(&mut control, &met, &CanopyState::new(3.0, 0.03), &mut fluxes)
        .expect("full day");

    assert_eq!(day.sunlit_slots(), 20);
    for record in &day.records {
        let dark = record.slot < 12 || record.slot >= 36 || (20..24).contains(&record.slot);
        if dark {
            assert_eq!(record.branch, SlotBranch::Dark);
            assert_eq!(record.aggregate.acanopy, 0.0);
            assert_eq!(record.aggregate.trans_canopy, 0.0);
            assert_eq!(record.aggregate.gsc_canopy, 0.0);
            assert!(record.leaves.is_none());
        } else {
            assert_eq!(record.branch, SlotBranch::Sunlit);
            assert!(record.aggregate.trans_canopy > 0.0);
        }
    }

    // The water balance runs every half-hour, lit or not
    assert_eq!(model.water.calls.len(), 48);
    assert_eq!(model.water.calls[0], (0.0, 0.0));
    // Two leaf solves of two passes each per lit slot
    assert_eq!(model.photosynthesis.calls.get(), 20 * 4);
}

#[test]
fn test_leafless_canopy_in_sunshine() {
    let photosynthesis = NitrogenRecorder {
        gas: GasExchange {
            gsc: 0.3,
            assimilation: 12.0,
        },
        ncontent: RefCell::new(Vec::new()),
    };
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        StubRadiation::all_day(),
        photosynthesis,
        RecordingWater::default(),
    );
    let mut control = Control {
        num_half_hours: 1,
        hrly_idx: 0,
    };
    let mut fluxes = DailyFluxes::new();

    let day = model
        .run_day(&mut control, &forcing(1, 900.0), &CanopyState::new(0.0, 0.03), &mut fluxes)
        .expect("bare canopy is not an error");

    let record = &day.records[0];
    assert_eq!(record.branch, SlotBranch::Sunlit);
    assert_eq!(record.lai, LeafPair::new(0.0, 0.0));
    assert_eq!(record.aggregate.acanopy, 0.0);
    assert_eq!(record.aggregate.gsc_canopy, 0.0);
    assert_eq!(record.aggregate.trans_canopy, 0.0);

    let seen = model.photosynthesis.ncontent.borrow();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|&n| n == 0.0));

    let leaves = record.leaves.expect("leaves solved on a sunlit slot");
    for leaf in [leaves.sunlit, leaves.shaded] {
        assert!(leaf.state.tleaf.value().is_finite());
        assert!(leaf.state.transpiration.is_finite());
    }
    assert_eq!(fluxes.gpp_gcm2, 0.0);
    assert!(fluxes.npp_gcm2.is_finite());
    assert_eq!(model.water.calls, [(0.0, 0.0)]);
    assert_eq!(control.hrly_idx, 1);
}

#[test]
fn test_c4_aborts_before_any_work() {
    let params = CanopyParams {
        ps_pathway: PhotosynthesisPathway::C4,
        ..CanopyParams::default()
    };
    let mut model = CanopyModel::new(
        params,
        StubRadiation::all_day(),
        StubPhotosynthesis::constant(0.3, 12.0),
        RecordingWater::default(),
    );
    let mut control = Control::default();
    let mut fluxes = DailyFluxes {
        gpp_gcm2: 3.5,
        transpiration: 1.25,
        ..DailyFluxes::default()
    };
    let before = fluxes;

    let state = CanopyState::new(3.0, 0.03);
    let result = model.run_day(&mut control, &forcing(48, 900.0), &state, &mut fluxes);

    assert_eq!(result, Err(CanopyError::C4NotImplemented));
    assert_eq!(model.photosynthesis.calls.get(), 0);
    assert!(model.water.calls.is_empty());
    assert_eq!(fluxes, before);
    assert_eq!(control.hrly_idx, 0);
}

#[test]
fn test_non_convergence_aborts_after_pass_limit() {
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        StubRadiation {
            apar_share: LeafPair::new(2.4, 0.6),
            ..StubRadiation::all_day()
        },
        Flapping { calls: Cell::new(0) },
        RecordingWater::default(),
    );
    let mut control = Control::default();
    let mut fluxes = DailyFluxes::new();

    let state = CanopyState::new(2.0, 0.03);
    let result = model.run_day(&mut control, &forcing(48, 500.0), &state, &mut fluxes);

    match result {
        Err(CanopyError::NonConvergence {
            leaf,
            iterations,
            last_step,
        }) => {
            assert_eq!(leaf, LeafClass::Sunlit);
            assert_eq!(iterations, 100);
            assert!(last_step > 0.5, "flapping stomata keep moving the leaf: {last_step}");
        }
        other => panic!("expected non-convergence, got {other:?}"),
    }
    assert_eq!(model.photosynthesis.calls.get(), 100);
    // The failing slot never reached the water balance
    assert!(model.water.calls.is_empty());
}

#[test]
fn test_forcing_exhausted_is_reported() {
    let mut model = CanopyModel::new(
        CanopyParams::default(),
        StubRadiation::all_day(),
        StubPhotosynthesis::constant(0.3, 12.0),
        RecordingWater::default(),
    );
    let mut control = Control::default();
    let mut fluxes = DailyFluxes::new();
    let state = CanopyState::new(3.0, 0.03);
    let result = model.run_day(&mut control, &forcing(30, 900.0), &state, &mut fluxes);

    assert_eq!(result, Err(CanopyError::ForcingExhausted { cursor: 30, len: 30 }));
    assert_eq!(model.water.calls.len(), 30);
}

#[test]
fn test_net_radiation_coupling() {
    let run = |coupling: NetRadiationCoupling| {
        let params = CanopyParams {
            rnet_coupling: coupling,
            ..CanopyParams::default()
        };
        let mut model = CanopyModel::new(
            params,
            StubRadiation {
                sunrise: 10,
                sunset: 38,
                ..StubRadiation::all_day()
            },
            StubPhotosynthesis::constant(0.3, 12.0),
            RecordingWater::default(),
        );
        let mut control = Control::default();
        let mut fluxes = DailyFluxes::new();
        let day = model
            .run_day(&mut control, &forcing(48, 900.0), &CanopyState::new(3.0, 0.03), &mut fluxes)
            .expect("full day");
        (day, model.water.calls, fluxes)
    };

    let (_, legacy_calls, legacy_fluxes) = run(NetRadiationCoupling::Legacy);
    assert!(legacy_calls.iter().all(|&(rnet, _)| rnet == 0.0));
    assert_eq!(legacy_fluxes.total_rnet, 0.0);

    let (day, coupled_calls, coupled_fluxes) = run(NetRadiationCoupling::LeafEnergyBalance);
    for (record, &(rnet, trans)) in day.records.iter().zip(&coupled_calls) {
        assert_eq!(rnet, record.aggregate.total_rnet);
        assert_eq!(trans, record.aggregate.trans_canopy);
        match record.leaves {
            Some(leaves) => {
                let expected = leaves.map(|l| l.state.rnet).weighted_sum(&record.lai);
                assert_relative_eq!(rnet, expected);
                assert!(rnet > 0.0);
            }
            None => assert_eq!(rnet, 0.0),
        }
    }
    // Carbon does not depend on where net radiation goes
    assert_relative_eq!(legacy_fluxes.gpp_gcm2, coupled_fluxes.gpp_gcm2);
    assert!(coupled_fluxes.total_rnet > 0.0);
}

#[test]
fn test_ensemble_matches_serial_runs() {
    let site = |lai: f64| {
        SiteDay::new(
            CanopyModel::new(
                CanopyParams::default(),
                StubRadiation {
                    sunrise: 12,
                    sunset: 36,
                    ..StubRadiation::all_day()
                },
                StubPhotosynthesis::constant(0.25, 10.0),
                RecordingWater::default(),
            ),
            forcing(48, 800.0),
            CanopyState::new(lai, 0.03),
        )
    };

    let lais = [0.5, 1.5, 3.0, 6.0];
    let mut sites: Vec<_> = lais.iter().map(|&l| site(l)).collect();
    let parallel = run_ensemble(&mut sites);

    for (&lai, result) in lais.iter().zip(&parallel) {
        let mut serial = site(lai);
        let expected = serial.run().expect("serial run");
        assert_eq!(result.as_ref().expect("parallel run"), &expected);
    }
}
