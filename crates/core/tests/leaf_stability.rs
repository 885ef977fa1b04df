//! Stability loop behaviour over a spread of leaf environments
//!
//! Leaf temperature updates shrink from pass to pass and the loop settles in
//! a handful of passes for physically sensible inputs.

use approx::assert_relative_eq;
use canopy_core::collaborators::{GasExchange, LeafEnvironment, PhotosynthesisModel};
use canopy_core::core_types::units::{Celsius, Kilopascals};
use canopy_core::solver::{solve_leaf, LeafSolution, LoopExit};
use canopy_core::{CanopyParams, LeafClass, MeteorologicalSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Constant gas exchange that remembers every leaf temperature it was shown
struct Recording {
    gas: GasExchange,
    seen: RefCell<Vec<f64>>,
}

impl Recording {
    fn new(gsc: f64, assimilation: f64) -> Self {
        Self {
            gas: GasExchange { gsc, assimilation },
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl PhotosynthesisModel for Recording {
    fn photosynthesis_c3(&self, leaf: &LeafEnvironment) -> GasExchange {
        self.seen.borrow_mut().push(leaf.tleaf.value());
        self.gas
    }
}

fn sample(par: f64, tair: f64, vpd: f64, wind: f64) -> MeteorologicalSample {
    MeteorologicalSample::new(180, par, Celsius::new(tair), Kilopascals::new(vpd), wind)
}

/// Sunlit leaf of a canopy with LAI 2 and 2 g N m⁻²
fn solve_sunlit(model: &Recording, met: &MeteorologicalSample, apar: f64) -> LeafSolution {
    solve_leaf(model, &CanopyParams::default(), met, 2.0, LeafClass::Sunlit, 2.0, apar)
        .expect("C3 run")
}

#[test]
fn test_reference_leaf_settles_in_two_passes() {
    let met = sample(1000.0, 25.0, 1.5, 2.0);
    let model = Recording::new(0.3, 15.0);
    let sol = solve_sunlit(&model, &met, 1000.0);

    assert_eq!(sol.exit, LoopExit::Converged);
    let seen = model.seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], 25.0);
    assert_relative_eq!(seen[1], 24.95241, epsilon = 1e-4);
    assert_relative_eq!(sol.state.tleaf.value(), seen[1]);
    assert_relative_eq!(sol.state.transpiration, 0.0050649, max_relative = 1e-3);
    assert_relative_eq!(sol.state.rnet, 204.5008, max_relative = 1e-4);
}

#[test]
fn test_leaf_temperature_steps_shrink() {
    let mut rng = StdRng::seed_from_u64(0x5eed_cafe);
    let params = CanopyParams::default();

    for _ in 0..500 {
        let apar = rng.random_range(100.0..2000.0);
        let tair = rng.random_range(0.0..40.0);
        let vpd = rng.random_range(0.2..3.0);
        let wind = rng.random_range(0.5..8.0);
        let gsc = rng.random_range(0.02..0.5);
        let an = rng.random_range(1.0..25.0);
        let lai = rng.random_range(0.5..6.0);

        let met = sample(apar, tair, vpd, wind);
        let model = Recording::new(gsc, an);
        let sol = solve_leaf(&model, &params, &met, lai, LeafClass::Sunlit, 2.0, apar)
            .expect("C3 run");

        assert_eq!(sol.exit, LoopExit::Converged, "tair={tair} apar={apar} gsc={gsc}");
        assert!(sol.iterations <= 5, "took {} passes", sol.iterations);

        let seen = model.seen.borrow();
        let mut steps: Vec<f64> = seen.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
        steps.push(sol.last_step.value());
        // The first update jumps from air temperature; later ones must contract
        for k in 1..steps.len().saturating_sub(1) {
            assert!(
                steps[k + 1] < steps[k],
                "step grew at pass {}: {:?}",
                k + 1,
                steps
            );
        }
    }
}

#[test]
fn test_weak_stomata_warm_the_leaf() {
    // Little transpiration leaves most of the net radiation as sensible heat
    let met = sample(1500.0, 25.0, 1.5, 2.0);
    let model = Recording::new(0.005, 1.0);
    let sol = solve_sunlit(&model, &met, 1500.0);
    assert_eq!(sol.exit, LoopExit::Converged);
    assert!(sol.state.tleaf > met.tair);
    assert_relative_eq!(model.seen.borrow()[1], 25.918, epsilon = 1e-2);
}

#[test]
fn test_deficit_beyond_saturation_still_converges() {
    // Cold air with a deficit above esat(5°C) = 876 Pa
    let met = sample(1000.0, 5.0, 1.5, 2.0);
    let model = Recording::new(0.3, 15.0);
    let sol = solve_sunlit(&model, &met, 1000.0);

    assert_eq!(sol.exit, LoopExit::Converged);
    assert_eq!(sol.iterations, 2);
    assert_relative_eq!(model.seen.borrow()[1], 4.81288, epsilon = 1e-4);
    assert_relative_eq!(sol.state.rnet, 162.5710, max_relative = 1e-4);
    assert_relative_eq!(sol.state.transpiration, 0.0051551, max_relative = 1e-3);
    assert!(sol.state.dleaf.value().is_finite());
}
