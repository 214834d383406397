//! Integration tests for the local-projection pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from validated data, through design
//!   construction, lag selection, shock identification and HAC estimation,
//!   to gathered impulse-response bands.
//! - Exercise realistic configurations (three variables, 100+ observations,
//!   criterion search, external shocks with instruments, two regimes).
//!
//! Coverage
//! --------
//! - `projections::models`: `LinearProjection`, `IvProjection`,
//!   `NonlinearProjection`, `NonlinearIvProjection`.
//! - `projections::scheduler`: results independent of the worker count;
//!   failed shock tasks leave NaN slices.
//! - `projections::core`: unit-shock normalization, band ordering, collapse
//!   at `confint = 0`, rescaling invariance (including small-scale data next
//!   to a quadratic trend), short-sample rejection.
//!
//! Exclusions
//! ----------
//! - Formula-level checks of kernels, criteria and the HP filter; these are
//!   covered by unit tests.
//! - Python bindings.
use approx::assert_relative_eq;
use ndarray::{Array1, Array2};
use rust_local_projections::{
    inference::regression::Estimator,
    projections::{
        core::{
            data::{ExternalShock, LPData},
            options::{HpSwitch, LPOptions, LagSpec, RegimeOptions, ShockType, Trend},
            results::IrfBands,
            selection::InfoCriterion,
        },
        errors::LPError,
        models::{IvProjection, LinearProjection, NonlinearIvProjection, NonlinearProjection},
    },
};

/// Deterministic uniform noise on `[-0.5, 0.5)` from a 64-bit LCG.
fn noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        })
        .collect()
}

/// Three-variable VAR(1) with correlated innovations.
///
/// Returns the data together with the innovation of the first variable, used
/// as an external shock.
fn var3(nobs: usize, seed: u64) -> (LPData, Array1<f64>) {
    let e = noise(3 * nobs, seed);
    let mut y = Array2::<f64>::zeros((nobs, 3));
    let mut shock = Array1::<f64>::zeros(nobs);
    for t in 0..nobs {
        let (e1, e2, e3) = (e[3 * t], e[3 * t + 1], e[3 * t + 2]);
        shock[t] = e1;
        let u1 = e1;
        let u2 = 0.4 * e1 + e2;
        let u3 = 0.2 * e1 - 0.3 * e2 + e3;
        if t == 0 {
            y[[t, 0]] = u1;
            y[[t, 1]] = u2;
            y[[t, 2]] = u3;
            continue;
        }
        let (a, b, c) = (y[[t - 1, 0]], y[[t - 1, 1]], y[[t - 1, 2]]);
        y[[t, 0]] = 0.5 * a + 0.1 * b + u1;
        y[[t, 1]] = 0.2 * a + 0.4 * b + u2;
        y[[t, 2]] = -0.1 * a + 0.2 * b + 0.3 * c + u3;
    }
    let names = vec!["output".to_string(), "prices".to_string(), "rate".to_string()];
    (LPData::new(y, Some(names)).unwrap(), shock)
}

fn assert_ordered(bands: &IrfBands) {
    for ((m, lo), up) in bands.mean.iter().zip(bands.lower.iter()).zip(bands.upper.iter()) {
        assert!(m.is_finite());
        assert!(lo <= m && m <= up, "band ordering violated: {lo} ≤ {m} ≤ {up}");
    }
}

#[test]
// Purpose
// -------
// Unit-shock round trip on a 3-variable, 100-observation system.
//
// Given
// -----
// - VAR(1) data, p = 2, H = 8, unit shocks.
//
// Expect
// ------
// - Shape (3, 9, 3); own impact responses exactly 1; zero impact on
//   variables ordered before the shock; lower ≤ mean ≤ upper everywhere.
fn linear_unit_shock_round_trip() {
    let (data, _) = var3(100, 17);
    let opts = LPOptions::new(LagSpec::Fixed(2), 8).unwrap().with_shock_type(ShockType::Unit);
    let irf = LinearProjection::new(opts).estimate(&data).unwrap();

    assert_eq!(irf.bands.dim(), (3, 9, 3));
    assert!(irf.failures.is_empty());
    assert_eq!(irf.names[2], "rate");
    for shock in 0..3 {
        assert_relative_eq!(irf.bands.mean[[shock, 0, shock]], 1.0, epsilon = 1e-12);
        for earlier in 0..shock {
            assert_eq!(irf.bands.mean[[earlier, 0, shock]], 0.0);
        }
    }
    assert_ordered(&irf.bands);
}

#[test]
// Purpose
// -------
// With confint = 0 every band collapses onto the mean.
fn zero_confint_collapses_bands() {
    let (data, _) = var3(120, 5);
    let opts = LPOptions::new(LagSpec::Fixed(1), 5).unwrap().with_confint(0.0).unwrap();
    let irf = LinearProjection::new(opts).estimate(&data).unwrap();
    assert_eq!(irf.bands.lower, irf.bands.mean);
    assert_eq!(irf.bands.upper, irf.bands.mean);
}

#[test]
// Purpose
// -------
// Rescaling every endogenous series by c leaves unit-shock responses
// unchanged and scales standard-deviation-shock responses by c.
fn responses_are_rescaling_invariant() {
    let (data, _) = var3(150, 23);
    let scaled = LPData::new(data.endog.mapv(|v| 10.0 * v), None).unwrap();

    let unit = LPOptions::new(LagSpec::Fixed(2), 4).unwrap().with_shock_type(ShockType::Unit);
    let base = LinearProjection::new(unit.clone()).estimate(&data).unwrap();
    let rescaled = LinearProjection::new(unit).estimate(&scaled).unwrap();
    for (a, b) in base.bands.mean.iter().zip(rescaled.bands.mean.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8, max_relative = 1e-7);
    }
    for (a, b) in base.bands.upper.iter().zip(rescaled.bands.upper.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8, max_relative = 1e-7);
    }

    let sd = LPOptions::new(LagSpec::Fixed(2), 4).unwrap();
    let base = LinearProjection::new(sd.clone()).estimate(&data).unwrap();
    let rescaled = LinearProjection::new(sd).estimate(&scaled).unwrap();
    for (a, b) in base.bands.mean.iter().zip(rescaled.bands.mean.iter()) {
        assert_relative_eq!(10.0 * a, *b, epsilon = 1e-8, max_relative = 1e-7);
    }
}

#[test]
// Purpose
// -------
// Small-scale data next to a quadratic trend is estimable and gives the
// same unit-shock responses as the original data.
//
// Given
// -----
// - VAR(1) data, T = 300, p = 2, H = 4, `Trend::Quadratic`; the same data
//   multiplied by 0.01, so the trend columns dwarf the lagged regressors.
//
// Expect
// ------
// - No failures on either scale; identical responses and bands.
fn small_scale_data_with_quadratic_trend() {
    let (data, _) = var3(300, 71);
    let small = LPData::new(data.endog.mapv(|v| 0.01 * v), None).unwrap();
    let opts = LPOptions::new(LagSpec::Fixed(2), 4)
        .unwrap()
        .with_trend(Trend::Quadratic)
        .with_shock_type(ShockType::Unit);

    let base = LinearProjection::new(opts.clone()).estimate(&data).unwrap();
    let scaled = LinearProjection::new(opts).estimate(&small).unwrap();
    assert!(base.failures.is_empty());
    assert!(scaled.failures.is_empty());
    assert_ordered(&scaled.bands);
    for (a, b) in base.bands.mean.iter().zip(scaled.bands.mean.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8, max_relative = 1e-6);
    }
    for (a, b) in base.bands.lower.iter().zip(scaled.bands.lower.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-8, max_relative = 1e-6);
    }
}

#[test]
// Purpose
// -------
// Criterion search gives identical results for any worker count.
fn criterion_search_is_deterministic_across_threads() {
    let (data, _) = var3(140, 31);
    let lags = LagSpec::Criterion { criterion: InfoCriterion::Aicc, max_lags: 4 };
    let base = LPOptions::new(lags, 6).unwrap();

    let single = LinearProjection::new(base.clone().with_num_threads(1).unwrap())
        .estimate(&data)
        .unwrap();
    let multi = LinearProjection::new(base.with_num_threads(3).unwrap()).estimate(&data).unwrap();

    assert_eq!(single.bands, multi.bands);
    assert_eq!(single.selected_lags, multi.selected_lags);
    let selected = single.selected_lags.unwrap();
    assert!(selected.iter().all(|&p| (1..=4).contains(&p)));
}

#[test]
// Purpose
// -------
// T = 5 with p = 4 and H = 3 is rejected before any task runs.
fn short_sample_is_insufficient_data() {
    let endog = Array2::from_shape_vec((5, 1), vec![0.1, 0.4, -0.2, 0.3, 0.0]).unwrap();
    let data = LPData::new(endog, None).unwrap();
    let opts = LPOptions::new(LagSpec::Fixed(4), 3).unwrap();
    let err = LinearProjection::new(opts).estimate(&data).unwrap_err();
    assert!(matches!(err, LPError::InsufficientData { .. }));
}

#[test]
// Purpose
// -------
// External-shock projections with zero lags, by OLS and by 2SLS.
//
// Given
// -----
// - The first structural innovation as shock; a noisy copy as instrument.
//
// Expect
// ------
// - Shape (3, H+1, 1); impact response of the first variable near 1;
//   ordered bands for both estimators.
fn iv_projection_with_and_without_instruments() {
    let (data, shock) = var3(200, 41);
    let jitter = noise(200, 42);
    let instrument = Array2::from_shape_fn((200, 1), |(t, _)| shock[t] + 0.2 * jitter[t]);
    let external = ExternalShock::new(shock, &data).unwrap();
    let instrumented = external.clone().with_instruments(instrument).unwrap();
    let opts = LPOptions::new(LagSpec::Fixed(0), 6).unwrap();

    let ols = IvProjection::new(opts.clone(), Estimator::Ols).estimate(&data, &external).unwrap();
    assert_eq!(ols.bands.dim(), (3, 7, 1));
    assert!((ols.bands.mean[[0, 0, 0]] - 1.0).abs() < 0.1);
    assert_ordered(&ols.bands);

    let tsls = IvProjection::new(opts, Estimator::TwoStageLeastSquares)
        .estimate(&data, &instrumented)
        .unwrap();
    assert!((tsls.bands.mean[[0, 0, 0]] - 1.0).abs() < 0.15);
    assert_ordered(&tsls.bands);
}

#[test]
// Purpose
// -------
// Two-regime projections run end to end, with raw and HP-filtered switching.
fn nonlinear_projections_run() {
    let (data, shock) = var3(200, 55);
    let switching = Array1::from(noise(200, 56));
    let opts = LPOptions::new(LagSpec::Fixed(1), 4).unwrap().with_shock_type(ShockType::Unit);

    let raw = RegimeOptions::new(3.0, HpSwitch::Raw).unwrap();
    let irf = NonlinearProjection::new(opts.clone(), raw).estimate(&data, &switching).unwrap();
    assert_eq!(irf.regime1.dim(), (3, 5, 3));
    assert!(irf.failures.is_empty());
    assert!(irf.weights.values.iter().all(|&f| f > 0.0 && f < 1.0));
    assert_ordered(&irf.regime1);
    assert_ordered(&irf.regime2);

    let filtered = RegimeOptions::new(3.0, HpSwitch::Filtered { lambda: 1600.0 }).unwrap();
    let external = ExternalShock::new(shock, &data).unwrap();
    let iv_opts = LPOptions::new(LagSpec::Fixed(1), 4).unwrap();
    let iv = NonlinearIvProjection::new(iv_opts, filtered, Estimator::Ols)
        .estimate(&data, &external, &switching)
        .unwrap();
    assert_eq!(iv.regime2.dim(), (3, 5, 1));
    assert_ordered(&iv.regime1);
}

#[test]
// Purpose
// -------
// Failing shock tasks are reported and leave NaN slices.
//
// Given
// -----
// - γ so small that both regime blocks are numerically collinear.
//
// Expect
// ------
// - Every shock task fails with a singular design; all responses are NaN;
//   the call itself succeeds.
fn collinear_regimes_mark_failures() {
    let (data, _) = var3(120, 61);
    let switching = Array1::from(noise(120, 62));
    let opts = LPOptions::new(LagSpec::Fixed(1), 3).unwrap();
    let regime = RegimeOptions::new(1e-13, HpSwitch::Raw).unwrap();

    let irf = NonlinearProjection::new(opts, regime).estimate(&data, &switching).unwrap();
    assert_eq!(irf.failures.len(), 3);
    for (idx, failure) in irf.failures.iter().enumerate() {
        assert_eq!(failure.shock, idx);
        assert!(matches!(failure.error, LPError::SingularDesign { .. }));
    }
    assert!(irf.regime1.mean.iter().all(|v| v.is_nan()));
    assert!(irf.regime2.upper.iter().all(|v| v.is_nan()));
}
