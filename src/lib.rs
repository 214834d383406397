//! rust_local_projections — local-projection impulse responses with Python
//! bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the local-projection estimators to Python via the
//! `_rust_local_projections` extension module when the `python-bindings`
//! feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`inference` and `projections`) as the
//!   public crate surface.
//! - Define `#[pyclass]` result wrappers, the `lp_lin`, `lp_lin_iv`, `lp_nl`
//!   and `lp_nl_iv` functions, and the `#[pymodule]` initializer that
//!   registers them under `rust_local_projections.local_projections`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work happens in the inner Rust modules; this file performs
//!   only FFI glue, argument parsing and error mapping.
//! - The GIL is released while an estimation runs.
//!
//! Conventions
//! -----------
//! - Python receives response arrays shaped `(response, horizon, shock)`,
//!   matching [`projections::IrfBands`].
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`projections`] (or its `prelude`)
//!   and can ignore the PyO3 items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and by
//!   the integration tests under `tests/`.

pub mod inference;
pub mod projections;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{PyArray1, PyArray3, ToPyArray};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    projections::{
        core::results::{IrfBands, LinearIrf, NonlinearIrf},
        models::{IvProjection, LinearProjection, NonlinearIvProjection, NonlinearProjection},
    },
    utils::{
        extract_estimator, extract_lp_data, extract_lp_options, extract_regime_options,
        extract_series, extract_shock,
    },
};

/// LPResults — Python-facing view of a linear or IV projection.
///
/// Fields
/// ------
/// - `inner`: [`LinearIrf`]
///   Rust-side result holding bands, selected lags and failures.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_local_projections.local_projections")]
pub struct LPResults {
    inner: LinearIrf,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl LPResults {
    /// Point responses, shape `(response, horizon, shock)`.
    #[getter]
    pub fn mean<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray3<f64>> {
        self.inner.bands.mean.to_pyarray(py)
    }

    /// Lower band `mean − confint·se`.
    #[getter]
    pub fn lower<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray3<f64>> {
        self.inner.bands.lower.to_pyarray(py)
    }

    /// Upper band `mean + confint·se`.
    #[getter]
    pub fn upper<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray3<f64>> {
        self.inner.bands.upper.to_pyarray(py)
    }

    /// Lag orders chosen by the criterion search, or `None` for a fixed order.
    #[getter]
    pub fn selected_lags<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<usize>>> {
        self.inner.selected_lags.as_ref().map(|lags| lags.to_pyarray(py))
    }

    #[getter]
    pub fn names(&self) -> Vec<String> {
        self.inner.names.clone()
    }

    /// `(shock, message)` for every shock task that failed.
    #[getter]
    pub fn failures(&self) -> Vec<(usize, String)> {
        self.inner.failures.iter().map(|f| (f.shock, f.error.to_string())).collect()
    }
}

/// NLResults — Python-facing view of a two-regime projection.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_local_projections.local_projections")]
pub struct NLResults {
    inner: NonlinearIrf,
}

#[cfg(feature = "python-bindings")]
impl NLResults {
    fn regime(&self, regime: usize) -> &IrfBands {
        if regime == 1 { &self.inner.regime1 } else { &self.inner.regime2 }
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl NLResults {
    /// `(mean, lower, upper)` of regime 1 (weight `1 − f`) or 2 (weight `f`).
    #[pyo3(signature = (regime))]
    pub fn bands<'py>(
        &self, py: Python<'py>, regime: usize,
    ) -> PyResult<(Bound<'py, PyArray3<f64>>, Bound<'py, PyArray3<f64>>, Bound<'py, PyArray3<f64>>)>
    {
        if regime != 1 && regime != 2 {
            return Err(pyo3::exceptions::PyValueError::new_err("regime must be 1 or 2"));
        }
        let bands = self.regime(regime);
        Ok((bands.mean.to_pyarray(py), bands.lower.to_pyarray(py), bands.upper.to_pyarray(py)))
    }

    /// Transition weights `f(z*_t)` used for the regressors.
    #[getter]
    pub fn weights<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.weights.values.to_pyarray(py)
    }

    #[getter]
    pub fn selected_lags<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray3<usize>>> {
        self.inner.selected_lags.as_ref().map(|lags| lags.to_pyarray(py))
    }

    #[getter]
    pub fn names(&self) -> Vec<String> {
        self.inner.names.clone()
    }

    #[getter]
    pub fn failures(&self) -> Vec<(usize, String)> {
        self.inner.failures.iter().map(|f| (f.shock, f.error.to_string())).collect()
    }
}

/// Linear local projections with recursive (Cholesky) shocks.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    endog, horizons, lags = None, criterion = None, max_lags = None, exog = None, exog_lags = 0,
    contemp = None, trend = 0, shock_type = 0, confint = 1.96, hac_kernel = None, hac_lag = None,
    small_sample_correction = None, num_threads = None, names = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn lp_lin<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, horizons: usize, lags: Option<usize>,
    criterion: Option<&str>, max_lags: Option<usize>, exog: Option<&Bound<'py, PyAny>>,
    exog_lags: usize, contemp: Option<&Bound<'py, PyAny>>, trend: usize, shock_type: usize,
    confint: f64, hac_kernel: Option<&str>, hac_lag: Option<usize>,
    small_sample_correction: Option<bool>, num_threads: Option<usize>, names: Option<Vec<String>>,
) -> PyResult<LPResults> {
    let data = extract_lp_data(endog, names, exog, contemp)?;
    let options = extract_lp_options(
        horizons,
        lags,
        criterion,
        max_lags,
        exog_lags,
        trend,
        shock_type,
        confint,
        hac_kernel,
        hac_lag,
        small_sample_correction,
        num_threads,
    )?;
    let inner = py.allow_threads(|| LinearProjection::new(options).estimate(&data))?;
    Ok(LPResults { inner })
}

/// Local projections on an external shock, by OLS or 2SLS.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    endog, shock, horizons, instruments = None, estimator = None, lags = None, criterion = None,
    max_lags = None, exog = None, exog_lags = 0, contemp = None, trend = 0, confint = 1.96,
    hac_kernel = None, hac_lag = None, small_sample_correction = None, names = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn lp_lin_iv<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, shock: &Bound<'py, PyAny>, horizons: usize,
    instruments: Option<&Bound<'py, PyAny>>, estimator: Option<&str>, lags: Option<usize>,
    criterion: Option<&str>, max_lags: Option<usize>, exog: Option<&Bound<'py, PyAny>>,
    exog_lags: usize, contemp: Option<&Bound<'py, PyAny>>, trend: usize, confint: f64,
    hac_kernel: Option<&str>, hac_lag: Option<usize>, small_sample_correction: Option<bool>,
    names: Option<Vec<String>>,
) -> PyResult<LPResults> {
    let data = extract_lp_data(endog, names, exog, contemp)?;
    let shock = extract_shock(&data, shock, instruments)?;
    let estimator = extract_estimator(estimator)?;
    let options = extract_lp_options(
        horizons,
        lags.or(if criterion.is_none() { Some(0) } else { None }),
        criterion,
        max_lags,
        exog_lags,
        trend,
        0,
        confint,
        hac_kernel,
        hac_lag,
        small_sample_correction,
        None,
    )?;
    let inner = py.allow_threads(|| IvProjection::new(options, estimator).estimate(&data, &shock))?;
    Ok(LPResults { inner })
}

/// Two-regime smooth-transition local projections with recursive shocks.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    endog, switching, horizons, gamma, hp_lambda = None, lags = None, criterion = None,
    max_lags = None, exog = None, exog_lags = 0, contemp = None, trend = 0, shock_type = 0,
    confint = 1.96, hac_kernel = None, hac_lag = None, small_sample_correction = None,
    num_threads = None, names = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn lp_nl<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, switching: &Bound<'py, PyAny>, horizons: usize,
    gamma: f64, hp_lambda: Option<f64>, lags: Option<usize>, criterion: Option<&str>,
    max_lags: Option<usize>, exog: Option<&Bound<'py, PyAny>>, exog_lags: usize,
    contemp: Option<&Bound<'py, PyAny>>, trend: usize, shock_type: usize, confint: f64,
    hac_kernel: Option<&str>, hac_lag: Option<usize>, small_sample_correction: Option<bool>,
    num_threads: Option<usize>, names: Option<Vec<String>>,
) -> PyResult<NLResults> {
    let data = extract_lp_data(endog, names, exog, contemp)?;
    let switching = extract_series(switching, "switching")?;
    let regime = extract_regime_options(gamma, hp_lambda)?;
    let options = extract_lp_options(
        horizons,
        lags,
        criterion,
        max_lags,
        exog_lags,
        trend,
        shock_type,
        confint,
        hac_kernel,
        hac_lag,
        small_sample_correction,
        num_threads,
    )?;
    let inner =
        py.allow_threads(|| NonlinearProjection::new(options, regime).estimate(&data, &switching))?;
    Ok(NLResults { inner })
}

/// Two-regime smooth-transition local projections on an external shock.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    endog, shock, switching, horizons, gamma, hp_lambda = None, instruments = None,
    estimator = None, lags = None, criterion = None, max_lags = None, exog = None, exog_lags = 0,
    contemp = None, trend = 0, confint = 1.96, hac_kernel = None, hac_lag = None,
    small_sample_correction = None, names = None,
))]
#[allow(clippy::too_many_arguments)]
pub fn lp_nl_iv<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, shock: &Bound<'py, PyAny>,
    switching: &Bound<'py, PyAny>, horizons: usize, gamma: f64, hp_lambda: Option<f64>,
    instruments: Option<&Bound<'py, PyAny>>, estimator: Option<&str>, lags: Option<usize>,
    criterion: Option<&str>, max_lags: Option<usize>, exog: Option<&Bound<'py, PyAny>>,
    exog_lags: usize, contemp: Option<&Bound<'py, PyAny>>, trend: usize, confint: f64,
    hac_kernel: Option<&str>, hac_lag: Option<usize>, small_sample_correction: Option<bool>,
    names: Option<Vec<String>>,
) -> PyResult<NLResults> {
    let data = extract_lp_data(endog, names, exog, contemp)?;
    let shock = extract_shock(&data, shock, instruments)?;
    let switching = extract_series(switching, "switching")?;
    let regime = extract_regime_options(gamma, hp_lambda)?;
    let estimator = extract_estimator(estimator)?;
    let options = extract_lp_options(
        horizons,
        lags.or(if criterion.is_none() { Some(0) } else { None }),
        criterion,
        max_lags,
        exog_lags,
        trend,
        0,
        confint,
        hac_kernel,
        hac_lag,
        small_sample_correction,
        None,
    )?;
    let inner = py.allow_threads(|| {
        NonlinearIvProjection::new(options, regime, estimator).estimate(&data, &shock, &switching)
    })?;
    Ok(NLResults { inner })
}

/// Initialize the `_rust_local_projections` extension module.
///
/// Registers the `local_projections` submodule and inserts it into
/// `sys.modules` so `import rust_local_projections.local_projections` works.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_local_projections<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let local_projections_mod = PyModule::new(_py, "local_projections")?;
    local_projections(_py, m, &local_projections_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_local_projections.local_projections", local_projections_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn local_projections<'py>(
    _py: Python, root: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<LPResults>()?;
    m.add_class::<NLResults>()?;
    m.add_function(wrap_pyfunction!(lp_lin, m)?)?;
    m.add_function(wrap_pyfunction!(lp_lin_iv, m)?)?;
    m.add_function(wrap_pyfunction!(lp_nl, m)?)?;
    m.add_function(wrap_pyfunction!(lp_nl_iv, m)?)?;
    root.add_submodule(m)?;
    Ok(())
}
