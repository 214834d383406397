//! utils — conversion helpers for the Python bindings.
//!
//! Every item here is compiled only with the `python-bindings` feature. The
//! helpers turn Python array-likes and keyword arguments into validated
//! [`LPData`], [`LPOptions`], [`ExternalShock`] and [`RegimeOptions`] values;
//! all validation errors surface as `ValueError`.

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Axis};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use crate::{
    inference::{
        hac::{HACOptions, HacBandwidth},
        kernel::KernelType,
        regression::Estimator,
    },
    projections::core::{
        data::{ExternalShock, LPData},
        options::{HpSwitch, LPOptions, LagSpec, RegimeOptions, ShockType, Trend},
        selection::InfoCriterion,
    },
};

/// 1-D float64 series from a numpy array, pandas Series or sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_series<'py>(raw: &Bound<'py, PyAny>, what: &str) -> PyResult<Array1<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let vec: Vec<f64> = raw.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(format!(
            "{what}: expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64"
        ))
    })?;
    Ok(Array1::from(vec))
}

/// 2-D float64 block (rows = time) from a numpy array, pandas DataFrame,
/// nested sequence, or a 1-D series treated as a single column.
#[cfg(feature = "python-bindings")]
pub fn extract_matrix<'py>(raw: &Bound<'py, PyAny>, what: &str) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    if let Ok(rows) = raw.extract::<Vec<Vec<f64>>>() {
        let ncols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != ncols) {
            return Err(PyValueError::new_err(format!("{what}: rows have different lengths")));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let nrows = if ncols == 0 { 0 } else { flat.len() / ncols };
        return Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|err| PyValueError::new_err(format!("{what}: {err}")));
    }
    Ok(extract_series(raw, what)?.insert_axis(Axis(1)))
}

/// Endogenous block plus optional names, exogenous and contemporaneous blocks.
#[cfg(feature = "python-bindings")]
pub fn extract_lp_data<'py>(
    endog: &Bound<'py, PyAny>, names: Option<Vec<String>>, exog: Option<&Bound<'py, PyAny>>,
    contemp: Option<&Bound<'py, PyAny>>,
) -> PyResult<LPData> {
    let mut data = LPData::new(extract_matrix(endog, "endog")?, names)?;
    if let Some(exog) = exog {
        data = data.with_exog(extract_matrix(exog, "exog")?)?;
    }
    if let Some(contemp) = contemp {
        data = data.with_contemp(extract_matrix(contemp, "contemp")?)?;
    }
    Ok(data)
}

/// External shock aligned with `data`, with optional instruments.
#[cfg(feature = "python-bindings")]
pub fn extract_shock<'py>(
    data: &LPData, shock: &Bound<'py, PyAny>, instruments: Option<&Bound<'py, PyAny>>,
) -> PyResult<ExternalShock> {
    let mut external = ExternalShock::new(extract_series(shock, "shock")?, data)?;
    if let Some(instruments) = instruments {
        external = external.with_instruments(extract_matrix(instruments, "instruments")?)?;
    }
    Ok(external)
}

/// Fixed lag order or criterion search; exactly one may be requested.
#[cfg(feature = "python-bindings")]
pub fn extract_lag_spec(
    lags: Option<usize>, criterion: Option<&str>, max_lags: Option<usize>,
) -> PyResult<LagSpec> {
    match (lags, criterion) {
        (Some(_), Some(_)) => Err(PyValueError::new_err(
            "give either `lags` or `criterion` (with `max_lags`), not both",
        )),
        (_, Some(name)) => {
            let criterion: InfoCriterion = name.parse()?;
            let max_lags = max_lags.ok_or_else(|| {
                PyValueError::new_err("`max_lags` must be provided with `criterion`")
            })?;
            Ok(LagSpec::Criterion { criterion, max_lags })
        }
        (lags, None) => Ok(LagSpec::Fixed(lags.unwrap_or(1))),
    }
}

/// HAC kernel and truncation policy; `lag = None` ties the lag to the horizon.
#[cfg(feature = "python-bindings")]
pub fn extract_hac_options(
    kernel: Option<&str>, lag: Option<usize>, small_sample_correction: Option<bool>,
) -> PyResult<HACOptions> {
    let kernel = match kernel {
        Some(name) => name.parse::<KernelType>().map_err(PyValueError::new_err)?,
        None => KernelType::Bartlett,
    };
    let bandwidth = lag.map_or(HacBandwidth::Horizon, HacBandwidth::Fixed);
    Ok(HACOptions::new(kernel, bandwidth, small_sample_correction.unwrap_or(false)))
}

/// Estimator name (`"ols"` or `"2sls"`).
#[cfg(feature = "python-bindings")]
pub fn extract_estimator(name: Option<&str>) -> PyResult<Estimator> {
    match name {
        Some(name) => name.parse::<Estimator>().map_err(PyValueError::new_err),
        None => Ok(Estimator::Ols),
    }
}

/// Options shared by every projection entry point.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn extract_lp_options(
    horizons: usize, lags: Option<usize>, criterion: Option<&str>, max_lags: Option<usize>,
    exog_lags: usize, trend: usize, shock_type: usize, confint: f64, hac_kernel: Option<&str>,
    hac_lag: Option<usize>, small_sample_correction: Option<bool>, num_threads: Option<usize>,
) -> PyResult<LPOptions> {
    let lag_spec = extract_lag_spec(lags, criterion, max_lags)?;
    let hac = extract_hac_options(hac_kernel, hac_lag, small_sample_correction)?;
    let mut options = LPOptions::new(lag_spec, horizons)?
        .with_exog_lags(exog_lags)
        .with_trend(Trend::from_order(trend)?)
        .with_shock_type(ShockType::from_order(shock_type)?)
        .with_hac(hac)
        .with_confint(confint)?;
    if let Some(threads) = num_threads {
        options = options.with_num_threads(threads)?;
    }
    Ok(options)
}

/// Smooth-transition parameters; `lambda` switches on HP filtering.
#[cfg(feature = "python-bindings")]
pub fn extract_regime_options(gamma: f64, lambda: Option<f64>) -> PyResult<RegimeOptions> {
    let hp = lambda.map_or(HpSwitch::Raw, |lambda| HpSwitch::Filtered { lambda });
    Ok(RegimeOptions::new(gamma, hp)?)
}
