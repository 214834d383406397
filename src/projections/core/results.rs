//! Impulse-response containers.
//!
//! Purpose
//! -------
//! Hold point estimates and confidence bands indexed
//! `[response, horizon, shock]`, the per-shock slices produced by worker
//! tasks, and the model-level result records returned to callers.
//!
//! Key behaviors
//! -------------
//! - [`ShockResponse`] is the `[response, horizon]` slice of one shock task;
//!   cells start as NaN and are filled with [`ShockResponse::set`].
//! - [`gather`] places task outputs by shock index; a failed task leaves its
//!   slice NaN and contributes a [`ShockFailure`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The horizon axis has `H + 1` entries; index 0 is the impact response.
//! - For every finite cell `lower ≤ mean ≤ upper`, since bands are
//!   `mean ∓ confint·σ` with `σ ≥ 0` and `confint ≥ 0`.
use crate::projections::{
    core::{
        options::{LPOptions, RegimeOptions},
        switching::RegimeWeights,
    },
    errors::{LPResult, ShockFailure},
};
use ndarray::{s, Array2, Array3};

/// Point estimates and bands, each `[response, horizon, shock]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IrfBands {
    pub mean: Array3<f64>,
    pub lower: Array3<f64>,
    pub upper: Array3<f64>,
}

impl IrfBands {
    /// NaN-filled bands of shape `(nvars, nhorizons, nshocks)`.
    pub fn nan(nvars: usize, nhorizons: usize, nshocks: usize) -> IrfBands {
        let shape = (nvars, nhorizons, nshocks);
        IrfBands {
            mean: Array3::from_elem(shape, f64::NAN),
            lower: Array3::from_elem(shape, f64::NAN),
            upper: Array3::from_elem(shape, f64::NAN),
        }
    }

    /// `(nvars, nhorizons, nshocks)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.mean.dim()
    }

    fn insert(&mut self, shock: usize, slice: &ShockResponse) {
        self.mean.slice_mut(s![.., .., shock]).assign(&slice.mean);
        self.lower.slice_mut(s![.., .., shock]).assign(&slice.lower);
        self.upper.slice_mut(s![.., .., shock]).assign(&slice.upper);
    }
}

/// Responses of every variable at every horizon to one shock.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockResponse {
    pub mean: Array2<f64>,
    pub lower: Array2<f64>,
    pub upper: Array2<f64>,
    /// Endogenous lag order used for each `[response, horizon]` cell.
    pub lags: Array2<usize>,
}

impl ShockResponse {
    pub fn new(nvars: usize, nhorizons: usize) -> ShockResponse {
        let shape = (nvars, nhorizons);
        ShockResponse {
            mean: Array2::from_elem(shape, f64::NAN),
            lower: Array2::from_elem(shape, f64::NAN),
            upper: Array2::from_elem(shape, f64::NAN),
            lags: Array2::zeros(shape),
        }
    }

    /// Store `mean ∓ confint·std_error` for one cell.
    pub fn set(
        &mut self, response: usize, horizon: usize, mean: f64, std_error: f64, confint: f64,
    ) {
        let half_width = confint * std_error;
        self.mean[[response, horizon]] = mean;
        self.lower[[response, horizon]] = mean - half_width;
        self.upper[[response, horizon]] = mean + half_width;
    }
}

/// Bands, lag orders and failures gathered from per-shock task outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Gathered {
    pub bands: IrfBands,
    /// `[response, horizon, shock]`.
    pub lags: Array3<usize>,
    pub failures: Vec<ShockFailure>,
}

/// Place task outputs by shock index.
pub fn gather(
    nvars: usize, nhorizons: usize, outcomes: Vec<LPResult<ShockResponse>>,
) -> Gathered {
    let nshocks = outcomes.len();
    let mut bands = IrfBands::nan(nvars, nhorizons, nshocks);
    let mut lags = Array3::<usize>::zeros((nvars, nhorizons, nshocks));
    let mut failures = Vec::new();
    for (shock, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(slice) => {
                bands.insert(shock, &slice);
                lags.slice_mut(s![.., .., shock]).assign(&slice.lags);
            }
            Err(error) => failures.push(ShockFailure { shock, error }),
        }
    }
    Gathered { bands, lags, failures }
}

/// LinearIrf — responses of the linear and IV models.
///
/// Fields
/// ------
/// - `bands`: [`IrfBands`]
///   `[response, horizon, shock]`; the IV model has one shock.
/// - `selected_lags`: `Option<Array3<usize>>`
///   Lag orders chosen by the criterion search, `[response, horizon, shock]`.
/// - `shock_matrix`: `Option<Array2<f64>>`
///   Impact matrix `D` of recursive identification (linear model only).
/// - `failures`: `Vec<ShockFailure>`
///   Shock tasks that did not complete; their slices are NaN.
/// - `names`, `options`: labels and the configuration used.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearIrf {
    pub bands: IrfBands,
    pub selected_lags: Option<Array3<usize>>,
    pub shock_matrix: Option<Array2<f64>>,
    pub failures: Vec<ShockFailure>,
    pub names: Vec<String>,
    pub options: LPOptions,
}

/// NonlinearIrf — state-dependent responses of the two-regime models.
///
/// `regime1` is the regime weighted by `1 − f`, `regime2` the one weighted
/// by `f`. `weights` holds the transition weights actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearIrf {
    pub regime1: IrfBands,
    pub regime2: IrfBands,
    pub weights: RegimeWeights,
    pub selected_lags: Option<Array3<usize>>,
    pub shock_matrix: Option<Array2<f64>>,
    pub failures: Vec<ShockFailure>,
    pub names: Vec<String>,
    pub options: LPOptions,
    pub regime: RegimeOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::errors::LPError;

    #[test]
    // Purpose
    // -------
    // Bands are symmetric around the mean and collapse when confint = 0.
    fn set_builds_symmetric_bands() {
        let mut slice = ShockResponse::new(2, 3);
        slice.set(1, 2, 0.5, 0.1, 1.96);
        assert!((slice.lower[[1, 2]] - (0.5 - 0.196)).abs() < 1e-12);
        assert!((slice.upper[[1, 2]] - (0.5 + 0.196)).abs() < 1e-12);

        slice.set(0, 0, -1.0, 0.3, 0.0);
        assert_eq!(slice.lower[[0, 0]], -1.0);
        assert_eq!(slice.upper[[0, 0]], -1.0);
        assert!(slice.mean[[0, 1]].is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Failed tasks leave NaN slices and are recorded by shock index.
    fn gather_places_by_index_and_records_failures() {
        let mut ok = ShockResponse::new(1, 2);
        ok.set(0, 0, 1.0, 0.0, 1.0);
        ok.set(0, 1, 2.0, 0.0, 1.0);
        ok.lags.fill(3);
        let outcomes = vec![Err(LPError::EmptyData), Ok(ok)];

        let gathered = gather(1, 2, outcomes);
        assert_eq!(gathered.bands.dim(), (1, 2, 2));
        assert!(gathered.bands.mean[[0, 0, 0]].is_nan());
        assert_eq!(gathered.bands.mean[[0, 1, 1]], 2.0);
        assert_eq!(gathered.lags[[0, 1, 1]], 3);
        assert_eq!(gathered.failures, vec![ShockFailure { shock: 0, error: LPError::EmptyData }]);
    }
}
