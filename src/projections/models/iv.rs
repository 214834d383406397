//! Local projections on an external shock (OLS or 2SLS).
//!
//! Purpose
//! -------
//! Estimate the responses of every endogenous variable to an externally
//! identified shock series, optionally instrumented, with HAC bands.
//!
//! Key behaviors
//! -------------
//! - For `h = 0..=H`, `y_{t+h}` is regressed on the design dated `t`, which
//!   contains the shock at `t`; the response is the shock coefficient and its
//!   standard error the HAC standard error of that coefficient.
//! - Under [`Estimator::TwoStageLeastSquares`] the shock column is
//!   instrumented by the instruments attached to the [`ExternalShock`].
//! - Zero endogenous lags are allowed.
//!
//! Conventions
//! -----------
//! - Results have a shock axis of length 1.
use crate::{
    inference::regression::{Estimator, HacEstimator},
    projections::{
        core::{
            data::{ExternalShock, LPData},
            design::LagMatrixBuilder,
            options::LPOptions,
            results::{gather, LinearIrf, ShockResponse},
        },
        errors::{LPError, LPResult},
        models::model_internals::{fit_equation, CandidateDesigns},
        scheduler::ShockPool,
    },
};

/// IvProjection — local projections on an external shock.
#[derive(Debug, Clone, PartialEq)]
pub struct IvProjection {
    pub options: LPOptions,
    pub estimator: Estimator,
}

impl IvProjection {
    pub fn new(options: LPOptions, estimator: Estimator) -> IvProjection {
        IvProjection { options, estimator }
    }

    /// Estimate responses `[response, horizon, 0]` to `shock`.
    ///
    /// # Errors
    /// - [`LPError::LengthMismatch`] if `shock` is not aligned with `data`.
    /// - [`LPError::InvalidConfig`] if 2SLS is requested without instruments.
    /// - [`LPError::InsufficientData`] if the furthest horizon is not estimable.
    pub fn estimate(&self, data: &LPData, shock: &ExternalShock) -> LPResult<LinearIrf> {
        let opts = &self.options;
        if shock.shock.len() != data.nobs() {
            return Err(LPError::LengthMismatch {
                block: "shock",
                expected: data.nobs(),
                actual: shock.shock.len(),
            });
        }
        let two_stage = self.estimator == Estimator::TwoStageLeastSquares;
        let builder =
            LagMatrixBuilder::new(data, opts.trend, opts.exog_lags).with_shock(shock, two_stage);
        let designs = CandidateDesigns::build(&builder, &opts.lags, opts.horizons)?;
        let estimator = HacEstimator::new(self.estimator, opts.hac);

        let pool = ShockPool::new(1, opts.num_threads)?;
        let outcomes = pool.scatter(|_| shock_task(opts, &estimator, &designs, data.nvars()));
        let gathered = gather(data.nvars(), opts.horizons + 1, outcomes);

        Ok(LinearIrf {
            bands: gathered.bands,
            selected_lags: designs.is_search().then_some(gathered.lags),
            shock_matrix: None,
            failures: gathered.failures,
            names: data.names.clone(),
            options: opts.clone(),
        })
    }
}

fn shock_task(
    opts: &LPOptions, estimator: &HacEstimator, designs: &CandidateDesigns, nvars: usize,
) -> LPResult<ShockResponse> {
    let mut out = ShockResponse::new(nvars, opts.horizons + 1);
    for horizon in 0..=opts.horizons {
        for response in 0..nvars {
            let design = designs.design(response, horizon)?;
            let fit = fit_equation(estimator, design, response, horizon, horizon, None)?;
            let col = design.layout.shock_column(0).ok_or(LPError::InvalidConfig {
                param: "shock",
                reason: "design has no shock column",
            })?;
            out.set(response, horizon, fit.beta[col], fit.std_error(col), opts.confint);
            out.lags[[response, horizon]] = design.layout.lags;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::core::options::LagSpec;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    fn uniform(n: usize, seed: u64) -> Array1<f64> {
        let mut state = seed;
        Array1::from_shape_fn(n, |_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        })
    }

    #[test]
    // Purpose
    // -------
    // With no lags and a response that is exactly 2·shock + 1, the impact
    // response is 2 with zero-width bands and later horizons are near 0.
    fn exact_response_to_external_shock() {
        let nobs = 60;
        let shock = uniform(nobs, 9);
        let mut y = Array2::<f64>::zeros((nobs, 1));
        y.column_mut(0).assign(&shock.mapv(|s| 1.0 + 2.0 * s));
        let data = LPData::new(y, None).unwrap();
        let shock = ExternalShock::new(shock, &data).unwrap();

        let opts = LPOptions::new(LagSpec::Fixed(0), 2).unwrap();
        let irf = IvProjection::new(opts, Estimator::Ols).estimate(&data, &shock).unwrap();
        assert_eq!(irf.bands.dim(), (1, 3, 1));
        assert_relative_eq!(irf.bands.mean[[0, 0, 0]], 2.0, epsilon = 1e-9);
        assert_relative_eq!(irf.bands.upper[[0, 0, 0]], 2.0, epsilon = 1e-6);
        assert!(irf.shock_matrix.is_none());
    }

    #[test]
    // Purpose
    // -------
    // 2SLS needs instruments; with instruments equal to the shock it matches OLS.
    fn two_stage_with_shock_as_instrument_matches_ols() {
        let nobs = 80;
        let shock = uniform(nobs, 4);
        let noise = uniform(nobs, 5);
        let y = Array2::from_shape_fn((nobs, 1), |(t, _)| 0.5 * shock[t] + noise[t]);
        let data = LPData::new(y, None).unwrap();
        let opts = LPOptions::new(LagSpec::Fixed(1), 3).unwrap();

        let bare = ExternalShock::new(shock.clone(), &data).unwrap();
        let err = IvProjection::new(opts.clone(), Estimator::TwoStageLeastSquares)
            .estimate(&data, &bare)
            .unwrap_err();
        assert!(matches!(err, LPError::InvalidConfig { param: "instruments", .. }));

        let instrumented = bare
            .clone()
            .with_instruments(shock.clone().insert_axis(ndarray::Axis(1)))
            .unwrap();
        let ols = IvProjection::new(opts.clone(), Estimator::Ols).estimate(&data, &bare).unwrap();
        let tsls = IvProjection::new(opts, Estimator::TwoStageLeastSquares)
            .estimate(&data, &instrumented)
            .unwrap();
        for (a, b) in ols.bands.mean.iter().zip(tsls.bands.mean.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
        for (a, b) in ols.bands.upper.iter().zip(tsls.bands.upper.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}
