//! State-dependent local projections with smooth-transition regimes.
//!
//! Purpose
//! -------
//! Estimate separate impulse responses for two regimes whose weights come
//! from a logistic transition of a switching series, either with recursive
//! shocks ([`NonlinearProjection`]) or with an external shock
//! ([`NonlinearIvProjection`]).
//!
//! Key behaviors
//! -------------
//! - One regression per `(horizon, response)` on the joint design
//!   `[deterministic | shock·(1−f) | shock·f | lags·(1−f) | lags·f | exog | contemp]`
//!   with `f` lagged one period; both regimes are read off the same fit.
//! - Recursive shocks: `IR_r(0) = d_j`, `IR_r(h) = B_r d_j` for `h ≥ 1`
//!   (shift `h − 1`), with `B_r` the regime-`r` first-lag block. The impact
//!   matrix comes from a linear reduced form unless supplied.
//! - External shock: for `h = 0..=H` (shift `h`) the regime responses are
//!   the two weighted shock coefficients; 2SLS instruments are weighted the
//!   same way as the shock.
//!
//! Invariants & assumptions
//! ------------------------
//! - The switching series is aligned with the data; weights lie in `(0, 1)`.
//! - Recursive identification needs at least one endogenous lag.
//!
//! Conventions
//! -----------
//! - Regime 1 is weighted by `1 − f`, regime 2 by `f`; with
//!   `f(z) = exp(−γz)/(1 + exp(−γz))`, large `z` favors regime 1.
use crate::{
    inference::regression::{Estimator, HacEstimator},
    projections::{
        core::{
            data::{validate_series, ExternalShock, LPData},
            design::LagMatrixBuilder,
            identification::ShockMatrix,
            options::{LPOptions, RegimeOptions},
            results::{gather, NonlinearIrf, ShockResponse},
            switching::RegimeWeights,
        },
        errors::{LPError, LPResult},
        models::model_internals::{
            fit_equation, identify, require_endogenous_lags, CandidateDesigns,
        },
        scheduler::ShockPool,
    },
};
use ndarray::Array1;

/// Per-shock outputs of both regimes.
type RegimePair = [ShockResponse; 2];

/// NonlinearProjection — two-regime projections with recursive shocks.
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearProjection {
    pub options: LPOptions,
    pub regime: RegimeOptions,
}

impl NonlinearProjection {
    pub fn new(options: LPOptions, regime: RegimeOptions) -> NonlinearProjection {
        NonlinearProjection { options, regime }
    }

    /// Estimate regime responses `[response, horizon, shock]` for all `K`
    /// shocks.
    ///
    /// # Errors
    /// Configuration, alignment, sample-size and identification errors abort
    /// the call; per-shock estimation errors are returned in
    /// [`NonlinearIrf::failures`].
    pub fn estimate(&self, data: &LPData, switching: &Array1<f64>) -> LPResult<NonlinearIrf> {
        let opts = &self.options;
        require_endogenous_lags(&opts.lags)?;
        validate_series("switching", switching, data.nobs())?;
        let nvars = data.nvars();

        let weights = RegimeWeights::new(switching, &self.regime)?;
        let builder =
            LagMatrixBuilder::new(data, opts.trend, opts.exog_lags).with_regimes(&weights);
        let designs = CandidateDesigns::build(&builder, &opts.lags, opts.horizons - 1)?;
        let (shocks, impact_lags) = identify(opts, data, None)?;
        let estimator = HacEstimator::new(Estimator::Ols, opts.hac);

        let pool = ShockPool::new(nvars, opts.num_threads)?;
        let outcomes = pool.scatter(|shock| {
            recursive_task(opts, &estimator, &designs, &shocks, shock, impact_lags.unwrap_or(0))
        });

        Ok(assemble(
            outcomes,
            nvars,
            designs.is_search(),
            Some(shocks.matrix),
            weights,
            data,
            opts,
            self.regime,
        ))
    }
}

/// NonlinearIvProjection — two-regime projections on an external shock.
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearIvProjection {
    pub options: LPOptions,
    pub regime: RegimeOptions,
    pub estimator: Estimator,
}

impl NonlinearIvProjection {
    pub fn new(
        options: LPOptions, regime: RegimeOptions, estimator: Estimator,
    ) -> NonlinearIvProjection {
        NonlinearIvProjection { options, regime, estimator }
    }

    /// Estimate regime responses `[response, horizon, 0]` to `shock`.
    pub fn estimate(
        &self, data: &LPData, shock: &ExternalShock, switching: &Array1<f64>,
    ) -> LPResult<NonlinearIrf> {
        let opts = &self.options;
        validate_series("shock", &shock.shock, data.nobs())?;
        validate_series("switching", switching, data.nobs())?;
        let nvars = data.nvars();

        let weights = RegimeWeights::new(switching, &self.regime)?;
        let two_stage = self.estimator == Estimator::TwoStageLeastSquares;
        let builder = LagMatrixBuilder::new(data, opts.trend, opts.exog_lags)
            .with_shock(shock, two_stage)
            .with_regimes(&weights);
        let designs = CandidateDesigns::build(&builder, &opts.lags, opts.horizons)?;
        let estimator = HacEstimator::new(self.estimator, opts.hac);

        let pool = ShockPool::new(1, opts.num_threads)?;
        let outcomes = pool.scatter(|_| external_task(opts, &estimator, &designs, nvars));

        Ok(assemble(outcomes, nvars, designs.is_search(), None, weights, data, opts, self.regime))
    }
}

fn recursive_task(
    opts: &LPOptions, estimator: &HacEstimator, designs: &CandidateDesigns, shocks: &ShockMatrix,
    shock: usize, impact_lags: usize,
) -> LPResult<RegimePair> {
    let impact = shocks.impact(shock);
    let nvars = impact.len();
    let mut out = [
        ShockResponse::new(nvars, opts.horizons + 1),
        ShockResponse::new(nvars, opts.horizons + 1),
    ];
    for regime in out.iter_mut() {
        for response in 0..nvars {
            regime.set(response, 0, impact[response], 0.0, opts.confint);
            regime.lags[[response, 0]] = impact_lags;
        }
    }

    for horizon in 1..=opts.horizons {
        let shift = horizon - 1;
        for response in 0..nvars {
            let design = designs.design(response, shift)?;
            let fit = fit_equation(estimator, design, response, shift, horizon, None)?;
            for (r, regime) in out.iter_mut().enumerate() {
                let cols = design.layout.first_lag(r).ok_or(LPError::InvalidConfig {
                    param: "lags",
                    reason: "recursive identification needs at least one endogenous lag",
                })?;
                let (coefs, cov) = fit.block(cols.start, nvars);
                let mean = coefs.dot(&impact);
                let variance = impact.dot(&cov.dot(&impact));
                regime.set(response, horizon, mean, variance.max(0.0).sqrt(), opts.confint);
                regime.lags[[response, horizon]] = design.layout.lags;
            }
        }
    }
    Ok(out)
}

fn external_task(
    opts: &LPOptions, estimator: &HacEstimator, designs: &CandidateDesigns, nvars: usize,
) -> LPResult<RegimePair> {
    let mut out = [
        ShockResponse::new(nvars, opts.horizons + 1),
        ShockResponse::new(nvars, opts.horizons + 1),
    ];
    for horizon in 0..=opts.horizons {
        for response in 0..nvars {
            let design = designs.design(response, horizon)?;
            let fit = fit_equation(estimator, design, response, horizon, horizon, None)?;
            for (r, regime) in out.iter_mut().enumerate() {
                let col = design.layout.shock_column(r).ok_or(LPError::InvalidConfig {
                    param: "shock",
                    reason: "design has no regime shock column",
                })?;
                regime.set(response, horizon, fit.beta[col], fit.std_error(col), opts.confint);
                regime.lags[[response, horizon]] = design.layout.lags;
            }
        }
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    outcomes: Vec<LPResult<RegimePair>>, nvars: usize, search: bool,
    shock_matrix: Option<ndarray::Array2<f64>>, weights: RegimeWeights, data: &LPData,
    opts: &LPOptions, regime: RegimeOptions,
) -> NonlinearIrf {
    let mut first = Vec::with_capacity(outcomes.len());
    let mut second = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok([one, two]) => {
                first.push(Ok(one));
                second.push(Ok(two));
            }
            Err(err) => {
                first.push(Err(err.clone()));
                second.push(Err(err));
            }
        }
    }
    let regime1 = gather(nvars, opts.horizons + 1, first);
    let regime2 = gather(nvars, opts.horizons + 1, second);

    NonlinearIrf {
        regime1: regime1.bands,
        regime2: regime2.bands,
        weights,
        selected_lags: search.then_some(regime1.lags),
        shock_matrix,
        failures: regime1.failures,
        names: data.names.clone(),
        options: opts.clone(),
        regime,
    }
}
