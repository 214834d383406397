//! Linear local projections with recursive (Cholesky) identification.
//!
//! Purpose
//! -------
//! Estimate the responses of every endogenous variable to every structural
//! shock identified by the Cholesky ordering of the variables, with HAC
//! confidence bands.
//!
//! Key behaviors
//! -------------
//! - Horizon 0 is the impact vector `d_s` (column `s` of the shock matrix)
//!   with collapsed bands.
//! - Horizon `h ≥ 1` regresses `y_{t+h−1}` on the design dated `t`; with
//!   first-lag coefficients `b` and their covariance block `V`, the response
//!   is `b·d_s` and its standard error `sqrt(d_sᵀ V d_s)`.
//! - One task per shock runs on a [`ShockPool`]; a failing task leaves its
//!   shock NaN and is reported in [`LinearIrf::failures`].
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one endogenous lag is required (`LagSpec::Fixed(0)` is a
//!   configuration error).
//! - The furthest horizon uses shift `H − 1`.
use crate::{
    inference::regression::{Estimator, HacEstimator},
    projections::{
        core::{
            data::LPData,
            design::LagMatrixBuilder,
            identification::ShockMatrix,
            options::LPOptions,
            results::{gather, LinearIrf, ShockResponse},
        },
        errors::{LPError, LPResult},
        models::model_internals::{
            fit_equation, identify, require_endogenous_lags, CandidateDesigns,
        },
        scheduler::ShockPool,
    },
};

/// LinearProjection — recursive-identification local projections.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProjection {
    pub options: LPOptions,
}

impl LinearProjection {
    pub fn new(options: LPOptions) -> LinearProjection {
        LinearProjection { options }
    }

    /// Estimate responses `[response, horizon, shock]` for all `K` shocks.
    ///
    /// # Errors
    /// Configuration, sample-size and identification errors abort the call;
    /// per-shock estimation errors are returned in [`LinearIrf::failures`].
    pub fn estimate(&self, data: &LPData) -> LPResult<LinearIrf> {
        let opts = &self.options;
        require_endogenous_lags(&opts.lags)?;
        let nvars = data.nvars();
        let nhorizons = opts.horizons + 1;

        let builder = LagMatrixBuilder::new(data, opts.trend, opts.exog_lags);
        let designs = CandidateDesigns::build(&builder, &opts.lags, opts.horizons - 1)?;
        let (shocks, impact_lags) = identify(opts, data, Some(&designs))?;
        let estimator = HacEstimator::new(Estimator::Ols, opts.hac);

        let pool = ShockPool::new(nvars, opts.num_threads)?;
        let outcomes = pool.scatter(|shock| {
            shock_task(opts, &estimator, &designs, &shocks, shock, impact_lags.unwrap_or(0))
        });
        let gathered = gather(nvars, nhorizons, outcomes);

        Ok(LinearIrf {
            bands: gathered.bands,
            selected_lags: designs.is_search().then_some(gathered.lags),
            shock_matrix: Some(shocks.matrix),
            failures: gathered.failures,
            names: data.names.clone(),
            options: opts.clone(),
        })
    }
}

fn shock_task(
    opts: &LPOptions, estimator: &HacEstimator, designs: &CandidateDesigns, shocks: &ShockMatrix,
    shock: usize, impact_lags: usize,
) -> LPResult<ShockResponse> {
    let impact = shocks.impact(shock);
    let nvars = impact.len();
    let mut out = ShockResponse::new(nvars, opts.horizons + 1);
    for response in 0..nvars {
        out.set(response, 0, impact[response], 0.0, opts.confint);
        out.lags[[response, 0]] = impact_lags;
    }

    for horizon in 1..=opts.horizons {
        let shift = horizon - 1;
        for response in 0..nvars {
            let design = designs.design(response, shift)?;
            let fit = fit_equation(estimator, design, response, shift, horizon, None)?;
            let cols = design.layout.first_lag(0).ok_or(LPError::InvalidConfig {
                param: "lags",
                reason: "recursive identification needs at least one endogenous lag",
            })?;
            let (coefs, cov) = fit.block(cols.start, nvars);
            let mean = coefs.dot(&impact);
            let variance = impact.dot(&cov.dot(&impact));
            out.set(response, horizon, mean, variance.max(0.0).sqrt(), opts.confint);
            out.lags[[response, horizon]] = design.layout.lags;
        }
    }
    Ok(out)
}
