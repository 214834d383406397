//! Projection model internals — candidate designs, lag resolution, shock
//! identification and per-equation fits shared by every model.
//!
//! Purpose
//! -------
//! Keep the plumbing common to the linear, IV and two-regime models in one
//! place: building the candidate designs before tasks are scattered, resolving
//! the design for one `(response, shift)` pair, estimating the recursive
//! impact matrix, and running one HAC regression with error context.
//!
//! Key behaviors
//! -------------
//! - [`CandidateDesigns::build`] builds one [`LagMatrix`] per candidate lag
//!   order and checks that the furthest horizon is estimable, including the
//!   minimum sample of the information criterion. Under a criterion search,
//!   orders that do not fit the sample are dropped as long as the smallest
//!   one fits, and the order of every `(response, shift)` pair is resolved
//!   once, before any task runs.
//! - [`CandidateDesigns::design`] returns the fixed design or the one
//!   selected for that response and shift.
//! - [`identify`] returns the impact matrix from the supplied residual
//!   covariance or from a linear horizon-0 projection; under a criterion
//!   search the reduced form uses the largest order selected at shift 0.
//! - [`fit_equation`] slices a design at one shift and fits one response.
//!
//! Invariants & assumptions
//! ------------------------
//! - Candidate designs and their selections are immutable after construction
//!   and shared read-only by worker tasks.
//! - Everything here runs either before scattering (errors abort the call) or
//!   inside one shock task (errors fail that task only).
use crate::{
    inference::regression::{HacEstimator, HacFit, Instruments},
    projections::{
        core::{
            data::LPData,
            design::{LagMatrix, LagMatrixBuilder},
            identification::{residual_covariance, ShockMatrix},
            options::{LPOptions, LagSpec},
            selection::{InfoCriterion, LagSelector},
        },
        errors::{LPError, LPResult},
    },
};
use ndarray::Array2;

/// Designs for every candidate lag order of one estimation call.
///
/// Fields
/// ------
/// - `designs`: `Vec<LagMatrix>`
///   `designs[i]` holds the `i`-th candidate order (the single fixed order
///   when no search is requested).
/// - `selected`: `Option<Array2<usize>>`
///   Under a criterion search, the index into `designs` chosen for
///   `[response, shift]`, for shifts `0..=max_shift`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDesigns {
    designs: Vec<LagMatrix>,
    selected: Option<Array2<usize>>,
}

impl CandidateDesigns {
    /// Build the candidate designs, check that shift `max_shift` is
    /// estimable with the smallest order, and resolve criterion selections.
    ///
    /// # Errors
    /// - [`LPError::InsufficientData`] if the smallest order leaves too few
    ///   rows at `max_shift` for the regressors or for the criterion, or if
    ///   no candidate yields a finite criterion for some equation.
    pub fn build(
        builder: &LagMatrixBuilder<'_>, lags: &LagSpec, max_shift: usize,
    ) -> LPResult<CandidateDesigns> {
        let mut designs = Vec::new();
        for p in lags.candidates() {
            match builder.build(p) {
                Ok(design) => designs.push(design),
                Err(err) if designs.is_empty() => return Err(err),
                Err(_) => break,
            }
        }
        let smallest = designs.first().ok_or(LPError::InvalidConfig {
            param: "lags",
            reason: "no design matrix was built",
        })?;
        smallest.require_rows(max_shift)?;

        let selected = match *lags {
            LagSpec::Fixed(_) => None,
            LagSpec::Criterion { criterion, .. } => {
                let available = smallest.rows_at(max_shift);
                let required = criterion.min_rows(smallest.layout.ncols);
                if available < required {
                    return Err(LPError::InsufficientData {
                        available,
                        required,
                        reason: "the furthest horizon leaves too few rows for the information criterion",
                    });
                }
                Some(select_orders(criterion, &designs, max_shift)?)
            }
        };
        Ok(CandidateDesigns { designs, selected })
    }

    /// Whether lag orders are chosen by an information criterion.
    pub fn is_search(&self) -> bool {
        self.selected.is_some()
    }

    /// Design used for `response` at horizon shift `shift`.
    ///
    /// # Errors
    /// - [`LPError::InvalidConfig`] if no selection was resolved for the pair.
    pub fn design(&self, response: usize, shift: usize) -> LPResult<&LagMatrix> {
        let idx = match &self.selected {
            None => 0,
            Some(selected) => *selected.get((response, shift)).ok_or(LPError::InvalidConfig {
                param: "horizons",
                reason: "no lag order was selected for this response and horizon",
            })?,
        };
        self.designs.get(idx).ok_or(LPError::InvalidConfig {
            param: "lags",
            reason: "no design matrix was built",
        })
    }
}

/// Criterion choice for every `(response, shift)` pair up to `max_shift`.
fn select_orders(
    criterion: InfoCriterion, designs: &[LagMatrix], max_shift: usize,
) -> LPResult<Array2<usize>> {
    let nvars = designs.first().map_or(0, |design| design.y.ncols());
    let selector = LagSelector::new(criterion, designs);
    let mut selected = Array2::<usize>::zeros((nvars, max_shift + 1));
    for shift in 0..=max_shift {
        for response in 0..nvars {
            selected[[response, shift]] = selector.select(response, shift)?;
        }
    }
    log::debug!(
        "local projections: {criterion:?} lag orders resolved for {nvars} response(s) over {} shift(s)",
        max_shift + 1
    );
    Ok(selected)
}

/// Impact matrix of the recursive shocks and the lag order of the reduced
/// form it was estimated from (`None` when the covariance was supplied).
///
/// `linear` are the linear candidate designs when the caller already has
/// them; otherwise they are built here.
pub fn identify(
    options: &LPOptions, data: &LPData, linear: Option<&CandidateDesigns>,
) -> LPResult<(ShockMatrix, Option<usize>)> {
    let nvars = data.nvars();
    if let Some(sigma) = &options.residual_covariance {
        return Ok((ShockMatrix::from_covariance(sigma, options.shock_type, nvars)?, None));
    }
    let built;
    let linear = match linear {
        Some(designs) => designs,
        None => {
            built = linear_candidates(options, data)?;
            &built
        }
    };
    let mut reduced_form = linear.design(0, 0)?;
    if linear.is_search() {
        for response in 1..nvars {
            let candidate = linear.design(response, 0)?;
            if candidate.layout.lags > reduced_form.layout.lags {
                reduced_form = candidate;
            }
        }
    }
    log::debug!("local projections: reduced form uses {} lag(s)", reduced_form.layout.lags);
    let sigma = residual_covariance(reduced_form)?;
    let shocks = ShockMatrix::from_covariance(&sigma, options.shock_type, nvars)?;
    Ok((shocks, Some(reduced_form.layout.lags)))
}

/// Linear candidate designs used only for identification.
pub fn linear_candidates(options: &LPOptions, data: &LPData) -> LPResult<CandidateDesigns> {
    let builder = LagMatrixBuilder::new(data, options.trend, options.exog_lags);
    CandidateDesigns::build(&builder, &options.lags, 0)
}

/// Reject designs without endogenous lags where responses are read off the
/// first-lag coefficients.
pub fn require_endogenous_lags(lags: &LagSpec) -> LPResult<()> {
    if let LagSpec::Fixed(0) = lags {
        return Err(LPError::InvalidConfig {
            param: "lags",
            reason: "recursive identification needs at least one endogenous lag",
        });
    }
    Ok(())
}

/// Fit `response` on `design` at horizon shift `shift`.
///
/// Singular designs are reported as [`LPError::SingularDesign`] with the
/// output `horizon` and `regime` attached.
pub fn fit_equation(
    estimator: &HacEstimator, design: &LagMatrix, response: usize, shift: usize, horizon: usize,
    regime: Option<usize>,
) -> LPResult<HacFit> {
    let view = design.at_horizon(shift)?;
    let shock_cols = design.layout.shock_columns();
    let instruments = view.z.map(|matrix| Instruments { matrix, endogenous: &shock_cols });
    estimator
        .fit(view.y.column(response), view.x, instruments, shift)
        .map_err(|err| LPError::from_fit(err, horizon, response, regime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::core::options::Trend;
    use ndarray::Array2;

    fn data(nobs: usize) -> LPData {
        let mut state = 11u64;
        let endog = Array2::from_shape_fn((nobs, 2), |_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        });
        LPData::new(endog, None).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Criterion search drops orders the sample cannot hold but keeps the rest.
    fn criterion_candidates_stop_at_sample_limit() {
        let data = data(6);
        let builder = LagMatrixBuilder::new(&data, Trend::None, 0);
        let lags = LagSpec::Criterion { criterion: InfoCriterion::Aic, max_lags: 8 };
        let designs = CandidateDesigns::build(&builder, &lags, 0).unwrap();
        assert_eq!(designs.designs.len(), 4);
        assert!(designs.is_search());
    }

    #[test]
    // Purpose
    // -------
    // Criterion selections are resolved once at construction and agree with
    // a direct search.
    //
    // Given
    // -----
    // - Two variables, 80 observations, BIC over 1..=3, shifts 0..=4.
    //
    // Expect
    // ------
    // - One selection per `[response, shift]`; each equals the selector's
    //   choice; shifts beyond the resolved range are rejected.
    fn criterion_selections_are_resolved_up_front() {
        let data = data(80);
        let builder = LagMatrixBuilder::new(&data, Trend::None, 0);
        let lags = LagSpec::Criterion { criterion: InfoCriterion::Bic, max_lags: 3 };
        let designs = CandidateDesigns::build(&builder, &lags, 4).unwrap();

        let selected = designs.selected.as_ref().unwrap();
        assert_eq!(selected.dim(), (2, 5));
        let selector = LagSelector::new(InfoCriterion::Bic, &designs.designs);
        for shift in 0..=4 {
            for response in 0..2 {
                let idx = selector.select(response, shift).unwrap();
                assert_eq!(selected[[response, shift]], idx);
                assert_eq!(designs.design(response, shift).unwrap().layout.lags, idx + 1);
            }
        }
        assert!(matches!(designs.design(0, 5), Err(LPError::InvalidConfig { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A sample that holds the regressors but not the criterion at the
    // furthest horizon is rejected before any task runs.
    //
    // Given
    // -----
    // - T = 13, one variable, AICc over 1..=2, furthest shift 9: the smallest
    //   order leaves 3 rows for a constant and one lag (AICc needs 4).
    //
    // Expect
    // ------
    // - `InsufficientData { available: 3, required: 4 }`; BIC (needs 3)
    //   builds.
    fn criterion_minimum_sample_checked_at_furthest_horizon() {
        let endog = Array2::from_shape_fn((13, 1), |(t, _)| (1.3 * t as f64).sin());
        let data = LPData::new(endog, None).unwrap();
        let builder = LagMatrixBuilder::new(&data, Trend::None, 0);

        let aicc = LagSpec::Criterion { criterion: InfoCriterion::Aicc, max_lags: 2 };
        let err = CandidateDesigns::build(&builder, &aicc, 9).unwrap_err();
        assert!(matches!(err, LPError::InsufficientData { available: 3, required: 4, .. }));

        let bic = LagSpec::Criterion { criterion: InfoCriterion::Bic, max_lags: 2 };
        assert!(CandidateDesigns::build(&builder, &bic, 9).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A fixed order that leaves too few rows at the last horizon is rejected
    // before any task runs.
    fn fixed_order_checks_furthest_horizon() {
        let data = data(12);
        let builder = LagMatrixBuilder::new(&data, Trend::None, 0);
        let err = CandidateDesigns::build(&builder, &LagSpec::Fixed(3), 6).unwrap_err();
        assert!(matches!(err, LPError::InsufficientData { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A supplied covariance bypasses estimation; p = 0 is rejected for
    // recursive identification.
    fn identify_uses_supplied_covariance() {
        let data = data(40);
        let sigma = ndarray::array![[1.0, 0.3], [0.3, 2.0]];
        let opts = LPOptions::new(LagSpec::Fixed(1), 4).unwrap().with_residual_covariance(sigma).unwrap();
        let (shocks, lag) = identify(&opts, &data, None).unwrap();
        assert_eq!(lag, None);
        assert!((shocks.matrix[[0, 0]] - 1.0).abs() < 1e-12);
        assert!(require_endogenous_lags(&LagSpec::Fixed(0)).is_err());
    }
}
