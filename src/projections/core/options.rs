//! Local-projection options — one immutable configuration per estimation call.
//!
//! Purpose
//! -------
//! Collect every configuration knob of a local-projection run in typed,
//! validated values: endogenous lag policy (fixed order or information
//! criterion), exogenous lag order, deterministic trend, horizon count,
//! confidence multiplier, shock normalization, HAC settings, worker count,
//! an optional externally supplied residual covariance, and the
//! smooth-transition parameters of two-regime models.
//!
//! Key behaviors
//! -------------
//! - [`LPOptions::new`] validates the mandatory fields; `with_*` setters
//!   validate their own argument and return a new value, so a constructed
//!   `LPOptions` is always admissible and never mutated by estimation code.
//! - [`LagSpec`] makes "fixed lag order" and "criterion search" mutually
//!   exclusive by construction.
//! - [`LPOptions::with_confidence_level`] converts a two-sided coverage level
//!   into a normal quantile with `statrs`.
//! - [`RegimeOptions`] holds γ and the HP switch for two-regime models.
//!
//! Invariants & assumptions
//! ------------------------
//! - `horizons ≥ 1`; `confint` finite and `≥ 0`; criterion `max_lags ≥ 1`;
//!   `num_threads ≥ 1` when set; γ finite and `> 0`; λ finite and `> 0`.
//! - Integer encodings used by option layers: trend `0/1/2`, shock type
//!   `0` (standard deviation) / `1` (unit).
//!
//! Testing notes
//! -------------
//! - Unit tests cover defaults, every validation branch, the integer
//!   encodings, and the confidence-level conversion.
use crate::{
    inference::hac::HACOptions,
    projections::{
        core::selection::InfoCriterion,
        errors::{LPError, LPResult},
    },
};
use ndarray::Array2;
use statrs::distribution::{ContinuousCDF, Normal};

/// Endogenous lag policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LagSpec {
    /// Fixed lag order `p` for every horizon and equation.
    Fixed(usize),
    /// Choose `p ∈ 1..=max_lags` per horizon and equation.
    Criterion { criterion: InfoCriterion, max_lags: usize },
}

impl LagSpec {
    /// Lag orders for which a design matrix must be built.
    pub fn candidates(&self) -> Vec<usize> {
        match *self {
            LagSpec::Fixed(p) => vec![p],
            LagSpec::Criterion { max_lags, .. } => (1..=max_lags).collect(),
        }
    }
}

/// Deterministic terms: constant, plus optional linear and quadratic trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    /// Constant only.
    None,
    /// Constant and linear trend.
    Linear,
    /// Constant, linear and quadratic trend.
    Quadratic,
}

impl Trend {
    /// Decode the `0/1/2` encoding.
    pub fn from_order(order: usize) -> LPResult<Trend> {
        match order {
            0 => Ok(Trend::None),
            1 => Ok(Trend::Linear),
            2 => Ok(Trend::Quadratic),
            _ => Err(LPError::InvalidConfig { param: "trend", reason: "must be 0, 1 or 2" }),
        }
    }

    /// Number of deterministic columns.
    pub fn n_terms(&self) -> usize {
        match self {
            Trend::None => 1,
            Trend::Linear => 2,
            Trend::Quadratic => 3,
        }
    }
}

/// Normalization of recursive (Cholesky) shocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShockType {
    /// One-standard-deviation shock: columns of the Cholesky factor.
    StdDev,
    /// Unit shock: each Cholesky column scaled so its own impact is 1.
    Unit,
}

impl ShockType {
    /// Decode the `0` (standard deviation) / `1` (unit) encoding.
    pub fn from_order(order: usize) -> LPResult<ShockType> {
        match order {
            0 => Ok(ShockType::StdDev),
            1 => Ok(ShockType::Unit),
            _ => Err(LPError::InvalidConfig { param: "shock_type", reason: "must be 0 or 1" }),
        }
    }
}

/// Default confidence multiplier (two-sided 95% normal band).
pub const DEFAULT_CONFINT: f64 = 1.96;

/// LPOptions — validated configuration for one local-projection call.
///
/// Fields
/// ------
/// - `lags`: [`LagSpec`]
///   Endogenous lag order or criterion search.
/// - `exog_lags`: `usize`
///   Lags `1..=exog_lags` of each exogenous column (0 drops the block).
/// - `trend`: [`Trend`]
///   Deterministic terms.
/// - `horizons`: `usize`
///   Number of horizons after impact; results hold `horizons + 1` columns.
/// - `confint`: `f64`
///   Band half-width multiplier on the HAC standard error.
/// - `shock_type`: [`ShockType`]
///   Normalization of recursive shocks (ignored by IV models).
/// - `hac`: [`HACOptions`]
///   HAC kernel / truncation policy for every regression.
/// - `num_threads`: `Option<usize>`
///   Worker count; `None` means `min(#shocks, available cores)`.
/// - `residual_covariance`: `Option<Array2<f64>>`
///   Externally estimated reduced-form residual covariance; `None` means the
///   crate estimates it from a horizon-0 projection.
#[derive(Debug, Clone, PartialEq)]
pub struct LPOptions {
    pub lags: LagSpec,
    pub exog_lags: usize,
    pub trend: Trend,
    pub horizons: usize,
    pub confint: f64,
    pub shock_type: ShockType,
    pub hac: HACOptions,
    pub num_threads: Option<usize>,
    pub residual_covariance: Option<Array2<f64>>,
}

impl LPOptions {
    /// Construct options with defaults for every optional field.
    ///
    /// Defaults: no exogenous lags, constant only, `confint = 1.96`,
    /// standard-deviation shocks, [`HACOptions::default`], automatic worker
    /// count, estimated residual covariance.
    ///
    /// # Errors
    /// - [`LPError::InvalidConfig`] if `horizons == 0` or a criterion search
    ///   has `max_lags == 0`.
    pub fn new(lags: LagSpec, horizons: usize) -> LPResult<LPOptions> {
        if horizons == 0 {
            return Err(LPError::InvalidConfig { param: "horizons", reason: "must be at least 1" });
        }
        if let LagSpec::Criterion { max_lags: 0, .. } = lags {
            return Err(LPError::InvalidConfig {
                param: "max_lags",
                reason: "criterion search needs at least one candidate lag",
            });
        }
        Ok(LPOptions {
            lags,
            exog_lags: 0,
            trend: Trend::None,
            horizons,
            confint: DEFAULT_CONFINT,
            shock_type: ShockType::StdDev,
            hac: HACOptions::default(),
            num_threads: None,
            residual_covariance: None,
        })
    }

    pub fn with_exog_lags(mut self, exog_lags: usize) -> LPOptions {
        self.exog_lags = exog_lags;
        self
    }

    pub fn with_trend(mut self, trend: Trend) -> LPOptions {
        self.trend = trend;
        self
    }

    pub fn with_shock_type(mut self, shock_type: ShockType) -> LPOptions {
        self.shock_type = shock_type;
        self
    }

    pub fn with_hac(mut self, hac: HACOptions) -> LPOptions {
        self.hac = hac;
        self
    }

    /// Set the band multiplier directly.
    ///
    /// # Errors
    /// - [`LPError::InvalidConfig`] unless `confint` is finite and `≥ 0`.
    pub fn with_confint(mut self, confint: f64) -> LPResult<LPOptions> {
        if !confint.is_finite() || confint < 0.0 {
            return Err(LPError::InvalidConfig {
                param: "confint",
                reason: "must be finite and non-negative",
            });
        }
        self.confint = confint;
        Ok(self)
    }

    /// Set the band multiplier from a two-sided coverage level in `(0, 1)`,
    /// e.g. `0.9` → `1.6449`.
    pub fn with_confidence_level(self, level: f64) -> LPResult<LPOptions> {
        if !(level > 0.0 && level < 1.0) {
            return Err(LPError::InvalidConfig {
                param: "confidence_level",
                reason: "must lie strictly between 0 and 1",
            });
        }
        let normal = Normal::new(0.0, 1.0).map_err(|_| LPError::InvalidConfig {
            param: "confidence_level",
            reason: "standard normal could not be constructed",
        })?;
        self.with_confint(normal.inverse_cdf(0.5 + level / 2.0))
    }

    /// Fix the worker count.
    pub fn with_num_threads(mut self, num_threads: usize) -> LPResult<LPOptions> {
        if num_threads == 0 {
            return Err(LPError::InvalidConfig { param: "num_threads", reason: "must be at least 1" });
        }
        self.num_threads = Some(num_threads);
        Ok(self)
    }

    /// Supply the reduced-form residual covariance instead of estimating it.
    ///
    /// Only shape and finiteness are checked here; positive definiteness is
    /// checked when the Cholesky factor is taken.
    pub fn with_residual_covariance(mut self, sigma: Array2<f64>) -> LPResult<LPOptions> {
        if sigma.nrows() != sigma.ncols() || sigma.nrows() == 0 {
            return Err(LPError::InvalidConfig {
                param: "residual_covariance",
                reason: "must be a non-empty square matrix",
            });
        }
        if sigma.iter().any(|v| !v.is_finite()) {
            return Err(LPError::InvalidConfig {
                param: "residual_covariance",
                reason: "must contain only finite values",
            });
        }
        self.residual_covariance = Some(sigma);
        Ok(self)
    }
}

/// How the switching series is turned into the transition input `z*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HpSwitch {
    /// Use the switching series as given.
    Raw,
    /// Use the standardized HP-filter cycle with smoothing weight `lambda`.
    Filtered { lambda: f64 },
}

/// RegimeOptions — smooth-transition parameters of two-regime models.
///
/// `gamma` is the steepness of the logistic transition
/// `f(z) = exp(−γz) / (1 + exp(−γz))`; `hp` selects the transition input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeOptions {
    pub gamma: f64,
    pub hp: HpSwitch,
}

impl RegimeOptions {
    /// # Errors
    /// - [`LPError::InvalidRegimeParam`] if γ, or λ when filtering, is not
    ///   finite and strictly positive.
    pub fn new(gamma: f64, hp: HpSwitch) -> LPResult<RegimeOptions> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(LPError::InvalidRegimeParam { param: "gamma", value: gamma });
        }
        if let HpSwitch::Filtered { lambda } = hp {
            if !lambda.is_finite() || lambda <= 0.0 {
                return Err(LPError::InvalidRegimeParam { param: "lambda", value: lambda });
            }
        }
        Ok(RegimeOptions { gamma, hp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `LPOptions::new` fills the documented defaults.
    fn new_sets_documented_defaults() {
        let opts = LPOptions::new(LagSpec::Fixed(2), 10).unwrap();
        assert_eq!(opts.exog_lags, 0);
        assert_eq!(opts.trend, Trend::None);
        assert_eq!(opts.confint, DEFAULT_CONFINT);
        assert_eq!(opts.shock_type, ShockType::StdDev);
        assert_eq!(opts.hac, HACOptions::default());
        assert!(opts.num_threads.is_none());
        assert!(opts.residual_covariance.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Mandatory fields are validated.
    fn new_rejects_invalid_horizons_and_max_lags() {
        assert!(LPOptions::new(LagSpec::Fixed(1), 0).is_err());
        let crit = LagSpec::Criterion { criterion: InfoCriterion::Aic, max_lags: 0 };
        assert!(LPOptions::new(crit, 5).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Setters validate their arguments.
    fn setters_validate_arguments() {
        let opts = LPOptions::new(LagSpec::Fixed(1), 4).unwrap();
        assert!(opts.clone().with_confint(-0.1).is_err());
        assert!(opts.clone().with_confint(f64::NAN).is_err());
        assert!(opts.clone().with_num_threads(0).is_err());
        assert!(opts.clone().with_residual_covariance(array![[1.0, 0.0]]).is_err());
        assert!(opts.clone().with_confidence_level(1.0).is_err());
        assert_eq!(opts.with_confint(0.0).unwrap().confint, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A 95% level maps to the 97.5% normal quantile.
    fn confidence_level_maps_to_normal_quantile() {
        let opts = LPOptions::new(LagSpec::Fixed(1), 4).unwrap().with_confidence_level(0.95).unwrap();
        assert_relative_eq!(opts.confint, 1.959963984540054, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Integer encodings decode and out-of-range codes fail.
    fn integer_encodings() {
        assert_eq!(Trend::from_order(2).unwrap().n_terms(), 3);
        assert!(Trend::from_order(3).is_err());
        assert_eq!(ShockType::from_order(1).unwrap(), ShockType::Unit);
        assert!(ShockType::from_order(2).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Candidate orders: one for fixed, 1..=max for criterion search.
    fn lag_spec_candidates() {
        assert_eq!(LagSpec::Fixed(3).candidates(), vec![3]);
        let crit = LagSpec::Criterion { criterion: InfoCriterion::Bic, max_lags: 4 };
        assert_eq!(crit.candidates(), vec![1, 2, 3, 4]);
    }

    #[test]
    // Purpose
    // -------
    // γ and λ must be strictly positive.
    fn regime_options_validate() {
        assert!(RegimeOptions::new(0.0, HpSwitch::Raw).is_err());
        assert!(RegimeOptions::new(3.0, HpSwitch::Filtered { lambda: -1.0 }).is_err());
        assert!(RegimeOptions::new(3.0, HpSwitch::Filtered { lambda: 1600.0 }).is_ok());
    }
}
