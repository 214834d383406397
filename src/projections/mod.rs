//! projections — local-projection impulse responses: core, models, scheduling
//! and errors.
//!
//! Purpose
//! -------
//! Provide the complete local-projection stack under one namespace: validated
//! data and options, lagged designs, lag-order selection, smooth-transition
//! regime weights, recursive identification, HAC-based estimation per
//! horizon, and the caller-scoped worker pool that runs one task per shock.
//!
//! Key behaviors
//! -------------
//! - [`core`] holds the building blocks (data, options, designs, selection,
//!   regime weights, identification, result containers).
//! - [`models`] exposes [`LinearProjection`], [`IvProjection`],
//!   [`NonlinearProjection`] and [`NonlinearIvProjection`].
//! - [`scheduler`] runs per-shock tasks on a `rayon` pool scoped to the call.
//! - [`errors`] defines [`LPError`], [`LPResult`] and [`ShockFailure`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs contain no missing values; all blocks share one calendar index.
//! - Estimation never mutates its inputs; the same data and options can be
//!   estimated concurrently from several threads.
//!
//! Conventions
//! -----------
//! - Responses are `[response, horizon, shock]` with `H + 1` horizons
//!   (index 0 = impact).
//! - Logging goes through the `log` facade (`debug` for pool sizing and
//!   reduced-form lag orders, `warn` for failed shock tasks); no logger is
//!   installed here.
//!
//! Downstream usage
//! ----------------
//! ```ignore
//! use rust_local_projections::projections::prelude::*;
//!
//! let data = LPData::new(endog, None)?;
//! let options = LPOptions::new(LagSpec::Fixed(4), 12)?.with_shock_type(ShockType::Unit);
//! let irf = LinearProjection::new(options).estimate(&data)?;
//! ```

pub mod core;
pub mod errors;
pub mod models;
pub mod scheduler;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    ExternalShock, HpSwitch, InfoCriterion, IrfBands, LPData, LPOptions, LagSpec, LinearIrf,
    NonlinearIrf, RegimeOptions, RegimeWeights, ShockType, Trend,
};
pub use self::errors::{LPError, LPResult, ShockFailure};
pub use self::models::{IvProjection, LinearProjection, NonlinearIvProjection, NonlinearProjection};
pub use self::scheduler::ShockPool;

pub mod prelude {
    pub use super::core::prelude::*;
    pub use super::errors::{LPError, LPResult, ShockFailure};
    pub use super::models::prelude::*;
    pub use crate::inference::prelude::{Estimator, HACOptions, HacBandwidth, KernelType};
}
