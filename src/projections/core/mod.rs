//! core — shared local-projection data, options, designs and identification.
//!
//! Purpose
//! -------
//! Collect the building blocks every projection model uses: validated data
//! containers, immutable options, lagged design matrices, smooth-transition
//! regime weights (with the HP filter), information-criterion lag selection,
//! recursive shock identification and the impulse-response containers.
//! Model code in `projections::models` only orchestrates these pieces.
//!
//! Key behaviors
//! -------------
//! - [`LPData`] / [`ExternalShock`] validate input once; nothing downstream
//!   re-checks finiteness or alignment.
//! - [`LagMatrixBuilder`] builds one [`LagMatrix`] per lag order with an
//!   explicit [`DesignLayout`], shared read-only across worker threads.
//! - [`RegimeWeights`] maps a switching series to transition weights;
//!   [`hp_filter`] provides the optional detrending.
//! - [`LagSelector`] picks lag orders by [`InfoCriterion`].
//! - [`residual_covariance`] and [`ShockMatrix`] produce the recursive impact
//!   matrix.
//! - [`IrfBands`], [`LinearIrf`] and [`NonlinearIrf`] carry the results.
//!
//! Invariants & assumptions
//! ------------------------
//! - All blocks share the endogenous calendar index; row `i` of a design is
//!   calendar index `start + i`.
//! - Response arrays are indexed `[response, horizon, shock]` with horizon 0
//!   the impact response.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout. Lags are ordered most recent first.
//! - This module performs no logging and no threading; both live in the
//!   model and scheduler layers.
//!
//! Testing notes
//! -------------
//! - Every submodule carries unit tests for its formulas and error paths;
//!   full pipelines are exercised by the integration tests under `tests/`.

pub mod data;
pub mod design;
pub mod hp_filter;
pub mod identification;
pub mod options;
pub mod results;
pub mod selection;
pub mod switching;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{ExternalShock, LPData};
pub use self::design::{DesignLayout, HorizonView, LagMatrix, LagMatrixBuilder};
pub use self::hp_filter::{hp_filter, HpDecomposition};
pub use self::identification::{residual_covariance, ShockMatrix};
pub use self::options::{
    HpSwitch, LPOptions, LagSpec, RegimeOptions, ShockType, Trend, DEFAULT_CONFINT,
};
pub use self::results::{gather, Gathered, IrfBands, LinearIrf, NonlinearIrf, ShockResponse};
pub use self::selection::{InfoCriterion, LagSelector};
pub use self::switching::{transition, RegimeWeights};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::data::{ExternalShock, LPData};
    pub use super::options::{HpSwitch, LPOptions, LagSpec, RegimeOptions, ShockType, Trend};
    pub use super::results::{IrfBands, LinearIrf, NonlinearIrf};
    pub use super::selection::InfoCriterion;
    pub use super::switching::RegimeWeights;
}
