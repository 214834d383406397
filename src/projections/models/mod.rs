//! models — user-facing local-projection estimators.
//!
//! Purpose
//! -------
//! Expose the four estimators built on `projections::core`: linear
//! projections with recursive shocks, projections on an external (possibly
//! instrumented) shock, and the two-regime smooth-transition versions of
//! both. Each model owns its options, builds designs once, scatters one task
//! per shock on a [`crate::projections::scheduler::ShockPool`] and gathers
//! the results by shock index.
//!
//! Key behaviors
//! -------------
//! - [`LinearProjection`] / [`NonlinearProjection`]: Cholesky-identified
//!   shocks; responses built from first-lag coefficients and the impact
//!   matrix.
//! - [`IvProjection`] / [`NonlinearIvProjection`]: responses are the
//!   coefficients on the external shock, by OLS or 2SLS.
//! - Shared plumbing (candidate designs, lag resolution, identification,
//!   single-equation fits) lives in [`model_internals`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Errors found before tasks are scattered abort the call; errors inside a
//!   task leave that shock NaN and are reported as failures.
//! - Results do not depend on the worker count.

pub mod iv;
pub mod linear;
pub mod model_internals;
pub mod nonlinear;

pub use self::iv::IvProjection;
pub use self::linear::LinearProjection;
pub use self::nonlinear::{NonlinearIvProjection, NonlinearProjection};

pub mod prelude {
    pub use super::iv::IvProjection;
    pub use super::linear::LinearProjection;
    pub use super::nonlinear::{NonlinearIvProjection, NonlinearProjection};
}
