//! Kernel taps for HAC estimation.
//!
//! This module provides:
//! - A `KernelType` enum with common HAC tapers (IID, Bartlett/Newey–West, Parzen, QS).
//! - Per-lag weights `w(x)` where `x = k/(L+1)`.
//! - Name parsing via `FromStr` so option layers can accept `"bartlett"`,
//!   `"newey_west"`, `"parzen"`, `"qs"` and friends.
//!
//! Conventions:
//! - Local projections fix the truncation lag from the forecast horizon, so no
//!   data-driven bandwidth rule lives here; see [`crate::inference::hac::HacBandwidth`].
use std::str::FromStr;

/// HAC taper family.
///
/// - `IID`: no serial correlation; only `k=0` contributes (weight=1 at 0, else 0).
/// - `Bartlett`: triangular (Newey–West) kernel, compact support on |x|≤1.
/// - `Parzen`: smoother compact-support kernel with heavier down-weighting at high lags.
/// - `QuadraticSpectral`: infinite-support taper with high large-sample efficiency.
///
/// The taper argument is taken as `x = k/(L+1)` to avoid divide-by-zero at `k=L`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelType {
    IID,
    Bartlett,
    Parzen,
    QuadraticSpectral,
}

impl KernelType {
    /// Evaluate the kernel weight at the given taper argument.
    ///
    /// # Arguments
    /// - `input`: real number, typically `x = k/(L+1)` where `k` is the lag and `L` the bandwidth.
    ///
    /// # Returns
    /// Kernel value `w(x)`. For `IID`, returns 1.0 at `x=0` and 0.0 otherwise.
    pub fn weight(&self, input: f64) -> f64 {
        let abs_input = input.abs();
        match self {
            KernelType::IID => {
                if input == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            KernelType::Bartlett => {
                if abs_input <= 1.0 {
                    1.0 - abs_input
                } else {
                    0.0
                }
            }
            KernelType::Parzen => {
                if abs_input <= 0.5 {
                    let abs_input_squared = abs_input * abs_input;
                    1.0 - 6.0 * abs_input_squared + 6.0 * abs_input * abs_input_squared
                } else if abs_input <= 1.0 {
                    2.0 * (1.0 - abs_input).powi(3)
                } else {
                    0.0
                }
            }
            KernelType::QuadraticSpectral => {
                if input == 0.0 {
                    1.0
                } else {
                    let pi_x = std::f64::consts::PI * input;
                    let trig_input = 6.0 * pi_x / 5.0;
                    (25.0 / (12.0 * (pi_x.powi(2))))
                        * ((trig_input).sin() / trig_input - (trig_input).cos())
                }
            }
        }
    }
}

impl FromStr for KernelType {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "iid" | "white" => Ok(KernelType::IID),
            "bartlett" | "newey_west" => Ok(KernelType::Bartlett),
            "parzen" => Ok(KernelType::Parzen),
            "quadratic_spectral" | "quadraticspectral" | "qs" => Ok(KernelType::QuadraticSpectral),
            other => Err(format!(
                "invalid HAC kernel {other:?} (expected 'iid', 'bartlett', 'parzen', or 'quadratic_spectral')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Bartlett taps at x = j/(L+1) reproduce the Newey–West weights 1 − j/(L+1).
    fn bartlett_matches_newey_west_weights() {
        let bandwidth = 4usize;
        for lag in 0..=bandwidth {
            let x = lag as f64 / (bandwidth + 1) as f64;
            assert_relative_eq!(KernelType::Bartlett.weight(x), 1.0 - x, epsilon = 1e-15);
        }
        assert_eq!(KernelType::Bartlett.weight(1.5), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Every taper is one at the origin; IID vanishes elsewhere.
    fn all_kernels_are_one_at_origin() {
        for kernel in [
            KernelType::IID,
            KernelType::Bartlett,
            KernelType::Parzen,
            KernelType::QuadraticSpectral,
        ] {
            assert_relative_eq!(kernel.weight(0.0), 1.0);
        }
        assert_eq!(KernelType::IID.weight(0.25), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Parzen is continuous at the 0.5 knot.
    fn parzen_is_continuous_at_knot() {
        let left = KernelType::Parzen.weight(0.5);
        let right = 2.0 * (1.0f64 - 0.5).powi(3);
        assert_relative_eq!(left, right, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Names parse case-insensitively; unknown names are rejected.
    fn from_str_accepts_aliases() {
        assert_eq!("Newey_West".parse::<KernelType>(), Ok(KernelType::Bartlett));
        assert_eq!("qs".parse::<KernelType>(), Ok(KernelType::QuadraticSpectral));
        assert!("triangle".parse::<KernelType>().is_err());
    }
}
