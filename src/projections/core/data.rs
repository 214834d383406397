//! Data containers for local-projection models.
//!
//! Purpose
//! -------
//! Provide small, validated containers for the endogenous table, its optional
//! exogenous and contemporaneous blocks, and the external shock (plus
//! instruments) used by IV projections. All row-alignment and finiteness
//! checks happen here so design construction can assume clean input.
//!
//! Key behaviors
//! -------------
//! - [`LPData`] enforces a non-empty, finite `T×K` endogenous block with one
//!   name per column, and row alignment of every optional block.
//! - [`ExternalShock`] enforces a finite shock series of length `T` and, when
//!   present, a finite `T×Q` instrument block.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every block shares the same row count `T` and calendar index.
//! - No missing values: NaN/±inf anywhere is rejected with its position.
//!
//! Conventions
//! -----------
//! - Rows index time (0-based), columns index variables.
//! - Default variable names are `y1, …, yK`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path, empty input, non-finite values,
//!   misaligned blocks, and name-count mismatches.
use crate::projections::errors::{LPError, LPResult};
use ndarray::{Array1, Array2, ArrayView2};

/// `LPData` — endogenous table plus optional exogenous / contemporaneous blocks.
///
/// Fields
/// ------
/// - `endog`: `Array2<f64>`
///   `T×K` endogenous variables; responses and (in recursive
///   identification) shocks.
/// - `names`: `Vec<String>`
///   One label per endogenous column, carried through to results.
/// - `exog`: `Option<Array2<f64>>`
///   `T×M` exogenous variables, entered with their own lag order.
/// - `contemp`: `Option<Array2<f64>>`
///   `T×C` variables entered with their contemporaneous value only.
#[derive(Debug, Clone, PartialEq)]
pub struct LPData {
    pub endog: Array2<f64>,
    pub names: Vec<String>,
    pub exog: Option<Array2<f64>>,
    pub contemp: Option<Array2<f64>>,
}

impl LPData {
    /// Construct validated [`LPData`] from an endogenous block.
    ///
    /// # Errors
    /// - [`LPError::EmptyData`] if `endog` has no rows or no columns.
    /// - [`LPError::NonFiniteData`] at the first NaN/±inf.
    /// - [`LPError::LengthMismatch`] if `names` does not have one entry per column.
    pub fn new(endog: Array2<f64>, names: Option<Vec<String>>) -> LPResult<LPData> {
        if endog.nrows() == 0 || endog.ncols() == 0 {
            return Err(LPError::EmptyData);
        }
        validate_block("endogenous", endog.view(), endog.nrows())?;
        let names = match names {
            Some(names) if names.len() != endog.ncols() => {
                return Err(LPError::LengthMismatch {
                    block: "names",
                    expected: endog.ncols(),
                    actual: names.len(),
                });
            }
            Some(names) => names,
            None => (1..=endog.ncols()).map(|i| format!("y{i}")).collect(),
        };
        Ok(LPData { endog, names, exog: None, contemp: None })
    }

    /// Attach an exogenous block (lagged with `LPOptions::exog_lags`).
    pub fn with_exog(mut self, exog: Array2<f64>) -> LPResult<LPData> {
        validate_block("exogenous", exog.view(), self.nobs())?;
        self.exog = Some(exog);
        Ok(self)
    }

    /// Attach a contemporaneous block (entered unlagged).
    pub fn with_contemp(mut self, contemp: Array2<f64>) -> LPResult<LPData> {
        validate_block("contemporaneous", contemp.view(), self.nobs())?;
        self.contemp = Some(contemp);
        Ok(self)
    }

    /// Number of observations `T`.
    pub fn nobs(&self) -> usize {
        self.endog.nrows()
    }

    /// Number of endogenous variables `K`.
    pub fn nvars(&self) -> usize {
        self.endog.ncols()
    }
}

/// `ExternalShock` — identified shock series and optional instruments.
///
/// Fields
/// ------
/// - `shock`: `Array1<f64>`
///   Shock series of length `T`, entered contemporaneously.
/// - `instruments`: `Option<Array2<f64>>`
///   `T×Q` instruments for the shock; required by two-stage least squares.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalShock {
    pub shock: Array1<f64>,
    pub instruments: Option<Array2<f64>>,
}

impl ExternalShock {
    /// Construct a validated shock series aligned with `data`.
    pub fn new(shock: Array1<f64>, data: &LPData) -> LPResult<ExternalShock> {
        validate_series("shock", &shock, data.nobs())?;
        Ok(ExternalShock { shock, instruments: None })
    }

    /// Attach instruments for two-stage least squares.
    pub fn with_instruments(mut self, instruments: Array2<f64>) -> LPResult<ExternalShock> {
        if instruments.ncols() == 0 {
            return Err(LPError::InvalidConfig {
                param: "instruments",
                reason: "instrument block must have at least one column",
            });
        }
        validate_block("instrument", instruments.view(), self.shock.len())?;
        self.instruments = Some(instruments);
        Ok(self)
    }
}

/// Check row alignment and finiteness of a `T×m` block.
pub fn validate_block(block: &'static str, values: ArrayView2<'_, f64>, rows: usize) -> LPResult<()> {
    if values.nrows() != rows {
        return Err(LPError::LengthMismatch { block, expected: rows, actual: values.nrows() });
    }
    for ((row, col), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(LPError::NonFiniteData { block, row, col, value });
        }
    }
    Ok(())
}

/// Check length and finiteness of a series aligned with the endogenous block.
pub fn validate_series(block: &'static str, values: &Array1<f64>, rows: usize) -> LPResult<()> {
    if values.len() != rows {
        return Err(LPError::LengthMismatch { block, expected: rows, actual: values.len() });
    }
    if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(LPError::NonFiniteData { block, row, col: 0, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    // Purpose
    // -------
    // Valid input is stored unchanged with default names.
    fn new_accepts_valid_data_with_default_names() {
        let endog = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let data = LPData::new(endog.clone(), None).unwrap();
        assert_eq!(data.endog, endog);
        assert_eq!(data.names, vec!["y1".to_string(), "y2".to_string()]);
        assert_eq!((data.nobs(), data.nvars()), (3, 2));
    }

    #[test]
    // Purpose
    // -------
    // Empty blocks and non-finite values are rejected with their location.
    fn new_rejects_empty_and_non_finite() {
        assert_eq!(LPData::new(Array2::zeros((0, 2)), None), Err(LPError::EmptyData));

        let err = LPData::new(array![[1.0, 2.0], [f64::NAN, 4.0]], None).unwrap_err();
        assert!(matches!(err, LPError::NonFiniteData { row: 1, col: 0, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Names must match the column count.
    fn new_rejects_wrong_name_count() {
        let err = LPData::new(array![[1.0, 2.0]], Some(vec!["gdp".into()])).unwrap_err();
        assert_eq!(err, LPError::LengthMismatch { block: "names", expected: 2, actual: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Optional blocks must be row-aligned with the endogenous block.
    fn optional_blocks_must_align() {
        let data = LPData::new(array![[1.0], [2.0], [3.0]], None).unwrap();
        let err = data.clone().with_exog(array![[1.0], [2.0]]).unwrap_err();
        assert_eq!(err, LPError::LengthMismatch { block: "exogenous", expected: 3, actual: 2 });

        let shock_err = ExternalShock::new(array![0.1, 0.2], &data).unwrap_err();
        assert!(matches!(shock_err, LPError::LengthMismatch { block: "shock", .. }));

        let shock = ExternalShock::new(array![0.1, 0.2, 0.3], &data)
            .unwrap()
            .with_instruments(array![[1.0], [0.0], [1.0]])
            .unwrap();
        assert!(shock.instruments.is_some());
    }
}
