use serde::Serialize;

use crate::data::model::Table;
use crate::error::{FenceError, Result};
use crate::stats::{quartiles, Quartiles};

/// Conventional Tukey fence factor.
pub const TUKEY_MULTIPLIER: f64 = 1.5;

// ---------------------------------------------------------------------------
// Bounds – the open admissible interval for one column
// ---------------------------------------------------------------------------

/// Open interval `(lower, upper)` derived from a column's quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
    pub quartiles: Quartiles,
    pub multiplier: f64,
}

impl Bounds {
    /// Tukey fences around `quartiles`: `Q1 - k*IQR` and `Q3 + k*IQR`.
    pub fn from_quartiles(quartiles: Quartiles, multiplier: f64) -> Self {
        let spread = multiplier * quartiles.iqr();
        Bounds {
            lower: quartiles.q1 - spread,
            upper: quartiles.q3 + spread,
            quartiles,
            multiplier,
        }
    }

    /// Strict containment; NaN is never inside.
    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value < self.upper
    }
}

// ---------------------------------------------------------------------------
// BoundsCalculator
// ---------------------------------------------------------------------------

/// Fences for `column` using [`TUKEY_MULTIPLIER`].
pub fn compute_bounds(table: &Table, column: &str) -> Result<Bounds> {
    compute_bounds_with(table, column, TUKEY_MULTIPLIER)
}

/// Fences for `column` with an explicit multiplier.
///
/// Missing cells are ignored. A column with no remaining values yields
/// [`FenceError::EmptyColumn`], and fences that would come out NaN yield
/// [`FenceError::UndefinedBounds`]; NaN bounds are never returned.
pub fn compute_bounds_with(table: &Table, column: &str, multiplier: f64) -> Result<Bounds> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(FenceError::InvalidMultiplier(multiplier));
    }
    let values = table.numeric_values(column)?;
    let quartiles = quartiles(&values).ok_or_else(|| FenceError::EmptyColumn {
        column: column.to_string(),
    })?;
    let bounds = Bounds::from_quartiles(quartiles, multiplier);
    if bounds.lower.is_nan() || bounds.upper.is_nan() {
        return Err(FenceError::UndefinedBounds {
            column: column.to_string(),
        });
    }
    log::debug!(
        "{column}: n={} q1={} q3={} iqr={} -> ({}, {})",
        values.len(),
        quartiles.q1,
        quartiles.q3,
        quartiles.iqr(),
        bounds.lower,
        bounds.upper
    );
    Ok(bounds)
}
