//! Order statistics used by the fence computation.

use serde::Serialize;

/// First and third quartile of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Interquartile range, `Q3 - Q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quantile `q` of an ascending slice, interpolating linearly between the
/// two order statistics around position `q * (n - 1)`.
///
/// Returns `None` for an empty slice or `q` outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let pos = q * (sorted.len() as f64 - 1.0);
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let a = sorted[idx];
    let b = sorted[(idx + 1).min(sorted.len() - 1)];
    // `inf * 0` and `inf - inf` are NaN: return the order statistic itself
    // when there is nothing to interpolate or the lower neighbour is infinite
    if frac == 0.0 || a == b || (a.is_infinite() && b.is_finite()) {
        return Some(a);
    }
    Some(a + (b - a) * frac)
}

/// Sort a copy of `values` (NaNs dropped) and return its quartiles.
pub fn quartiles(values: &[f64]) -> Option<Quartiles> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(Quartiles {
        q1: quantile_sorted(&sorted, 0.25)?,
        q3: quantile_sorted(&sorted, 0.75)?,
    })
}
