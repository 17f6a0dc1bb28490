use crate::model::{CoefficientMatrix, OutcomeBucket};

/// Sum of squared element-wise differences between two coefficient matrices.
///
/// Absolute, not relative: several terms are legitimately close to zero.
pub fn discrepancy(a: &CoefficientMatrix, b: &CoefficientMatrix) -> f64 {
    a.difference(b)
        .rows
        .iter()
        .flatten()
        .map(|d| d * d)
        .sum()
}

/// `Diverged` strictly above `threshold`, `Confirmed` otherwise.
///
/// A NaN score (a NaN coefficient in either source) never confirms.
pub fn classify(score: f64, threshold: f64) -> OutcomeBucket {
    if score <= threshold {
        OutcomeBucket::Confirmed
    } else {
        OutcomeBucket::Diverged
    }
}
