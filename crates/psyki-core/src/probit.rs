//! Numeric helpers: the standard-normal quantile (probit) and the handful of
//! descriptive statistics the aggregates need.
//!
//! Everything here returns a defined value for empty input (0.0) so callers
//! never have to special-case NaN.

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::{Data, Median, OrderStatistics, Statistics};

/// Default clamp applied to rates before the probit transform.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Clamp a probability into `[epsilon, 1 - epsilon]`.
pub fn clamp_probability(p: f64, epsilon: f64) -> f64 {
    if p.is_nan() {
        return 0.5;
    }
    p.clamp(epsilon, 1.0 - epsilon)
}

/// Standard-normal quantile Φ⁻¹(p) after epsilon clamping.
pub fn probit(p: f64, epsilon: f64) -> f64 {
    Normal::standard().inverse_cdf(clamp_probability(p, epsilon))
}

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.mean()
}

/// Median, 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

/// Round to two decimals, the precision used for every reported percentage.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `part / whole * 100`, rounded to two decimals; 0.0 when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Five-number summary used for the d′ distribution plots.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    /// Summarize a sample; all fields are zero for an empty one.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut data = Data::new(values.to_vec());
        Self {
            count: values.len(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            q1: data.lower_quartile(),
            median: data.median(),
            q3: data.upper_quartile(),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
