//! A simple statistics module with utility functions for the diurnal profiles.
use statrs::statistics::Statistics;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.mean()
}

/// Standard deviation with the N-1 (Bessel) divisor. Undefined, and so `NaN`, for fewer than two
/// values.
pub fn sample_standard_deviation(values: &[f64]) -> f64 {
    values.std_dev()
}

/// Round to a number of significant figures, as printf's `%.Ng` would.
pub fn round_to_significant_figures(value: f64, figures: usize) -> f64 {
    if !value.is_finite() || value == 0. {
        return value;
    }

    format!("{:.*e}", figures.saturating_sub(1), value)
        .parse()
        .unwrap_or(value)
}
