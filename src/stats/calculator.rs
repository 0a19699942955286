//! Statistics Calculator Module
//! Descriptive statistics and kernel density estimates for distribution charts.

use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;

/// Number of evaluation points for a violin outline.
pub const DENSITY_POINTS: usize = 64;

/// Bandwidths the density extends past the extreme values.
pub const DENSITY_CUT: f64 = 2.0;

/// Descriptive statistics for one category of a distribution chart.
#[derive(Debug, Clone)]
pub struct GroupStats {
    pub group_name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
        }
    }
}

impl GroupStats {
    /// Lowest and highest values within 1.5 IQR of the box.
    pub fn whiskers(&self, sorted_values: &[f64]) -> (f64, f64) {
        let iqr = self.q3 - self.q1;
        let low = sorted_values
            .iter()
            .copied()
            .find(|&v| v >= self.q1 - 1.5 * iqr)
            .unwrap_or(self.q1);
        let high = sorted_values
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= self.q3 + 1.5 * iqr)
            .unwrap_or(self.q3);
        (low, high)
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values, ignoring NaN.
    ///
    /// The standard deviation is the sample deviation and is NaN below two values.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let sorted = Self::sorted_finite(values);
        let n = sorted.len();
        if n == 0 {
            return GroupStats::default();
        }

        GroupStats {
            group_name: String::new(),
            count: n,
            mean: sorted.iter().mean(),
            median: Self::percentile(&sorted, 50.0),
            std: sorted.iter().std_dev(),
            min: sorted[0],
            max: sorted[n - 1],
            q1: Self::percentile(&sorted, 25.0),
            q3: Self::percentile(&sorted, 75.0),
        }
    }

    /// Values with NaN removed, sorted ascending.
    pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Gaussian kernel density over the value range, Silverman bandwidth.
    ///
    /// Returns `(value, density)` pairs. Fewer than two distinct values give
    /// an empty estimate.
    pub fn kernel_density(values: &[f64], points: usize) -> Vec<(f64, f64)> {
        let sorted = Self::sorted_finite(values);
        let n = sorted.len();
        if n < 2 || points < 2 {
            return Vec::new();
        }

        let std = sorted.iter().std_dev();
        if std.is_nan() || std <= 0.0 {
            return Vec::new();
        }
        let bandwidth = 1.06 * std * (n as f64).powf(-0.2);

        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let lo = sorted[0] - DENSITY_CUT * bandwidth;
        let hi = sorted[n - 1] + DENSITY_CUT * bandwidth;
        let step = (hi - lo) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let y = lo + i as f64 * step;
                let density = sorted
                    .iter()
                    .map(|v| kernel.pdf((y - v) / bandwidth))
                    .sum::<f64>()
                    / (n as f64 * bandwidth);
                (y, density)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn descriptive_stats_match_numpy() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_relative_eq!(stats.mean, 2.5);
        assert_relative_eq!(stats.median, 2.5);
        assert_relative_eq!(stats.q1, 1.75);
        assert_relative_eq!(stats.q3, 3.25);
        assert_relative_eq!(stats.std, 1.2909944487358056, epsilon = 1e-12);
    }

    #[test]
    fn single_value_has_undefined_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert_relative_eq!(stats.median, 7.0);
        assert!(stats.std.is_nan());
    }

    #[test]
    fn nan_values_are_ignored() {
        let stats = StatsCalculator::compute_descriptive_stats(&[f64::NAN, 2.0, 4.0]);
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.mean, 3.0);
    }

    #[test]
    fn whiskers_stop_at_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        let stats = StatsCalculator::compute_descriptive_stats(&values);
        let sorted = StatsCalculator::sorted_finite(&values);
        assert_eq!(stats.whiskers(&sorted), (1.0, 4.0));
    }

    #[test]
    fn kernel_density_integrates_to_about_one() {
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let density = StatsCalculator::kernel_density(&values, 200);
        assert_eq!(density.len(), 200);

        let step = density[1].0 - density[0].0;
        let area: f64 = density.iter().map(|(_, d)| d * step).sum();
        assert_relative_eq!(area, 1.0, epsilon = 0.05);
    }

    #[test]
    fn kernel_density_needs_spread() {
        assert!(StatsCalculator::kernel_density(&[5.0, 5.0, 5.0], 10).is_empty());
        assert!(StatsCalculator::kernel_density(&[5.0], 10).is_empty());
    }
}
