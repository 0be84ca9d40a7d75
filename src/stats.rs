//! Aggregation of stabilized samples into per-configuration figures.

use std::time::Duration;

use crate::schema::Sample;

/// Summary statistics for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total_invocations: u64,
    pub total_duration: Duration,
    /// Calls per second over all retained windows.
    pub average_rate: f64,
    /// Period of one call, in nanoseconds.
    pub time_per_call_ns: f64,
    /// Mean of the per-window bytes per call.
    pub allocated_per_call: f64,
}

impl Summary {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let total_invocations: u64 = samples.iter().map(|s| s.invocations).sum();
        let total_duration: Duration = samples.iter().map(|s| s.wall).sum();
        let total_ns = total_duration.as_nanos() as f64;

        let average_rate = if total_ns > 0.0 {
            total_invocations as f64 * 1e9 / total_ns
        } else {
            0.0
        };
        let time_per_call_ns = if total_invocations > 0 {
            total_ns / total_invocations as f64
        } else {
            0.0
        };

        // Averaged per window so one long window cannot dominate.
        let per_window: Vec<f64> = samples
            .iter()
            .filter(|s| s.invocations > 0)
            .map(|s| s.allocated_bytes.max(0) as f64 / s.invocations as f64)
            .collect();
        let allocated_per_call = if per_window.is_empty() {
            0.0
        } else {
            per_window.iter().sum::<f64>() / per_window.len() as f64
        };

        Self {
            total_invocations,
            total_duration,
            average_rate,
            time_per_call_ns,
            allocated_per_call,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(invocations: u64, micros: u64, allocated_bytes: i64) -> Sample {
        Sample {
            invocations,
            wall: Duration::from_micros(micros),
            allocated_bytes,
        }
    }

    #[test]
    fn test_totals_and_rates() {
        let s = Summary::from_samples(&[sample(1000, 1000, 0), sample(3000, 1000, 0)]);

        assert_eq!(s.total_invocations, 4000);
        assert_eq!(s.total_duration, Duration::from_millis(2));
        assert!((s.average_rate - 2_000_000.0).abs() < 1e-6);
        assert!((s.time_per_call_ns - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_per_call_is_scale_invariant() {
        let single = Summary::from_samples(&[sample(250, 1000, 0)]);
        let doubled = Summary::from_samples(&[sample(500, 2000, 0)]);
        assert!((single.time_per_call_ns - doubled.time_per_call_ns).abs() < 1e-9);
    }

    #[test]
    fn test_allocation_is_averaged_per_window() {
        // Pooled would be (100 + 9000) / 110 ≈ 82.7; per window it is (1 + 900) / 2.
        let s = Summary::from_samples(&[sample(100, 1000, 100), sample(10, 1000, 9000)]);
        assert!((s.allocated_per_call - 450.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_allocation_is_clamped() {
        let s = Summary::from_samples(&[sample(10, 1000, -500), sample(10, 1000, 100)]);
        assert!((s.allocated_per_call - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_degenerate_samples() {
        let empty = Summary::from_samples(&[]);
        assert_eq!(empty.total_invocations, 0);
        assert_eq!(empty.average_rate, 0.0);
        assert_eq!(empty.time_per_call_ns, 0.0);

        let zero = Summary::from_samples(&[sample(0, 0, 0)]);
        assert_eq!(zero.allocated_per_call, 0.0);
        assert_eq!(zero.average_rate, 0.0);
    }
}
