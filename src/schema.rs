use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stats::Summary;

/// Raw result of one timed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub invocations: u64,
    pub wall: Duration,
    /// Bytes allocated during the window. Signed so noisy counters can be
    /// stored as-is; the aggregator clamps at zero.
    pub allocated_bytes: i64,
}

impl Sample {
    /// Invocations per second, with the duration floored to 1ns.
    pub fn rate(&self) -> f64 {
        let nanos = self.wall.as_nanos().max(1) as f64;
        self.invocations as f64 * 1e9 / nanos
    }
}

/// Stabilized samples for one (operation, configuration) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleConfigMeasurement {
    pub operation: String,
    pub parameters: Vec<(String, String)>,
    pub samples: Vec<Sample>,
}

impl SingleConfigMeasurement {
    pub fn summary(&self) -> Summary {
        Summary::from_samples(&self.samples)
    }
}

/// All configurations measured for one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBenchmarkResult {
    pub operation: String,
    pub parameter_names: Vec<String>,
    pub measurements: Vec<SingleConfigMeasurement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub benchmark: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

/// Flattened per-configuration record for machine-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub operation: String,
    pub parameters: Vec<(String, String)>,
    pub samples: usize,
    pub invocations: u64,
    pub total_ns: u128,
    pub ns_per_call: f64,
    pub calls_per_s: f64,
    pub allocated_bytes_per_call: f64,
}

impl From<&SingleConfigMeasurement> for MeasurementRecord {
    fn from(m: &SingleConfigMeasurement) -> Self {
        let s = m.summary();
        Self {
            operation: m.operation.clone(),
            parameters: m.parameters.clone(),
            samples: m.samples.len(),
            invocations: s.total_invocations,
            total_ns: s.total_duration.as_nanos(),
            ns_per_call: s.time_per_call_ns,
            calls_per_s: s.average_rate,
            allocated_bytes_per_call: s.allocated_per_call,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub run: RunMeta,
    pub measurements: Vec<MeasurementRecord>,
}

impl BenchReport {
    pub fn new(run: RunMeta, results: &[MethodBenchmarkResult]) -> Self {
        let measurements = results
            .iter()
            .flat_map(|r| r.measurements.iter().map(MeasurementRecord::from))
            .collect();
        Self { run, measurements }
    }
}
