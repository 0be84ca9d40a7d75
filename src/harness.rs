use std::hint::black_box;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::alloc;
use crate::error::{BenchError, Result};
use crate::schema::Sample;

/// Guards the steady-state ratio against a zero minimum rate.
const RATE_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }

    pub fn sampler(&self) -> SamplerConfig {
        match self {
            Profile::Quick => SamplerConfig::default(),
            Profile::Full => SamplerConfig {
                window: Duration::from_millis(10),
                num_measurements: 10,
                abort_after: 100,
                ..SamplerConfig::default()
            },
        }
    }
}

/// Knobs of the adaptive sampling loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerConfig {
    /// Length of one timed window.
    pub window: Duration,
    /// Trailing windows that must agree before sampling stops.
    pub num_measurements: usize,
    /// Largest accepted max/min rate ratio over the trailing windows.
    pub steady_factor: f64,
    /// Give up once more than this many windows were taken.
    pub abort_after: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(1),
            num_measurements: 5,
            steady_factor: 1.6,
            abort_after: 40,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    pub sampler: SamplerConfig,
}

impl BenchConfig {
    pub fn new(profile: Profile, seed: u64) -> Self {
        Self {
            profile,
            seed,
            sampler: profile.sampler(),
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::new(Profile::Quick, 0)
    }
}

/// Runs `f` back to back until `window` has elapsed. Always calls it at least once.
pub fn run_window(window: Duration, f: &mut impl FnMut()) -> Sample {
    let alloc_before = alloc::allocated_bytes();
    let start = Instant::now();
    let mut invocations = 0u64;

    let wall = loop {
        black_box(f());
        invocations += 1;
        let elapsed = start.elapsed();
        if elapsed >= window {
            break elapsed;
        }
    };

    let allocated = alloc::allocated_bytes().wrapping_sub(alloc_before) as i64;

    Sample {
        invocations,
        wall,
        allocated_bytes: allocated,
    }
}

/// True when the max/min rate ratio over `tail` is within `steady_factor`.
pub fn is_steady(tail: &[Sample], steady_factor: f64) -> bool {
    if tail.is_empty() {
        return false;
    }
    let (min, max) = tail
        .iter()
        .map(Sample::rate)
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), r| (lo.min(r), hi.max(r)));
    max / min.max(RATE_EPSILON) <= steady_factor
}

/// Pulls samples from `next_sample` until the trailing windows agree.
///
/// Returns exactly `num_measurements` samples, or a non-convergence error
/// after `abort_after + 1` samples.
pub fn converge(
    config: &SamplerConfig,
    operation: &str,
    mut next_sample: impl FnMut() -> Sample,
) -> Result<Vec<Sample>> {
    let keep = config.num_measurements.max(1);
    let mut samples: Vec<Sample> = Vec::new();

    loop {
        let sample = next_sample();
        debug!(
            operation,
            window = samples.len(),
            invocations = sample.invocations,
            wall_ns = sample.wall.as_nanos() as u64,
            allocated = sample.allocated_bytes,
            "window"
        );
        samples.push(sample);

        if samples.len() >= keep {
            let tail = &samples[samples.len() - keep..];
            if is_steady(tail, config.steady_factor) {
                return Ok(tail.to_vec());
            }
        }

        if samples.len() > config.abort_after {
            return Err(BenchError::NonConvergence {
                operation: operation.to_string(),
                abort_after: config.abort_after,
            });
        }
    }
}

/// Drives real operations through the sampling loop.
#[derive(Clone, Debug, Default)]
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn sample(&self, operation: &str, mut f: impl FnMut()) -> Result<Vec<Sample>> {
        let window = self.config.window;
        converge(&self.config, operation, || run_window(window, &mut f))
    }
}
