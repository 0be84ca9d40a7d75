//! Adaptive micro-benchmark harness.
//!
//! A [`BenchmarkDefinition`] names its operations and parameter domains.
//! The [`Runner`] measures every operation under every parameter
//! combination, sampling fixed-length windows until the call rate settles,
//! and prints one table per operation.

pub mod alloc;
pub mod definition;
pub mod error;
pub mod format;
pub mod harness;
pub mod params;
pub mod registry;
pub mod report;
pub mod runner;
pub mod schema;
pub mod stats;
pub mod workloads;

pub use definition::{BenchmarkDefinition, Operation, ParamValue, ParameterCombination, ParameterDomain};
pub use error::{BenchError, Result};
pub use harness::{BenchConfig, Profile, Sampler, SamplerConfig};
pub use registry::Registry;
pub use runner::{Benchmark, ErrorPolicy, RunOutcome, Runner};
pub use schema::{MethodBenchmarkResult, Sample, SingleConfigMeasurement};
