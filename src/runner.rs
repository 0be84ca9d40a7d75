//! Drives definitions through enumeration, sampling and reporting.

use std::io::Write;

use tracing::{info, warn};

use crate::alloc;
use crate::definition::{BenchmarkDefinition, Operation};
use crate::error::{BenchError, Result};
use crate::harness::Sampler;
use crate::params::combinations;
use crate::report::render;
use crate::schema::{MethodBenchmarkResult, SingleConfigMeasurement};

/// Type-erased view of a [`BenchmarkDefinition`], so registries can hold
/// definitions with different instance types.
pub trait Benchmark {
    fn name(&self) -> &str;

    fn operation_names(&self) -> Vec<String>;

    /// Measures one operation under every configuration.
    fn measure(&self, operation: &str, sampler: &Sampler) -> Result<MethodBenchmarkResult>;
}

impl<D: BenchmarkDefinition> Benchmark for D {
    fn name(&self) -> &str {
        BenchmarkDefinition::name(self)
    }

    fn operation_names(&self) -> Vec<String> {
        self.operations()
            .iter()
            .map(|op| op.name().to_string())
            .collect()
    }

    fn measure(&self, operation: &str, sampler: &Sampler) -> Result<MethodBenchmarkResult> {
        let op = self
            .operations()
            .into_iter()
            .find(|op| op.name() == operation)
            .ok_or_else(|| {
                BenchError::Validation(format!(
                    "{} has no operation named {operation}",
                    BenchmarkDefinition::name(self)
                ))
            })?;
        measure_operation(self, &op, sampler)
    }
}

/// Measures `op` once per configuration, on a freshly constructed and set up
/// instance each time.
pub fn measure_operation<D>(
    def: &D,
    op: &Operation<D::Instance>,
    sampler: &Sampler,
) -> Result<MethodBenchmarkResult>
where
    D: BenchmarkDefinition + ?Sized,
{
    let domains = def.parameters();
    if let Some(empty) = domains.iter().find(|d| d.values.is_empty()) {
        return Err(BenchError::Validation(format!(
            "parameter {} has an empty domain",
            empty.name
        )));
    }

    let configurations = combinations(&domains);
    let mut measurements = Vec::with_capacity(configurations.len());

    for combination in configurations {
        let mut instance = def.construct(&combination)?;
        def.setup(&mut instance)?;

        let samples = sampler.sample(op.name(), || op.invoke(&mut instance))?;
        let measurement = SingleConfigMeasurement {
            operation: op.name().to_string(),
            parameters: combination.stringified(),
            samples,
        };

        let summary = measurement.summary();
        info!(
            operation = op.name(),
            parameters = ?measurement.parameters,
            ns_per_call = summary.time_per_call_ns,
            invocations = summary.total_invocations,
            "configuration measured"
        );
        measurements.push(measurement);
    }

    Ok(MethodBenchmarkResult {
        operation: op.name().to_string(),
        parameter_names: domains.into_iter().map(|d| d.name).collect(),
        measurements,
    })
}

/// What to do when one operation fails to measure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the run and return the error.
    #[default]
    FailFast,
    /// Log the error and continue with the next operation.
    KeepGoing,
}

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub results: Vec<MethodBenchmarkResult>,
    pub failures: Vec<(String, BenchError)>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Runner {
    sampler: Sampler,
    policy: ErrorPolicy,
}

impl Runner {
    pub fn new(sampler: Sampler, policy: ErrorPolicy) -> Self {
        Self { sampler, policy }
    }

    /// Measures every operation of `bench`, writing one table per operation to `out`.
    pub fn run(&self, bench: &dyn Benchmark, out: &mut dyn Write) -> Result<RunOutcome> {
        let mut outcome = RunOutcome::default();

        let operations = bench.operation_names();
        if operations.is_empty() {
            info!(benchmark = bench.name(), "no benchmarkable operations");
            writeln!(out, "No benchmarkable operations found in {}", bench.name())?;
            return Ok(outcome);
        }

        if !alloc::is_tracking() {
            warn!("allocation tracking inactive; allocated columns will read 0 B");
        }

        writeln!(out, "Running benchmarks for {}\n", bench.name())?;

        for operation in operations {
            let measured = bench
                .measure(&operation, &self.sampler)
                .and_then(|result| render(&result).map(|table| (result, table)));

            match measured {
                Ok((result, table)) => {
                    writeln!(out, "{table}")?;
                    outcome.results.push(result);
                }
                Err(e) if self.policy == ErrorPolicy::KeepGoing => {
                    warn!(operation = %operation, error = %e, "skipping operation");
                    writeln!(out, "Benchmark: {operation}\n  failed: {e}\n")?;
                    outcome.failures.push((operation, e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ParameterCombination, ParameterDomain};
    use crate::harness::SamplerConfig;
    use std::cell::Cell;
    use std::time::Duration;

    struct Empty;

    impl BenchmarkDefinition for Empty {
        type Instance = ();

        fn name(&self) -> &str {
            "Empty"
        }

        fn operations(&self) -> Vec<Operation<()>> {
            Vec::new()
        }

        fn construct(&self, _: &ParameterCombination) -> Result<()> {
            Ok(())
        }
    }

    struct Counting {
        constructed: Cell<usize>,
        set_up: Cell<usize>,
    }

    struct CountingInstance {
        n: usize,
        total: u64,
    }

    impl BenchmarkDefinition for Counting {
        type Instance = CountingInstance;

        fn name(&self) -> &str {
            "Counting"
        }

        fn operations(&self) -> Vec<Operation<CountingInstance>> {
            vec![
                Operation::new("sum", |inst: &mut CountingInstance| {
                    inst.total = (0..inst.n as u64).sum();
                }),
                Operation::unbound("noop", || {}),
            ]
        }

        fn parameters(&self) -> Vec<ParameterDomain> {
            vec![
                ParameterDomain::new("N", [1, 2]),
                ParameterDomain::new("Mode", ["a", "b"]),
            ]
        }

        fn construct(&self, combination: &ParameterCombination) -> Result<CountingInstance> {
            self.constructed.set(self.constructed.get() + 1);
            combination.str("Mode")?;
            Ok(CountingInstance {
                n: combination.usize("N")?,
                total: 0,
            })
        }

        fn setup(&self, _instance: &mut CountingInstance) -> Result<()> {
            self.set_up.set(self.set_up.get() + 1);
            Ok(())
        }
    }

    // Every call sleeps twice as long as the previous one, so rates never settle.
    struct Diverging;

    impl BenchmarkDefinition for Diverging {
        type Instance = u32;

        fn name(&self) -> &str {
            "Diverging"
        }

        fn operations(&self) -> Vec<Operation<u32>> {
            vec![
                Operation::new("slower", |calls: &mut u32| {
                    let k = (*calls).min(16);
                    *calls += 1;
                    std::thread::sleep(Duration::from_micros(1 << k));
                }),
            ]
        }

        fn construct(&self, _: &ParameterCombination) -> Result<u32> {
            Ok(0)
        }
    }

    fn lenient_sampler() -> Sampler {
        Sampler::new(SamplerConfig {
            num_measurements: 3,
            steady_factor: 100.0,
            ..SamplerConfig::default()
        })
    }

    #[test]
    fn test_empty_definition_is_not_an_error() {
        let runner = Runner::new(lenient_sampler(), ErrorPolicy::FailFast);
        let mut out = Vec::new();
        let outcome = runner.run(&Empty, &mut out).unwrap();

        assert!(outcome.results.is_empty());
        assert!(outcome.is_success());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No benchmarkable operations found in Empty"));
    }

    #[test]
    fn test_fresh_instance_per_configuration_and_operation() {
        let def = Counting {
            constructed: Cell::new(0),
            set_up: Cell::new(0),
        };
        let runner = Runner::new(lenient_sampler(), ErrorPolicy::FailFast);
        let mut out = Vec::new();
        let outcome = runner.run(&def, &mut out).unwrap();

        // 2 operations x 4 configurations.
        assert_eq!(def.constructed.get(), 8);
        assert_eq!(def.set_up.get(), 8);
        assert_eq!(outcome.results.len(), 2);

        let sum = &outcome.results[0];
        assert_eq!(sum.operation, "sum");
        assert_eq!(sum.parameter_names, vec!["N", "Mode"]);
        let rows: Vec<Vec<String>> = sum
            .measurements
            .iter()
            .map(|m| m.parameters.iter().map(|(_, v)| v.clone()).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["1", "a"],
                vec!["1", "b"],
                vec!["2", "a"],
                vec!["2", "b"]
            ]
        );
        assert!(sum.measurements.iter().all(|m| m.samples.len() == 3));

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Running benchmarks for Counting\n"));
        assert!(text.contains("Benchmark: sum"));
        assert!(text.contains("Benchmark: noop"));
    }

    #[test]
    fn test_diverging_operation_does_not_converge() {
        let sampler = Sampler::new(SamplerConfig {
            num_measurements: 3,
            abort_after: 5,
            ..SamplerConfig::default()
        });
        let runner = Runner::new(sampler, ErrorPolicy::FailFast);
        let mut out = Vec::new();

        let err = runner.run(&Diverging, &mut out).unwrap_err();
        match err {
            BenchError::NonConvergence {
                operation,
                abort_after,
            } => {
                assert_eq!(operation, "slower");
                assert_eq!(abort_after, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // Hand-written `Benchmark` whose first operation always fails.
    struct Flaky;

    impl Benchmark for Flaky {
        fn name(&self) -> &str {
            "Flaky"
        }

        fn operation_names(&self) -> Vec<String> {
            vec!["broken".to_string(), "fine".to_string()]
        }

        fn measure(&self, operation: &str, _: &Sampler) -> Result<MethodBenchmarkResult> {
            if operation == "broken" {
                return Err(BenchError::NonConvergence {
                    operation: operation.to_string(),
                    abort_after: 40,
                });
            }
            Ok(MethodBenchmarkResult {
                operation: operation.to_string(),
                parameter_names: Vec::new(),
                measurements: vec![SingleConfigMeasurement {
                    operation: operation.to_string(),
                    parameters: Vec::new(),
                    samples: vec![crate::schema::Sample {
                        invocations: 10,
                        wall: Duration::from_millis(1),
                        allocated_bytes: 0,
                    }],
                }],
            })
        }
    }

    #[test]
    fn test_keep_going_reports_remaining_operations() {
        let runner = Runner::new(lenient_sampler(), ErrorPolicy::KeepGoing);
        let mut out = Vec::new();

        let outcome = runner.run(&Flaky, &mut out).unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "broken");
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].operation, "fine");

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("broken: no steady state after 40 windows"));
        assert!(text.contains("Benchmark: fine"));
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let runner = Runner::new(lenient_sampler(), ErrorPolicy::FailFast);
        let mut out = Vec::new();

        let err = runner.run(&Flaky, &mut out).unwrap_err();
        assert!(matches!(err, BenchError::NonConvergence { .. }));
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Benchmark: fine"));
    }

    #[test]
    fn test_unknown_operation_is_validation_error() {
        let err = Diverging.measure("missing", &lenient_sampler()).unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
    }

    #[test]
    fn test_empty_domain_is_rejected_before_measuring() {
        struct EmptyDomain;

        impl BenchmarkDefinition for EmptyDomain {
            type Instance = ();

            fn name(&self) -> &str {
                "EmptyDomain"
            }

            fn operations(&self) -> Vec<Operation<()>> {
                vec![Operation::unbound("noop", || {})]
            }

            fn parameters(&self) -> Vec<ParameterDomain> {
                vec![ParameterDomain::new("N", Vec::<i32>::new())]
            }

            fn construct(&self, _: &ParameterCombination) -> Result<()> {
                Ok(())
            }
        }

        let err = EmptyDomain.measure("noop", &lenient_sampler()).unwrap_err();
        assert!(matches!(err, BenchError::Validation(_)));
    }
}
