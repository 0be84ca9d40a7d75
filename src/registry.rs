//! Lookup of benchmark definitions by the name typed on the command line.

use crate::error::{BenchError, Result};
use crate::runner::Benchmark;

/// Suffixes a lookup name may omit.
const SUFFIXES: &[&str] = &["Benchmarks", "_benchmarks"];

#[derive(Default)]
pub struct Registry {
    benchmarks: Vec<Box<dyn Benchmark>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, bench: impl Benchmark + 'static) -> &mut Self {
        self.benchmarks.push(Box::new(bench));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.benchmarks.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Finds the single benchmark whose name matches `name`, ignoring case
    /// and an optional `Benchmarks` suffix.
    pub fn find(&self, name: &str) -> Result<Option<&dyn Benchmark>> {
        let matches: Vec<&dyn Benchmark> = self
            .benchmarks
            .iter()
            .map(|b| b.as_ref())
            .filter(|b| matches_name(b.name(), name))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(BenchError::AmbiguousBenchmark {
                name: name.to_string(),
                count,
            }),
        }
    }
}

fn matches_name(registered: &str, wanted: &str) -> bool {
    registered.eq_ignore_ascii_case(wanted)
        || SUFFIXES
            .iter()
            .any(|suffix| registered.eq_ignore_ascii_case(&format!("{wanted}{suffix}")))
}
