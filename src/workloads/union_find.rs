//! Quick-find union-find and the benchmarks built on it.

use std::hint::black_box;

use crate::definition::{BenchmarkDefinition, Operation, ParameterCombination, ParameterDomain};
use crate::error::{BenchError, Result};

/// Union-find where `find` is a single array read and `union` relabels a whole component.
#[derive(Debug, Clone)]
pub struct QuickFindUf {
    id: Vec<usize>,
    count: usize,
}

impl QuickFindUf {
    /// `n` elements, each in its own component.
    pub fn new(n: usize) -> Self {
        Self {
            id: (0..n).collect(),
            count: n,
        }
    }

    /// Number of components.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Canonical element of the component containing `p`.
    pub fn find(&self, p: usize) -> Result<usize> {
        self.validate(p)?;
        Ok(self.id[p])
    }

    pub fn connected(&self, p: usize, q: usize) -> Result<bool> {
        Ok(self.find(p)? == self.find(q)?)
    }

    /// Merges the components containing `p` and `q`.
    pub fn union(&mut self, p: usize, q: usize) -> Result<()> {
        let p_id = self.find(p)?;
        let q_id = self.find(q)?;
        if p_id == q_id {
            return Ok(());
        }

        for id in self.id.iter_mut().filter(|id| **id == p_id) {
            *id = q_id;
        }
        self.count -= 1;
        Ok(())
    }

    fn validate(&self, p: usize) -> Result<()> {
        if p >= self.id.len() {
            return Err(BenchError::Workload(format!(
                "index {p} is not between 0 and {}",
                self.id.len().saturating_sub(1)
            )));
        }
        Ok(())
    }
}

fn sizes() -> ParameterDomain {
    ParameterDomain::new("N", [10, 100, 1000])
}

/// Chains every element into one component, one `union` at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnionFindBenchmarks;

impl BenchmarkDefinition for UnionFindBenchmarks {
    type Instance = QuickFindUf;

    fn name(&self) -> &str {
        "UnionFindBenchmarks"
    }

    fn operations(&self) -> Vec<Operation<QuickFindUf>> {
        vec![Operation::new("Union", |uf: &mut QuickFindUf| {
            for i in 1..uf.len() {
                // Indices come from the structure's own length.
                let _ = black_box(uf.union(i - 1, i));
            }
        })]
    }

    fn parameters(&self) -> Vec<ParameterDomain> {
        vec![sizes()]
    }

    fn construct(&self, combination: &ParameterCombination) -> Result<QuickFindUf> {
        Ok(QuickFindUf::new(combination.usize("N")?))
    }
}

/// `find` on a fully connected structure.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuickFindFindBenchmarks;

impl BenchmarkDefinition for QuickFindFindBenchmarks {
    type Instance = QuickFindUf;

    fn name(&self) -> &str {
        "QuickFindUf_Find"
    }

    fn operations(&self) -> Vec<Operation<QuickFindUf>> {
        vec![Operation::new("Find", |uf: &mut QuickFindUf| {
            let _ = black_box(uf.find(black_box(uf.len() / 2)));
        })]
    }

    fn parameters(&self) -> Vec<ParameterDomain> {
        vec![sizes()]
    }

    fn construct(&self, combination: &ParameterCombination) -> Result<QuickFindUf> {
        let n = combination.usize("N")?;
        if n == 0 {
            return Err(BenchError::invalid_parameter("N", "must be at least 1"));
        }
        Ok(QuickFindUf::new(n))
    }

    fn setup(&self, uf: &mut QuickFindUf) -> Result<()> {
        for i in 1..uf.len() {
            uf.union(i - 1, i)?;
        }
        Ok(())
    }
}
