//! Example workloads measured by the `algs-bench` binary.

pub mod trie;
pub mod union_find;

use crate::harness::BenchConfig;
use crate::registry::Registry;

pub use trie::{TernarySearchTrie, TernarySearchTrieBenchmarks};
pub use union_find::{QuickFindFindBenchmarks, QuickFindUf, UnionFindBenchmarks};

/// Registry of every built-in benchmark definition.
pub fn registry(cfg: &BenchConfig) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(UnionFindBenchmarks)
        .register(QuickFindFindBenchmarks)
        .register(TernarySearchTrieBenchmarks::new(cfg.seed));
    registry
}
