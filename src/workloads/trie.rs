//! Ternary search trie and its build benchmark.

use std::cmp::Ordering;
use std::hint::black_box;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::definition::{BenchmarkDefinition, Operation, ParameterCombination, ParameterDomain};
use crate::error::{BenchError, Result};

#[derive(Debug)]
struct Node<V> {
    c: char,
    value: Option<V>,
    left: Option<Box<Node<V>>>,
    mid: Option<Box<Node<V>>>,
    right: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new(c: char) -> Self {
        Self {
            c,
            value: None,
            left: None,
            mid: None,
            right: None,
        }
    }
}

/// String-keyed symbol table. Empty keys are rejected.
#[derive(Debug)]
pub struct TernarySearchTrie<V> {
    root: Option<Box<Node<V>>>,
    len: usize,
}

impl<V> Default for TernarySearchTrie<V> {
    fn default() -> Self {
        Self { root: None, len: 0 }
    }
}

impl<V> TernarySearchTrie<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        let chars = key_chars(key)?;
        let mut link = &mut self.root;
        let mut depth = 0;

        loop {
            let node = link.get_or_insert_with(|| Box::new(Node::new(chars[depth])));
            match chars[depth].cmp(&node.c) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal if depth + 1 < chars.len() => {
                    depth += 1;
                    link = &mut node.mid;
                }
                Ordering::Equal => {
                    if node.value.replace(value).is_none() {
                        self.len += 1;
                    }
                    return Ok(());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        let chars = key_chars(key)?;
        Ok(self.node(&chars).and_then(|n| n.value.as_ref()))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect(self.root.as_deref(), &mut String::new(), &mut out);
        out
    }

    /// Keys starting with `prefix`, in sorted order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let chars = key_chars(prefix)?;
        let mut out = Vec::new();
        if let Some(node) = self.node(&chars) {
            if node.value.is_some() {
                out.push(prefix.to_string());
            }
            collect(node.mid.as_deref(), &mut prefix.to_string(), &mut out);
        }
        Ok(out)
    }

    /// Longest key that is a prefix of `query`.
    pub fn longest_prefix_of<'q>(&self, query: &'q str) -> Result<Option<&'q str>> {
        key_chars(query)?;
        let mut node = self.root.as_deref();
        let mut matched = 0;
        let mut chars = query.char_indices().peekable();

        while let Some(n) = node {
            let Some(&(_, c)) = chars.peek() else {
                break;
            };
            match c.cmp(&n.c) {
                Ordering::Less => node = n.left.as_deref(),
                Ordering::Greater => node = n.right.as_deref(),
                Ordering::Equal => {
                    chars.next();
                    if n.value.is_some() {
                        matched = chars.peek().map_or(query.len(), |&(i, _)| i);
                    }
                    node = n.mid.as_deref();
                }
            }
        }

        Ok((matched > 0).then(|| &query[..matched]))
    }

    fn node(&self, chars: &[char]) -> Option<&Node<V>> {
        let mut node = self.root.as_deref();
        let mut depth = 0;
        while let Some(n) = node {
            match chars[depth].cmp(&n.c) {
                Ordering::Less => node = n.left.as_deref(),
                Ordering::Greater => node = n.right.as_deref(),
                Ordering::Equal if depth + 1 < chars.len() => {
                    depth += 1;
                    node = n.mid.as_deref();
                }
                Ordering::Equal => return Some(n),
            }
        }
        None
    }
}

fn key_chars(key: &str) -> Result<Vec<char>> {
    if key.is_empty() {
        return Err(BenchError::Workload("trie keys must not be empty".to_string()));
    }
    Ok(key.chars().collect())
}

fn collect<V>(mut node: Option<&Node<V>>, prefix: &mut String, out: &mut Vec<String>) {
    while let Some(n) = node {
        collect(n.left.as_deref(), prefix, out);
        prefix.push(n.c);
        if n.value.is_some() {
            out.push(prefix.clone());
        }
        collect(n.mid.as_deref(), prefix, out);
        prefix.pop();
        node = n.right.as_deref();
    }
}

/// Lowercase ASCII strings with lengths in `1..max_len`.
pub fn random_strings(rng: &mut ChaCha8Rng, count: usize, max_len: usize) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..max_len.max(2));
            (0..len).map(|_| rng.random_range(b'a'..b'z') as char).collect()
        })
        .collect()
}

/// Input order for trie construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOrder {
    Random,
    SortedAsc,
    SortedDesc,
}

impl StringOrder {
    pub const ALL: [StringOrder; 3] = [
        StringOrder::Random,
        StringOrder::SortedAsc,
        StringOrder::SortedDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StringOrder::Random => "random",
            StringOrder::SortedAsc => "sorted asc",
            StringOrder::SortedDesc => "sorted desc",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| BenchError::invalid_parameter("StringOrder", format!("unknown order {s:?}")))
    }

    pub fn arrange(&self, strings: &mut [String]) {
        match self {
            StringOrder::Random => {}
            StringOrder::SortedAsc => strings.sort(),
            StringOrder::SortedDesc => strings.sort_by(|a, b| b.cmp(a)),
        }
    }
}

/// Benchmark instance: the strings to insert, prepared by `setup`.
#[derive(Debug)]
pub struct TrieInput {
    string_len: usize,
    num_strings: usize,
    order: StringOrder,
    seed: u64,
    strings: Vec<String>,
}

impl TrieInput {
    pub fn strings(&self) -> &[String] {
        &self.strings
    }
}

/// Builds a trie from seeded random strings in three input orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct TernarySearchTrieBenchmarks {
    pub seed: u64,
}

impl TernarySearchTrieBenchmarks {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BenchmarkDefinition for TernarySearchTrieBenchmarks {
    type Instance = TrieInput;

    fn name(&self) -> &str {
        "TernarySearchTrieBenchmarks"
    }

    fn operations(&self) -> Vec<Operation<TrieInput>> {
        vec![Operation::new("Build", |input: &mut TrieInput| {
            let mut trie = TernarySearchTrie::new();
            for s in &input.strings {
                // Keys are never empty.
                let _ = trie.put(s, 1u32);
            }
            black_box(trie);
        })]
    }

    fn parameters(&self) -> Vec<ParameterDomain> {
        vec![
            ParameterDomain::new("StringLen", [10]),
            ParameterDomain::new("StringOrder", StringOrder::ALL.map(|o| o.as_str())),
            ParameterDomain::new("NumStrings", [10, 20, 40, 80, 160, 320]),
        ]
    }

    fn construct(&self, combination: &ParameterCombination) -> Result<TrieInput> {
        Ok(TrieInput {
            string_len: combination.usize("StringLen")?,
            num_strings: combination.usize("NumStrings")?,
            order: StringOrder::parse(combination.str("StringOrder")?)?,
            seed: self.seed,
            strings: Vec::new(),
        })
    }

    fn setup(&self, input: &mut TrieInput) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(input.seed);
        input.strings = random_strings(&mut rng, input.num_strings, input.string_len);
        input.order.arrange(&mut input.strings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::combinations;

    fn trie(keys: &[&str]) -> TernarySearchTrie<usize> {
        let mut t = TernarySearchTrie::new();
        for (i, k) in keys.iter().enumerate() {
            t.put(k, i).unwrap();
        }
        t
    }

    #[test]
    fn test_put_get_and_len() {
        let mut t = trie(&["she", "sells", "sea", "shells", "by", "the", "sea"]);
        assert_eq!(t.len(), 6);
        assert_eq!(t.get("sea").unwrap(), Some(&6));
        assert_eq!(t.get("shell").unwrap(), None);
        assert!(t.contains("by").unwrap());
        assert!(!t.contains("s").unwrap());

        t.put("s", 99).unwrap();
        assert_eq!(t.len(), 7);
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let mut t: TernarySearchTrie<u8> = TernarySearchTrie::new();
        assert!(t.put("", 1).is_err());
        assert!(t.get("").is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn test_keys_sorted_and_prefixed() {
        let t = trie(&["she", "sells", "sea", "shells", "by", "the"]);
        assert_eq!(t.keys(), vec!["by", "sea", "sells", "she", "shells", "the"]);
        assert_eq!(t.keys_with_prefix("sh").unwrap(), vec!["she", "shells"]);
        assert_eq!(t.keys_with_prefix("she").unwrap(), vec!["she", "shells"]);
        assert!(t.keys_with_prefix("x").unwrap().is_empty());
    }

    #[test]
    fn test_longest_prefix_of() {
        let t = trie(&["she", "sells", "sea", "shells", "by", "the"]);
        assert_eq!(t.longest_prefix_of("shellsort").unwrap(), Some("shells"));
        assert_eq!(t.longest_prefix_of("shell").unwrap(), Some("she"));
        assert_eq!(t.longest_prefix_of("quicksort").unwrap(), None);
    }

    #[test]
    fn test_random_strings_are_seeded_and_bounded() {
        let a = random_strings(&mut ChaCha8Rng::seed_from_u64(1), 50, 10);
        let b = random_strings(&mut ChaCha8Rng::seed_from_u64(1), 50, 10);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| !s.is_empty() && s.len() < 10));
        assert!(a.iter().all(|s| s.bytes().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_setup_orders_input() {
        let def = TernarySearchTrieBenchmarks::new(3);
        let domains = def.parameters();
        assert_eq!(combinations(&domains).len(), 18);

        for combo in combinations(&domains) {
            let mut input = def.construct(&combo).unwrap();
            def.setup(&mut input).unwrap();
            assert_eq!(input.strings().len(), combo.usize("NumStrings").unwrap());

            let mut sorted = input.strings().to_vec();
            sorted.sort();
            match input.order {
                StringOrder::SortedAsc => assert_eq!(input.strings(), sorted.as_slice()),
                StringOrder::SortedDesc => {
                    sorted.reverse();
                    assert_eq!(input.strings(), sorted.as_slice());
                }
                StringOrder::Random => {}
            }
        }
    }

    #[test]
    fn test_unknown_order_is_invalid_parameter() {
        assert!(matches!(
            StringOrder::parse("shuffled"),
            Err(BenchError::InvalidParameter { .. })
        ));
    }
}
