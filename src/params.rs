//! Cartesian expansion of parameter domains into configurations.

use crate::definition::{ParameterCombination, ParameterDomain};

/// Lazily enumerates every combination of the given domains.
///
/// The last declared parameter varies fastest. No domains yields a single
/// empty combination; any empty domain yields nothing.
pub fn combinations(domains: &[ParameterDomain]) -> Combinations<'_> {
    let exhausted = domains.iter().any(|d| d.values.is_empty());
    Combinations {
        domains,
        indices: vec![0; domains.len()],
        remaining: if exhausted {
            0
        } else {
            domains.iter().map(|d| d.values.len()).product()
        },
    }
}

/// Iterator returned by [`combinations`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    domains: &'a [ParameterDomain],
    indices: Vec<usize>,
    remaining: usize,
}

impl Combinations<'_> {
    // Odometer step: bump the last index, carrying leftwards.
    fn advance(&mut self) {
        for (slot, domain) in self.indices.iter_mut().zip(self.domains).rev() {
            *slot += 1;
            if *slot < domain.values.len() {
                return;
            }
            *slot = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = ParameterCombination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let combination = self
            .domains
            .iter()
            .zip(&self.indices)
            .fold(ParameterCombination::empty(), |acc, (domain, &i)| {
                acc.with(&domain.name, domain.values[i].clone())
            });

        self.remaining -= 1;
        self.advance();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}
