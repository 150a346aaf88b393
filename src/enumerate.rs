//! Exhaustive enumeration of fully discrete domains
//!
//! `SampleIter` walks the cartesian product of a domain's finite sets
//! lazily: an odometer over the flattened axes, yielding one complete,
//! independent [`Sample`] per combination. Memory stays bounded by the
//! number of axes, never by the product of their cardinalities.

use crate::domain::{Domain, Leaf};
use crate::error::{DomainError, DomainResult};
use crate::path::AxisPath;
use crate::sample::Sample;
use crate::value::Value;

/// Lazy cartesian-product iterator over a fully discrete domain.
///
/// Created by [`Domain::iter`], which fails up front with
/// [`DomainError::NotIterable`] if any leaf is a continuous range.
/// Restartable: calling `Domain::iter` again yields the same set of
/// samples.
#[derive(Debug, Clone)]
pub struct SampleIter {
    /// Flattened axes with their candidate values in sorted order.
    axes: Vec<(AxisPath, Vec<Value>)>,
    /// Current index into each axis's values.
    cursor: Vec<usize>,
    exhausted: bool,
    remaining: usize,
}

impl SampleIter {
    pub(crate) fn new(domain: &Domain) -> DomainResult<Self> {
        let mut axes = Vec::new();
        for (path, leaf) in domain.flatten() {
            match leaf {
                Leaf::Set(values) => {
                    axes.push((path, values.into_iter().collect::<Vec<_>>()));
                }
                Leaf::Range { .. } => {
                    return Err(DomainError::NotIterable { axis: path });
                }
            }
        }
        let remaining = axes
            .iter()
            .fold(1usize, |acc, (_, values)| acc.saturating_mul(values.len()));
        let cursor = vec![0; axes.len()];
        Ok(Self {
            axes,
            cursor,
            exhausted: false,
            remaining,
        })
    }

    fn current(&self) -> Sample {
        let pairs: Vec<(AxisPath, Value)> = self
            .axes
            .iter()
            .zip(&self.cursor)
            .map(|((path, values), &index)| (path.clone(), values[index].clone()))
            .collect();
        Sample::from_entries(&pairs)
    }

    /// Advance the odometer; rightmost axis varies fastest.
    fn advance(&mut self) {
        let mut pos = self.axes.len();
        loop {
            if pos == 0 {
                self.exhausted = true;
                return;
            }
            pos -= 1;
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.axes[pos].1.len() {
                return;
            }
            self.cursor[pos] = 0;
        }
    }
}

impl Iterator for SampleIter {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.exhausted {
            return None;
        }
        let sample = self.current();
        self.remaining = self.remaining.saturating_sub(1);
        self.advance();
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            (0, Some(0))
        } else {
            (self.remaining, Some(self.remaining))
        }
    }
}

impl ExactSizeIterator for SampleIter {}
