// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::common::ResizeFactor;
use crate::common::canonical_double;
use crate::error::Error;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::TableConfig;
use crate::theta::hash_table::ThetaHashTable;
use crate::theta::table_specifics;
use crate::theta::view::write_entries;
use crate::theta::view::write_summary;
use crate::tuple::AdditivePolicy;
use crate::tuple::CompactTupleSketch;
use crate::tuple::MergePolicy;
use crate::tuple::TupleSketchView;

/// Mutable tuple sketch: a theta sketch that attaches a summary to every retained hash.
///
/// The first time an item is retained its summary is stored as given. Later updates with the
/// same item combine the stored summary with the new one through the merge policy `P`.
///
/// # Examples
///
/// ```
/// use datasketches_theta::theta::ThetaSketchView;
/// use datasketches_theta::tuple::TupleSketch;
/// use datasketches_theta::tuple::TupleSketchView;
///
/// let mut sketch = TupleSketch::<u64>::builder().build().unwrap();
/// sketch.update("apple", 3).unwrap();
/// sketch.update("apple", 4).unwrap();
/// assert_eq!(sketch.num_retained(), 1);
/// assert_eq!(sketch.entries().next().unwrap().1, &7);
/// ```
#[derive(Debug, Clone)]
pub struct TupleSketch<S, P = AdditivePolicy> {
    table: ThetaHashTable<S>,
    policy: P,
}

impl<S> TupleSketch<S> {
    /// Create a new builder for TupleSketch, using [`AdditivePolicy`] unless another policy is
    /// set.
    pub fn builder() -> TupleSketchBuilder<S> {
        TupleSketchBuilder::default()
    }
}

impl<S, P> TupleSketch<S, P>
where
    S: Default + Clone,
    P: MergePolicy<S>,
{
    /// Update the sketch with a hashable value and its summary.
    ///
    /// Hashing follows [`ThetaSketch::update`](crate::theta::ThetaSketch::update): the value's
    /// type is part of the item, and `""` is not skipped (see [`update_str`](Self::update_str)).
    ///
    /// # Errors
    ///
    /// Returns the error of the merge policy if the item was already retained and merging
    /// failed. The stored summary is unchanged in that case.
    pub fn update<T: Hash>(&mut self, value: T, summary: S) -> Result<(), Error> {
        let hash = self.table.hash_and_screen(value);
        self.insert_hash(hash, summary)
    }

    /// Update the sketch with the UTF-8 bytes of a string and a summary. An empty string is
    /// ignored.
    pub fn update_str(&mut self, value: &str, summary: S) -> Result<(), Error> {
        self.update_bytes(value.as_bytes(), summary)
    }

    /// Update the sketch with raw bytes and a summary. An empty slice is ignored.
    pub fn update_bytes(&mut self, bytes: &[u8], summary: S) -> Result<(), Error> {
        let hash = self.table.hash_bytes_and_screen(bytes);
        self.insert_hash(hash, summary)
    }

    /// Update the sketch with a f64 value and a summary.
    pub fn update_f64(&mut self, value: f64, summary: S) -> Result<(), Error> {
        self.update(canonical_double(value), summary)
    }

    /// Update the sketch with a f32 value and a summary.
    pub fn update_f32(&mut self, value: f32, summary: S) -> Result<(), Error> {
        self.update_f64(value as f64, summary)
    }

    fn insert_hash(&mut self, hash: u64, summary: S) -> Result<(), Error> {
        if hash == 0 {
            return Ok(());
        }
        let (index, found) = self.table.find(hash);
        if found {
            let merged = self.policy.merge(self.table.summary(index), &summary)?;
            self.table.replace_summary(index, merged);
        } else {
            self.table.insert(index, hash, summary);
        }
        Ok(())
    }

    /// Shrinks the internal table to the smallest size that fits the retained entries.
    ///
    /// Theta and the retained entries are not changed.
    pub fn trim(&mut self) {
        self.table.trim();
    }

    /// Reset the sketch to empty state
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Returns an immutable copy of this sketch, with entries sorted by hash if `ordered` is
    /// true.
    pub fn compact(&self, ordered: bool) -> CompactTupleSketch<S> {
        let mut entries: Vec<(u64, S)> = self
            .table
            .entries()
            .map(|(hash, summary)| (hash, summary.clone()))
            .collect();
        if ordered {
            entries.sort_unstable_by_key(|(hash, _)| *hash);
        }
        CompactTupleSketch::new(
            self.table.is_empty(),
            ordered,
            self.table.seed_hash(),
            self.table.theta(),
            entries,
        )
    }
}

impl<S, P> TupleSketch<S, P> {
    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// Return the resize factor
    pub fn resize_factor(&self) -> ResizeFactor {
        self.table.resize_factor()
    }

    /// Return the merge policy
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<S, P> ThetaSketchView for TupleSketch<S, P> {
    fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn is_ordered(&self) -> bool {
        false
    }

    fn theta64(&self) -> u64 {
        self.table.theta()
    }

    fn num_retained(&self) -> usize {
        self.table.num_entries()
    }

    fn seed_hash(&self) -> u16 {
        self.table.seed_hash()
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.table.iter()
    }
}

impl<S, P> TupleSketchView for TupleSketch<S, P> {
    type Summary = S;

    fn entries(&self) -> impl Iterator<Item = (u64, &S)> + '_ {
        self.table.entries()
    }
}

impl<S: fmt::Debug, P> fmt::Display for TupleSketch<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, "Update tuple sketch", self, &table_specifics(&self.table))?;
        if f.alternate() {
            write_entries(
                f,
                self.entries().map(|(hash, summary)| (hash, Some(summary))),
            )?;
        }
        Ok(())
    }
}

/// Builder for TupleSketch
#[derive(Debug, Clone)]
pub struct TupleSketchBuilder<S, P = AdditivePolicy> {
    config: TableConfig,
    policy: P,
    _summary: PhantomData<fn() -> S>,
}

impl<S> Default for TupleSketchBuilder<S> {
    fn default() -> Self {
        Self {
            config: TableConfig::default(),
            policy: AdditivePolicy,
            _summary: PhantomData,
        }
    }
}

impl<S, P> TupleSketchBuilder<S, P> {
    /// Set lg_k (log2 of nominal size k). Must be in range [5, 26].
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        self.config.lg_k = lg_k;
        self
    }

    /// Set the log2 of the initial table size. Must be in range [5, lg_k + 1].
    pub fn lg_starting_size(mut self, lg_starting_size: u8) -> Self {
        self.config.lg_starting_size = Some(lg_starting_size);
        self
    }

    /// Set resize factor.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.config.resize_factor = factor;
        self
    }

    /// Set sampling probability p. Must be in range (0.0, 1.0].
    pub fn sampling_probability(mut self, probability: f32) -> Self {
        self.config.sampling_probability = probability;
        self
    }

    /// Set hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the policy that merges the summaries of repeated items.
    pub fn policy<Q: MergePolicy<S>>(self, policy: Q) -> TupleSketchBuilder<S, Q> {
        TupleSketchBuilder {
            config: self.config,
            policy,
            _summary: PhantomData,
        }
    }
}

impl<S, P> TupleSketchBuilder<S, P>
where
    S: Default + Clone,
    P: MergePolicy<S>,
{
    /// Build the TupleSketch.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if any
    /// parameter is out of range.
    pub fn build(self) -> Result<TupleSketch<S, P>, Error> {
        let table = self.config.build_table()?;
        Ok(TupleSketch {
            table,
            policy: self.policy,
        })
    }
}
