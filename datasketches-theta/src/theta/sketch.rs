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

//! Update theta sketch
//!
//! This module provides ThetaSketch, the mutable sketch that ingests items, and its builder.

use std::fmt;
use std::hash::Hash;

use crate::common::ResizeFactor;
use crate::common::canonical_double;
use crate::error::Error;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::TableConfig;
use crate::theta::hash_table::ThetaHashTable;
use crate::theta::view::write_entries;
use crate::theta::view::write_summary;

/// Mutable theta sketch for building from input data
///
/// # Examples
///
/// ```
/// use datasketches_theta::theta::ThetaSketch;
/// use datasketches_theta::theta::ThetaSketchView;
///
/// let mut sketch = ThetaSketch::builder().lg_k(10).build().unwrap();
/// for i in 0..500 {
///     sketch.update(i);
/// }
/// assert_eq!(sketch.estimate(), 500.0);
/// assert!(!sketch.is_estimation_mode());
/// ```
#[derive(Debug, Clone)]
pub struct ThetaSketch {
    table: ThetaHashTable,
}

impl ThetaSketch {
    /// Create a new builder for ThetaSketch
    pub fn builder() -> ThetaSketchBuilder {
        ThetaSketchBuilder::default()
    }

    /// Update the sketch with a hashable value.
    ///
    /// The value is hashed through its [`Hash`] implementation, so the type is part of the
    /// item: `1u32` and `1u64` are distinct items, and `""` is an item like any other string.
    /// Use [`update_str`](Self::update_str) to skip empty strings.
    ///
    /// For `f32`/`f64` values, use `update_f32`/`update_f64` instead.
    pub fn update<T: Hash>(&mut self, value: T) {
        let hash = self.table.hash_and_screen(value);
        self.insert_hash(hash);
    }

    /// Update the sketch with the UTF-8 bytes of a string. An empty string is ignored.
    pub fn update_str(&mut self, value: &str) {
        self.update_bytes(value.as_bytes());
    }

    /// Update the sketch with raw bytes. An empty slice is ignored.
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        let hash = self.table.hash_bytes_and_screen(bytes);
        self.insert_hash(hash);
    }

    /// Update the sketch with a f64 value.
    ///
    /// `-0.0` and `0.0` count as the same item, as do all NaN values.
    pub fn update_f64(&mut self, value: f64) {
        self.update(canonical_double(value));
    }

    /// Update the sketch with a f32 value.
    pub fn update_f32(&mut self, value: f32) {
        self.update_f64(value as f64);
    }

    fn insert_hash(&mut self, hash: u64) {
        if hash == 0 {
            return;
        }
        let (index, found) = self.table.find(hash);
        if !found {
            self.table.insert(index, hash, ());
        }
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// Return the resize factor
    pub fn resize_factor(&self) -> ResizeFactor {
        self.table.resize_factor()
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

    /// Returns an immutable copy of this sketch, with hashes sorted if `ordered` is true.
    pub fn compact(&self, ordered: bool) -> CompactThetaSketch {
        let mut entries: Vec<u64> = self.table.iter().collect();
        if ordered {
            entries.sort_unstable();
        }
        CompactThetaSketch::new(
            self.table.is_empty(),
            ordered,
            self.table.seed_hash(),
            self.table.theta(),
            entries,
        )
    }
}

impl ThetaSketchView for ThetaSketch {
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

impl fmt::Display for ThetaSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, "Update theta sketch", self, &table_specifics(&self.table))?;
        if f.alternate() {
            write_entries(f, self.iter().map(|hash| (hash, None::<()>)))?;
        }
        Ok(())
    }
}

/// Rows describing the table layout of an update sketch.
pub(crate) fn table_specifics<S>(table: &ThetaHashTable<S>) -> [(&'static str, String); 3] {
    [
        ("lg nominal size", table.lg_nom_size().to_string()),
        ("lg current size", table.lg_cur_size().to_string()),
        ("resize factor", table.resize_factor().value().to_string()),
    ]
}

/// Builder for ThetaSketch
#[derive(Debug, Clone, Default)]
pub struct ThetaSketchBuilder {
    config: TableConfig,
}

impl ThetaSketchBuilder {
    /// Set lg_k (log2 of nominal size k). Must be in range [5, 26].
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        self.config.lg_k = lg_k;
        self
    }

    /// Set the log2 of the initial table size, overriding the size derived from the resize
    /// factor. Must be in range [5, lg_k + 1].
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

    /// Build the ThetaSketch.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if any
    /// parameter is out of range.
    pub fn build(self) -> Result<ThetaSketch, Error> {
        let table = self.config.build_table()?;
        Ok(ThetaSketch { table })
    }
}
