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

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::TableConfig;
use crate::theta::union_state::UnionInput;
use crate::theta::union_state::UnionState;

/// Stateful union operator for Theta sketches.
///
/// Any number of sketches built with the same seed can be folded in with
/// [`update`](Self::update); [`get_result`](Self::get_result) returns their union as a compact
/// sketch of at most k entries.
///
/// # Examples
///
/// ```
/// use datasketches_theta::theta::ThetaSketch;
/// use datasketches_theta::theta::ThetaSketchView;
/// use datasketches_theta::theta::ThetaUnion;
///
/// let mut a = ThetaSketch::builder().build().unwrap();
/// let mut b = ThetaSketch::builder().build().unwrap();
/// for i in 0..100 {
///     a.update(i);
///     b.update(i + 50);
/// }
///
/// let mut union = ThetaUnion::builder().build().unwrap();
/// union.update(&a).unwrap();
/// union.update(&b.compact(true)).unwrap();
/// assert_eq!(union.get_result(true).estimate(), 150.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThetaUnion {
    state: UnionState<()>,
}

impl ThetaUnion {
    /// Create a new builder for ThetaUnion
    pub fn builder() -> ThetaUnionBuilder {
        ThetaUnionBuilder::default()
    }

    /// Updates the union with a given sketch.
    ///
    /// # Errors
    ///
    /// Returns an [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) error if
    /// the sketch was built with a different seed than the sketches already in the union. The
    /// union is unchanged in that case.
    pub fn update<V: ThetaSketchView>(&mut self, sketch: &V) -> Result<(), Error> {
        let input = UnionInput {
            is_empty: sketch.is_empty(),
            is_ordered: sketch.is_ordered(),
            seed_hash: sketch.seed_hash(),
            theta: sketch.theta64(),
            entries: sketch.iter().map(|hash| (hash, &())),
        };
        self.state.update(input, |_, _| Ok(()))
    }

    /// Returns the union of all sketches seen so far as a compact sketch.
    ///
    /// The union is not modified and can keep ingesting sketches.
    pub fn get_result(&self, ordered: bool) -> CompactThetaSketch {
        let result = self.state.result(ordered);
        CompactThetaSketch::new(
            result.is_empty,
            result.is_ordered,
            result.seed_hash,
            result.theta,
            result.entries.into_iter().map(|(hash, _)| hash).collect(),
        )
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.state.lg_k()
    }

    /// Returns the running union theta as u64
    pub fn theta64(&self) -> u64 {
        self.state.theta64()
    }

    /// Reset the union to its freshly built state
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

/// Builder for ThetaUnion
#[derive(Debug, Clone, Default)]
pub struct ThetaUnionBuilder {
    config: TableConfig,
}

impl ThetaUnionBuilder {
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

    /// Set hash seed. Only its fingerprint is used, as the result seed hash of an empty union.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Build the ThetaUnion.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if any
    /// parameter is out of range.
    pub fn build(self) -> Result<ThetaUnion, Error> {
        let table = self.config.build_table()?;
        Ok(ThetaUnion {
            state: UnionState::new(table),
        })
    }
}
