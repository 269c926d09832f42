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

use std::marker::PhantomData;

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::theta::hash_table::TableConfig;
use crate::theta::union_state::UnionInput;
use crate::theta::union_state::UnionState;
use crate::tuple::AdditivePolicy;
use crate::tuple::CompactTupleSketch;
use crate::tuple::MergePolicy;
use crate::tuple::TupleSketchView;

/// Stateful union operator for tuple sketches.
///
/// Hashes present in several inputs keep one entry whose summary is merged with the policy `P`,
/// [`AdditivePolicy`] by default.
///
/// # Examples
///
/// ```
/// use datasketches_theta::theta::ThetaSketchView;
/// use datasketches_theta::tuple::TupleSketch;
/// use datasketches_theta::tuple::TupleSketchView;
/// use datasketches_theta::tuple::TupleUnion;
///
/// let mut a = TupleSketch::<u32>::builder().build().unwrap();
/// let mut b = TupleSketch::<u32>::builder().build().unwrap();
/// a.update("x", 3).unwrap();
/// b.update("x", 4).unwrap();
///
/// let mut union = TupleUnion::<u32>::builder().build().unwrap();
/// union.update(&a).unwrap();
/// union.update(&b).unwrap();
/// let result = union.get_result(true);
/// assert_eq!(result.num_retained(), 1);
/// assert_eq!(result.entries().next().unwrap().1, &7);
/// ```
#[derive(Debug, Clone)]
pub struct TupleUnion<S, P = AdditivePolicy> {
    state: UnionState<S>,
    policy: P,
}

impl<S> TupleUnion<S> {
    /// Create a new builder for TupleUnion
    pub fn builder() -> TupleUnionBuilder<S> {
        TupleUnionBuilder::default()
    }
}

impl<S, P> TupleUnion<S, P>
where
    S: Default + Clone,
    P: MergePolicy<S>,
{
    /// Updates the union with a given sketch.
    ///
    /// # Errors
    ///
    /// Returns an [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) error if
    /// the seed of the sketch differs from the sketches already in the union, or the error of the
    /// merge policy. In both cases the union is unchanged.
    pub fn update<'a, V>(&mut self, sketch: &'a V) -> Result<(), Error>
    where
        V: TupleSketchView<Summary = S>,
        S: 'a,
    {
        let input = UnionInput {
            is_empty: sketch.is_empty(),
            is_ordered: sketch.is_ordered(),
            seed_hash: sketch.seed_hash(),
            theta: sketch.theta64(),
            entries: sketch.entries(),
        };
        let policy = &self.policy;
        self.state
            .update(input, |existing, incoming| policy.merge(existing, incoming))
    }

    /// Returns the union of all sketches seen so far as a compact sketch.
    ///
    /// The union is not modified and can keep ingesting sketches.
    pub fn get_result(&self, ordered: bool) -> CompactTupleSketch<S> {
        let result = self.state.result(ordered);
        CompactTupleSketch::new(
            result.is_empty,
            result.is_ordered,
            result.seed_hash,
            result.theta,
            result.entries,
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

    /// Return the merge policy
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

/// Builder for TupleUnion
#[derive(Debug, Clone)]
pub struct TupleUnionBuilder<S, P = AdditivePolicy> {
    config: TableConfig,
    policy: P,
    _summary: PhantomData<fn() -> S>,
}

impl<S> Default for TupleUnionBuilder<S> {
    fn default() -> Self {
        Self {
            config: TableConfig::default(),
            policy: AdditivePolicy,
            _summary: PhantomData,
        }
    }
}

impl<S, P> TupleUnionBuilder<S, P> {
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

    /// Set the policy that merges the summaries of hashes found in several sketches.
    pub fn policy<Q: MergePolicy<S>>(self, policy: Q) -> TupleUnionBuilder<S, Q> {
        TupleUnionBuilder {
            config: self.config,
            policy,
            _summary: PhantomData,
        }
    }
}

impl<S, P> TupleUnionBuilder<S, P>
where
    S: Default + Clone,
    P: MergePolicy<S>,
{
    /// Build the TupleUnion.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if any
    /// parameter is out of range.
    pub fn build(self) -> Result<TupleUnion<S, P>, Error> {
        let table = self.config.build_table()?;
        Ok(TupleUnion {
            state: UnionState::new(table),
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::theta::MAX_THETA;
    use crate::theta::ThetaSketchView;
    use crate::tuple::TupleSketch;

    #[test]
    fn test_empty_union() {
        let union = TupleUnion::<u64>::builder().lg_k(10).build().unwrap();
        let result = union.get_result(true);
        assert!(result.is_empty());
        assert_eq!(result.theta64(), MAX_THETA);
        assert_eq!(union.lg_k(), 10);
        assert_eq!(union.policy(), &AdditivePolicy);
    }

    #[test]
    fn test_custom_policy() {
        let keep_max = |a: &u32, b: &u32| -> Result<u32, Error> { Ok(*a.max(b)) };
        let mut union = TupleUnion::<u32>::builder()
            .policy(keep_max)
            .build()
            .unwrap();
        for summary in [5, 9, 2] {
            let mut sketch = TupleSketch::<u32>::builder().build().unwrap();
            sketch.update("key", summary).unwrap();
            union.update(&sketch).unwrap();
        }
        let result = union.get_result(false);
        assert_eq!(result.into_entries()[0].1, 9);
    }

    #[test]
    fn test_policy_failure_is_returned() {
        let reject = |_: &u32, _: &u32| -> Result<u32, Error> {
            Err(Error::new(ErrorKind::PolicyFailure, "conflict"))
        };
        let mut union = TupleUnion::<u32>::builder().policy(reject).build().unwrap();
        let mut sketch = TupleSketch::<u32>::builder().build().unwrap();
        sketch.update(1, 1).unwrap();
        union.update(&sketch).unwrap();

        let err = union.update(&sketch.compact(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyFailure);
        assert_eq!(err.message(), "conflict");
        assert_eq!(union.get_result(true).into_entries()[0].1, 1);
    }
}
