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

//! Compact Theta sketch implementation
//!
//! A CompactThetaSketch is an immutable snapshot of a Theta sketch. It stores only the essential
//! data needed for estimation and set operations:
//! - Theta value (sampling threshold)
//! - Retained hash values, optionally sorted
//! - Seed hash for validation

use std::collections::HashSet;
use std::fmt;

use crate::error::Error;
use crate::theta::ThetaSketchView;
use crate::theta::view::write_entries;
use crate::theta::view::write_summary;

/// A compact, immutable Theta sketch.
///
/// Produced by [`ThetaSketch::compact`](super::ThetaSketch::compact) and
/// [`ThetaUnion::get_result`](super::ThetaUnion::get_result). It owns its entries; nothing is
/// shared with the sketch it was taken from.
///
/// # Example
///
/// ```
/// use datasketches_theta::theta::ThetaSketch;
/// use datasketches_theta::theta::ThetaSketchView;
///
/// let mut sketch = ThetaSketch::builder().build().unwrap();
/// sketch.update("apple");
/// sketch.update("banana");
///
/// let compact = sketch.compact(true);
/// assert!(compact.is_ordered());
/// assert_eq!(compact.estimate(), sketch.estimate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactThetaSketch {
    is_empty: bool,
    is_ordered: bool,
    seed_hash: u16,
    theta: u64,
    entries: Vec<u64>,
}

impl CompactThetaSketch {
    /// Create a new compact sketch from components that are known to be valid.
    pub(crate) fn new(
        is_empty: bool,
        is_ordered: bool,
        seed_hash: u16,
        theta: u64,
        entries: Vec<u64>,
    ) -> Self {
        debug_assert!(
            check_compact_keys(is_empty, is_ordered, theta, entries.iter().copied()).is_ok()
        );
        Self {
            is_empty,
            is_ordered,
            seed_hash,
            theta,
            entries,
        }
    }

    /// Assembles a compact sketch from externally supplied parts, such as those read by a codec.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidData`](crate::error::ErrorKind::InvalidData) error if the parts could
    /// not have been produced by a sketch: theta is zero, a key is zero or not below theta, keys
    /// repeat, an ordered sketch is not strictly ascending, or an empty sketch has entries.
    pub fn from_parts(
        is_empty: bool,
        is_ordered: bool,
        seed_hash: u16,
        theta: u64,
        entries: Vec<u64>,
    ) -> Result<Self, Error> {
        check_compact_keys(is_empty, is_ordered, theta, entries.iter().copied())?;
        Ok(Self {
            is_empty,
            is_ordered,
            seed_hash,
            theta,
            entries,
        })
    }

    /// Returns the retained hashes in stored order.
    pub fn entries(&self) -> &[u64] {
        &self.entries
    }
}

impl ThetaSketchView for CompactThetaSketch {
    fn is_empty(&self) -> bool {
        self.is_empty
    }

    fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    fn theta64(&self) -> u64 {
        self.theta
    }

    fn num_retained(&self) -> usize {
        self.entries.len()
    }

    fn seed_hash(&self) -> u16 {
        self.seed_hash
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied()
    }
}

impl fmt::Display for CompactThetaSketch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, "Compact theta sketch", self, &[])?;
        if f.alternate() {
            write_entries(f, self.iter().map(|hash| (hash, None::<()>)))?;
        }
        Ok(())
    }
}

/// Checks the invariants every compact sketch upholds over its keys.
pub(crate) fn check_compact_keys(
    is_empty: bool,
    is_ordered: bool,
    theta: u64,
    keys: impl ExactSizeIterator<Item = u64>,
) -> Result<(), Error> {
    if theta == 0 {
        return Err(Error::invalid_data("theta must be positive"));
    }
    if is_empty && keys.len() > 0 {
        return Err(Error::invalid_data("empty sketch must not have entries")
            .with_context("num_entries", keys.len()));
    }

    let mut seen = HashSet::with_capacity(if is_ordered { 0 } else { keys.len() });
    let mut previous = 0u64;
    for (index, key) in keys.enumerate() {
        if key == 0 || key >= theta {
            return Err(Error::invalid_data("entry is not in the range (0, theta)")
                .with_context("index", index)
                .with_context("key", key)
                .with_context("theta", theta));
        }
        if is_ordered {
            if key <= previous {
                return Err(Error::invalid_data("ordered entries must be strictly ascending")
                    .with_context("index", index)
                    .with_context("key", key));
            }
            previous = key;
        } else if !seen.insert(key) {
            return Err(Error::invalid_data("duplicate entry")
                .with_context("index", index)
                .with_context("key", key));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hash::DEFAULT_UPDATE_SEED;
    use crate::hash::compute_seed_hash;
    use crate::theta::MAX_THETA;

    #[test]
    fn test_empty_compact_sketch() {
        let seed_hash = compute_seed_hash(DEFAULT_UPDATE_SEED);
        let sketch =
            CompactThetaSketch::from_parts(true, true, seed_hash, MAX_THETA, vec![]).unwrap();
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0.0);
        assert_eq!(sketch.num_retained(), 0);
        assert!(!sketch.is_estimation_mode());
        assert_eq!(sketch.seed_hash(), seed_hash);
    }

    #[test]
    fn test_compact_sketch_with_entries() {
        let sketch =
            CompactThetaSketch::from_parts(false, true, 1, MAX_THETA, vec![100, 200, 300]).unwrap();
        assert_eq!(sketch.num_retained(), 3);
        assert_eq!(sketch.estimate(), 3.0);
        assert_eq!(sketch.iter().collect::<Vec<_>>(), vec![100, 200, 300]);
        assert_eq!(sketch.entries(), &[100, 200, 300]);
    }

    #[test]
    fn test_compact_sketch_estimation_mode() {
        let theta = MAX_THETA / 2;
        let sketch = CompactThetaSketch::from_parts(false, false, 1, theta, vec![300, 100, 200])
            .unwrap();
        assert!(sketch.is_estimation_mode());
        assert!((sketch.estimate() - 6.0).abs() < 1e-6);
        assert!(sketch.lower_bound(crate::common::NumStdDev::Two) <= sketch.estimate());
        assert!(sketch.upper_bound(crate::common::NumStdDev::Two) >= sketch.estimate());
    }

    #[test]
    fn test_from_parts_rejects_invalid_data() {
        let cases: Vec<(bool, bool, u64, Vec<u64>)> = vec![
            (false, false, 0, vec![]),
            (true, false, MAX_THETA, vec![1]),
            (false, false, MAX_THETA, vec![0]),
            (false, false, 100, vec![100]),
            (false, false, MAX_THETA, vec![5, 7, 5]),
            (false, true, MAX_THETA, vec![5, 7, 6]),
            (false, true, MAX_THETA, vec![5, 5]),
        ];
        for (is_empty, is_ordered, theta, entries) in cases {
            let err = CompactThetaSketch::from_parts(is_empty, is_ordered, 1, theta, entries)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidData);
        }
    }

    #[test]
    fn test_unordered_sketch_accepts_any_order() {
        let sketch =
            CompactThetaSketch::from_parts(false, false, 1, MAX_THETA, vec![9, 3, 7]).unwrap();
        assert!(!sketch.is_ordered());
        assert_eq!(sketch.entries(), &[9, 3, 7]);
    }
}
