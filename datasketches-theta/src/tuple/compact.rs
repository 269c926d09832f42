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

use crate::error::Error;
use crate::theta::ThetaSketchView;
use crate::theta::check_compact_keys;
use crate::theta::view::write_entries;
use crate::theta::view::write_summary;
use crate::tuple::TupleSketchView;

/// A compact, immutable tuple sketch.
///
/// Produced by [`TupleSketch::compact`](super::TupleSketch::compact) and
/// [`TupleUnion::get_result`](super::TupleUnion::get_result).
#[derive(Debug, Clone, PartialEq)]
pub struct CompactTupleSketch<S> {
    is_empty: bool,
    is_ordered: bool,
    seed_hash: u16,
    theta: u64,
    entries: Vec<(u64, S)>,
}

impl<S> CompactTupleSketch<S> {
    pub(crate) fn new(
        is_empty: bool,
        is_ordered: bool,
        seed_hash: u16,
        theta: u64,
        entries: Vec<(u64, S)>,
    ) -> Self {
        debug_assert!(
            check_compact_keys(is_empty, is_ordered, theta, entries.iter().map(|(h, _)| *h))
                .is_ok()
        );
        Self {
            is_empty,
            is_ordered,
            seed_hash,
            theta,
            entries,
        }
    }

    /// Assembles a compact tuple sketch from externally supplied parts.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidData`](crate::error::ErrorKind::InvalidData) error under the same
    /// conditions as [`CompactThetaSketch::from_parts`](crate::theta::CompactThetaSketch::from_parts).
    pub fn from_parts(
        is_empty: bool,
        is_ordered: bool,
        seed_hash: u16,
        theta: u64,
        entries: Vec<(u64, S)>,
    ) -> Result<Self, Error> {
        check_compact_keys(
            is_empty,
            is_ordered,
            theta,
            entries.iter().map(|(hash, _)| *hash),
        )?;
        Ok(Self {
            is_empty,
            is_ordered,
            seed_hash,
            theta,
            entries,
        })
    }

    /// Consumes the sketch, returning its entries in stored order.
    pub fn into_entries(self) -> Vec<(u64, S)> {
        self.entries
    }
}

impl<S> ThetaSketchView for CompactTupleSketch<S> {
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
        self.entries.iter().map(|(hash, _)| *hash)
    }
}

impl<S> TupleSketchView for CompactTupleSketch<S> {
    type Summary = S;

    fn entries(&self) -> impl Iterator<Item = (u64, &S)> + '_ {
        self.entries.iter().map(|(hash, summary)| (*hash, summary))
    }
}

impl<S: fmt::Debug> fmt::Display for CompactTupleSketch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, "Compact tuple sketch", self, &[])?;
        if f.alternate() {
            write_entries(
                f,
                self.entries().map(|(hash, summary)| (hash, Some(summary))),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::theta::MAX_THETA;

    #[test]
    fn test_from_parts() {
        let sketch =
            CompactTupleSketch::from_parts(false, true, 1, MAX_THETA, vec![(3, "c"), (8, "h")])
                .unwrap();
        assert_eq!(sketch.estimate(), 2.0);
        assert_eq!(sketch.iter().collect::<Vec<_>>(), vec![3, 8]);
        assert_eq!(sketch.entries().nth(1), Some((8, &"h")));
        assert_eq!(sketch.into_entries(), vec![(3, "c"), (8, "h")]);
    }

    #[test]
    fn test_from_parts_rejects_invalid_data() {
        let err = CompactTupleSketch::from_parts(false, true, 1, MAX_THETA, vec![(8, 1), (3, 2)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        let err = CompactTupleSketch::from_parts(false, false, 1, 5, vec![(3, 1), (5, 2)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        let err = CompactTupleSketch::from_parts(true, true, 1, MAX_THETA, vec![(3, 1)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_display() {
        let sketch =
            CompactTupleSketch::from_parts(false, true, 1, MAX_THETA, vec![(3, 1.5)]).unwrap();
        let summary = format!("{sketch}");
        assert!(summary.starts_with("### Compact tuple sketch summary:"));
        assert!(summary.contains("estimate             : 1"));
        assert!(format!("{sketch:#}").contains("3: 1.5"));
    }
}
