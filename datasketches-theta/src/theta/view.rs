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

use crate::common::NumStdDev;
use crate::common::binomial_bounds;
use crate::theta::hash_table::MAX_THETA;

/// Read-only contract shared by every theta-family sketch.
///
/// Update sketches, compact sketches and tuple sketches all implement this trait, which is what
/// unions accept as input. Estimation and bounds are derived from the few required accessors.
pub trait ThetaSketchView {
    /// Returns true if the sketch never received an item.
    fn is_empty(&self) -> bool;

    /// Returns true if [`iter`](Self::iter) yields hashes in ascending order.
    fn is_ordered(&self) -> bool;

    /// Returns theta as a raw 64-bit threshold.
    fn theta64(&self) -> u64;

    /// Returns the number of retained hashes.
    fn num_retained(&self) -> usize;

    /// Returns the 16-bit fingerprint of the seed the sketch was built with.
    fn seed_hash(&self) -> u16;

    /// Returns an iterator over the retained hashes.
    fn iter(&self) -> impl Iterator<Item = u64> + '_;

    /// Returns theta as a fraction (0.0 to 1.0]
    fn theta(&self) -> f64 {
        self.theta64() as f64 / MAX_THETA as f64
    }

    /// Returns true if the sketch holds a sample rather than every distinct hash it saw.
    fn is_estimation_mode(&self) -> bool {
        self.theta64() < MAX_THETA && !self.is_empty()
    }

    /// Returns the estimated number of distinct items.
    fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.num_retained() as f64 / self.theta()
    }

    /// Returns the approximate lower error bound given the number of standard deviations.
    fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
            .expect("theta should always be valid")
    }

    /// Returns the approximate upper error bound given the number of standard deviations.
    fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::upper_bound(self.num_retained() as u64, self.theta(), num_std_dev)
            .expect("theta should always be valid")
    }
}

/// Writes the multi-line summary used by the `Display` impls of all sketches.
///
/// `specifics` are extra `(label, value)` rows appended after the common ones.
pub(crate) fn write_summary<V: ThetaSketchView>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    sketch: &V,
    specifics: &[(&str, String)],
) -> fmt::Result {
    writeln!(f, "### {name} summary:")?;
    write_row(f, "num retained entries", sketch.num_retained())?;
    write_row(f, "seed hash", sketch.seed_hash())?;
    write_row(f, "empty?", sketch.is_empty())?;
    write_row(f, "ordered?", sketch.is_ordered())?;
    write_row(f, "estimation mode?", sketch.is_estimation_mode())?;
    write_row(f, "theta (fraction)", sketch.theta())?;
    write_row(f, "theta (raw 64-bit)", sketch.theta64())?;
    write_row(f, "estimate", sketch.estimate())?;
    write_row(f, "lower bound 95% conf", sketch.lower_bound(NumStdDev::Two))?;
    write_row(f, "upper bound 95% conf", sketch.upper_bound(NumStdDev::Two))?;
    for (label, value) in specifics {
        write_row(f, label, value)?;
    }
    writeln!(f, "### End sketch summary")
}

/// Writes one line per retained entry, framed like the summary.
pub(crate) fn write_entries<I, D>(f: &mut fmt::Formatter<'_>, entries: I) -> fmt::Result
where
    I: IntoIterator<Item = (u64, Option<D>)>,
    D: fmt::Debug,
{
    writeln!(f, "### Retained entries")?;
    for (hash, summary) in entries {
        match summary {
            Some(summary) => writeln!(f, "{hash}: {summary:?}")?,
            None => writeln!(f, "{hash}")?,
        }
    }
    writeln!(f, "### End retained entries")
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "   {label:<21}: {value}")
}
