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

use std::ops::Add;

use crate::error::Error;

/// Combines the summaries of two entries that share a hash.
///
/// Tuple sketches call the policy when an item is seen again, and tuple unions call it when a
/// hash is present in more than one input. Merging must be a pure function of its arguments: the
/// union computes every merge for an input before applying any of them, so a failure leaves it
/// untouched.
///
/// Any closure `Fn(&S, &S) -> Result<S, Error>` is a policy.
///
/// # Examples
///
/// ```
/// use datasketches_theta::error::Error;
/// use datasketches_theta::tuple::MergePolicy;
///
/// struct KeepMax;
///
/// impl MergePolicy<u32> for KeepMax {
///     fn merge(&self, existing: &u32, incoming: &u32) -> Result<u32, Error> {
///         Ok(*existing.max(incoming))
///     }
/// }
///
/// assert_eq!(KeepMax.merge(&3, &5).unwrap(), 5);
/// let min = |a: &u32, b: &u32| -> Result<u32, Error> { Ok(*a.min(b)) };
/// assert_eq!(min.merge(&3, &5).unwrap(), 3);
/// ```
pub trait MergePolicy<S> {
    /// Returns the summary that replaces `existing` once `incoming` was seen for the same hash.
    ///
    /// # Errors
    ///
    /// Any error is handed back to the caller of the sketch or union operation unchanged.
    fn merge(&self, existing: &S, incoming: &S) -> Result<S, Error>;
}

/// The default policy: summaries are added together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdditivePolicy;

impl<S> MergePolicy<S> for AdditivePolicy
where
    S: Clone + Add<Output = S>,
{
    fn merge(&self, existing: &S, incoming: &S) -> Result<S, Error> {
        Ok(existing.clone() + incoming.clone())
    }
}

impl<S, F> MergePolicy<S> for F
where
    F: Fn(&S, &S) -> Result<S, Error>,
{
    fn merge(&self, existing: &S, incoming: &S) -> Result<S, Error> {
        self(existing, incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_additive_policy() {
        assert_eq!(AdditivePolicy.merge(&3u64, &4u64).unwrap(), 7);
        assert_eq!(AdditivePolicy.merge(&1.5f64, &2.0f64).unwrap(), 3.5);
    }

    #[test]
    fn test_closure_policy() {
        let checked = |a: &u8, b: &u8| -> Result<u8, Error> {
            a.checked_add(*b)
                .ok_or_else(|| Error::new(ErrorKind::PolicyFailure, "overflow"))
        };
        assert_eq!(checked.merge(&200, &55).unwrap(), 255);
        let err = checked.merge(&200, &56).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyFailure);
        assert_eq!(err.message(), "overflow");
    }
}
