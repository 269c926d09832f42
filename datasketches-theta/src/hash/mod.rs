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

//! Seeded hashing of input items into 63-bit sketch keys.
//!
//! Every item fed to a sketch is hashed with MurmurHash3 (x64, 128-bit) using the sketch seed.
//! The first 64-bit word shifted right by one bit becomes the key, so keys fit into the positive
//! range of a signed 64-bit integer. The key `0` is reserved to mark empty slots; an item hashing
//! to it is discarded.

use std::hash::Hash;
use std::hash::Hasher;

mod murmurhash;

pub(crate) use self::murmurhash::MurmurHash3X64128;

/// The seed 9001 used in the sketch update methods is a prime number that was chosen very early
/// on in experimental testing.
///
/// In order to perform set operations on two sketches it is critical that the same hash function
/// and seed are identical for both sketches, otherwise the assumed 1:1 relationship between the
/// original source key value and the hashed bit string would be violated.
pub const DEFAULT_UPDATE_SEED: u64 = 9001;

/// Computes the 16-bit seed hash (fingerprint) of the given seed.
///
/// Sketches only record this fingerprint, which is enough to cheaply reject combining sketches
/// built with different seeds without revealing the seed itself.
///
/// # Panics
///
/// Panics if the computed seed hash is zero, which is reserved.
///
/// # Examples
///
/// ```
/// # use datasketches_theta::hash::compute_seed_hash;
/// # use datasketches_theta::hash::DEFAULT_UPDATE_SEED;
/// assert_eq!(compute_seed_hash(DEFAULT_UPDATE_SEED), compute_seed_hash(9001));
/// assert_ne!(compute_seed_hash(1), compute_seed_hash(2));
/// ```
pub fn compute_seed_hash(seed: u64) -> u16 {
    let seed_hash = raw_seed_hash(seed);
    assert_ne!(seed_hash, 0, "seed {seed} produces the reserved seed hash 0");
    seed_hash
}

/// Seed hash without the reserved-value check. Builders use it to reject such seeds up front.
pub(crate) fn raw_seed_hash(seed: u64) -> u16 {
    let mut hasher = MurmurHash3X64128::with_seed(0);
    hasher.write(&seed.to_le_bytes());
    let (h1, _) = hasher.finish128();
    (h1 & 0xffff) as u16
}

/// Hashes raw bytes into a sketch key with the given seed.
///
/// The result is `0` (the discard sentinel) for an empty slice.
pub fn hash_bytes(bytes: &[u8], seed: u64) -> u64 {
    if bytes.is_empty() {
        return 0;
    }
    let mut hasher = MurmurHash3X64128::with_seed(seed);
    hasher.write(bytes);
    to_key(hasher.finish128().0)
}

/// Hashes a value through its [`Hash`] implementation into a sketch key with the given seed.
pub fn hash_value<T: Hash>(value: T, seed: u64) -> u64 {
    let mut hasher = MurmurHash3X64128::with_seed(seed);
    value.hash(&mut hasher);
    to_key(hasher.finish128().0)
}

// Drop the top bit to stay compatible with the Java implementation.
fn to_key(h1: u64) -> u64 {
    h1 >> 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_63_bit() {
        for i in 0..1000u64 {
            assert!(hash_value(i, DEFAULT_UPDATE_SEED) <= i64::MAX as u64);
            assert!(hash_bytes(&i.to_le_bytes(), DEFAULT_UPDATE_SEED) <= i64::MAX as u64);
        }
    }

    #[test]
    fn test_seed_changes_key() {
        assert_ne!(hash_value("apple", 1), hash_value("apple", 2));
        assert_eq!(hash_value("apple", 7), hash_value("apple", 7));
    }

    #[test]
    fn test_empty_bytes_are_discarded() {
        assert_eq!(hash_bytes(&[], DEFAULT_UPDATE_SEED), 0);
        assert_ne!(hash_bytes(&[0], DEFAULT_UPDATE_SEED), 0);
    }

    #[test]
    fn test_seed_hash_is_stable() {
        assert_eq!(compute_seed_hash(42), compute_seed_hash(42));
        assert_ne!(compute_seed_hash(DEFAULT_UPDATE_SEED), 0);
        assert_eq!(raw_seed_hash(42), compute_seed_hash(42));
    }

    #[test]
    #[should_panic(expected = "reserved seed hash 0")]
    fn test_reserved_seed_hash() {
        assert_eq!(raw_seed_hash(50541), 0);
        compute_seed_hash(50541);
    }
}
