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

use std::hash::Hash;

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::hash_bytes;
use crate::hash::hash_value;
use crate::hash::raw_seed_hash;

/// Maximum theta value (signed max for compatibility with Java)
pub const MAX_THETA: u64 = i64::MAX as u64;

/// Minimum log2 of K
pub const MIN_LG_K: u8 = 5;

/// Maximum log2 of K
pub const MAX_LG_K: u8 = 26;

/// Default log2 of K
pub const DEFAULT_LG_K: u8 = 12;

/// Resize threshold (0.5 = 50% load factor)
const RESIZE_THRESHOLD: f64 = 0.5;

/// Rebuild threshold (15/16 = 93.75% load factor)
const REBUILD_THRESHOLD: f64 = 15.0 / 16.0;

/// Stride hash bits (7 bits for stride calculation)
const STRIDE_HASH_BITS: u8 = 7;

/// Stride mask
const STRIDE_MASK: u64 = (1 << STRIDE_HASH_BITS) - 1;

/// Configuration shared by every builder of a table-backed sketch or union.
#[derive(Debug, Clone)]
pub(crate) struct TableConfig {
    pub lg_k: u8,
    pub lg_starting_size: Option<u8>,
    pub resize_factor: ResizeFactor,
    pub sampling_probability: f32,
    pub seed: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            lg_starting_size: None,
            resize_factor: ResizeFactor::X8,
            sampling_probability: 1.0,
            seed: DEFAULT_UPDATE_SEED,
        }
    }
}

impl TableConfig {
    /// Validates the configuration and creates an empty table from it.
    pub fn build_table<S: Default>(&self) -> Result<ThetaHashTable<S>, Error> {
        if !(MIN_LG_K..=MAX_LG_K).contains(&self.lg_k) {
            return Err(Error::invalid_argument(format!(
                "lg_k must be in [{MIN_LG_K}, {MAX_LG_K}], got {}",
                self.lg_k
            )));
        }
        let lg_max_size = self.lg_k + 1;
        let lg_cur_size = match self.lg_starting_size {
            None => starting_sub_multiple(lg_max_size, MIN_LG_K, self.resize_factor.lg_value()),
            Some(lg) if (MIN_LG_K..=lg_max_size).contains(&lg) => lg,
            Some(lg) => {
                return Err(Error::invalid_argument(format!(
                    "lg_starting_size must be in [{MIN_LG_K}, {lg_max_size}], got {lg}"
                ))
                .with_context("lg_k", self.lg_k));
            }
        };
        let p = self.sampling_probability;
        if !(p > 0.0 && p <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "sampling_probability must be in (0.0, 1.0], got {p}"
            )));
        }
        let theta = starting_theta_from_sampling_probability(p);
        if theta == 0 {
            return Err(Error::invalid_argument(format!(
                "sampling_probability {p} is too small to retain any hash"
            )));
        }
        let seed_hash = raw_seed_hash(self.seed);
        if seed_hash == 0 {
            return Err(
                Error::invalid_argument("seed produces the reserved seed hash 0")
                    .with_context("seed", self.seed),
            );
        }
        Ok(ThetaHashTable::new(
            lg_cur_size,
            self.lg_k,
            self.resize_factor,
            p,
            self.seed,
            seed_hash,
        ))
    }
}

/// Open-addressed hash table of retained keys, each with a summary of type `S`.
///
/// Theta sketches use `S = ()`, which costs no memory per slot. Key `0` marks an empty slot.
///
/// It maintains an array capacity max to 2^(lg_nom_size + 1):
/// * Before it reaches the max capacity, it will extend the array based on resize_factor.
/// * At max capacity, every time the number of entries exceeds the rebuild threshold it will
///   rebuild the table: only keep the 2^lg_nom_size entries with the smallest keys and set theta
///   to the next smallest key.
#[derive(Debug, Clone)]
pub(crate) struct ThetaHashTable<S = ()> {
    lg_cur_size: u8,
    lg_nom_size: u8,
    lg_max_size: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    hash_seed: u64,
    seed_hash: u16,

    theta: u64,
    is_empty: bool,

    keys: Vec<u64>,
    summaries: Vec<S>,
    num_entries: usize,
}

impl<S: Default> ThetaHashTable<S> {
    /// Create a new hash table. Arguments are expected to be validated by [`TableConfig`].
    fn new(
        lg_cur_size: u8,
        lg_nom_size: u8,
        resize_factor: ResizeFactor,
        sampling_probability: f32,
        hash_seed: u64,
        seed_hash: u16,
    ) -> Self {
        let size = 1usize << lg_cur_size;
        Self {
            lg_cur_size,
            lg_nom_size,
            lg_max_size: lg_nom_size + 1,
            resize_factor,
            sampling_probability,
            hash_seed,
            seed_hash,
            theta: starting_theta_from_sampling_probability(sampling_probability),
            is_empty: true,
            keys: vec![0u64; size],
            summaries: default_summaries(size),
            num_entries: 0,
        }
    }

    /// Hash and screen a value
    ///
    /// Returns the key if it passes the theta threshold, otherwise 0. Any value marks the table
    /// as non-empty, even when it is screened out.
    pub fn hash_and_screen<T: Hash>(&mut self, value: T) -> u64 {
        self.is_empty = false;
        self.screen(hash_value(value, self.hash_seed))
    }

    /// Hash and screen raw bytes. An empty slice is ignored and leaves the table untouched.
    pub fn hash_bytes_and_screen(&mut self, bytes: &[u8]) -> u64 {
        if bytes.is_empty() {
            return 0;
        }
        self.is_empty = false;
        self.screen(hash_bytes(bytes, self.hash_seed))
    }

    fn screen(&self, hash: u64) -> u64 {
        if hash >= self.theta {
            return 0; // hash == 0 is reserved for empty slots
        }
        hash
    }

    /// Finds the slot for `key`.
    ///
    /// Returns the index of the slot and whether it already holds `key`. If it does not, the slot
    /// is empty and can be passed to [`insert`](Self::insert).
    pub fn find(&self, key: u64) -> (usize, bool) {
        match Self::find_in_keys(&self.keys, key, self.lg_cur_size) {
            Some(index) => (index, self.keys[index] == key),
            None => unreachable!(
                "Resize or rebuild should be called to make sure it always can find the entry."
            ),
        }
    }

    /// Find index in given keys.
    ///
    /// Returns the index of the key or of the first empty slot on its probe sequence, or None if
    /// the table is full and does not hold the key.
    fn find_in_keys(keys: &[u64], key: u64, lg_size: u8) -> Option<usize> {
        if keys.is_empty() {
            return None;
        }

        let mask = keys.len() - 1;
        let stride = Self::get_stride(key, lg_size);
        let mut index = (key as usize) & mask;
        let loop_index = index;

        loop {
            let probe = keys[index];
            if probe == 0 || probe == key {
                return Some(index);
            }
            index = (index + stride) & mask;
            if index == loop_index {
                return None;
            }
        }
    }

    /// Stores a new entry in the empty slot `index` previously returned by [`find`](Self::find),
    /// then resizes or rebuilds the table if it got too full.
    pub fn insert(&mut self, index: usize, key: u64, summary: S) {
        assert_eq!(self.keys[index], 0, "Entry should be empty");
        debug_assert!(key != 0 && key < self.theta);
        self.keys[index] = key;
        self.summaries[index] = summary;
        self.num_entries += 1;

        if self.num_entries > self.get_capacity() {
            if self.lg_cur_size <= self.lg_nom_size {
                self.resize();
            } else {
                self.rebuild();
            }
        }
    }

    /// Returns the summary stored in an occupied slot.
    pub fn summary(&self, index: usize) -> &S {
        debug_assert_ne!(self.keys[index], 0);
        &self.summaries[index]
    }

    /// Replaces the summary stored in an occupied slot.
    pub fn replace_summary(&mut self, index: usize, summary: S) {
        debug_assert_ne!(self.keys[index], 0);
        self.summaries[index] = summary;
    }

    /// Get capacity threshold
    fn get_capacity(&self) -> usize {
        capacity_of(self.lg_cur_size, self.lg_nom_size)
    }

    /// Resize the hash table, growing by at least a factor of two
    fn resize(&mut self) {
        let step = self.resize_factor.lg_value().max(1);
        let new_lg_size = std::cmp::min(self.lg_cur_size + step, self.lg_max_size);
        self.rehash(new_lg_size);
    }

    /// Rebuild the hash table:
    /// The number of entries will be reduced to the nominal size k.
    fn rebuild(&mut self) {
        let k = 1usize << self.lg_nom_size;
        let mut entries = self.drain_entries();
        match truncate_to_k_smallest(&mut entries, k) {
            Some(theta) => self.theta = theta,
            None => unreachable!("rebuild requires more than k entries"),
        }
        self.refill(self.lg_cur_size, entries);
        assert_eq!(
            self.num_entries, k,
            "Number of inserted entries should be equal to k."
        );
    }

    /// Lowers theta to `theta` and drops every entry that no longer qualifies.
    ///
    /// Does nothing if `theta` is not below the current theta.
    pub fn lower_theta(&mut self, theta: u64) {
        if theta >= self.theta {
            return;
        }
        self.theta = theta;
        if self.keys.iter().any(|&key| key >= theta) {
            let entries = self
                .drain_entries()
                .into_iter()
                .filter(|(key, _)| *key < theta)
                .collect();
            self.refill(self.lg_cur_size, entries);
        }
    }

    /// Shrinks the table to the smallest size that holds the current entries below its load
    /// threshold. Theta and the retained entries are unchanged.
    pub fn trim(&mut self) {
        let lg_target = (MIN_LG_K..self.lg_cur_size)
            .find(|&lg| self.num_entries <= capacity_of(lg, self.lg_nom_size))
            .unwrap_or(self.lg_cur_size);
        if lg_target < self.lg_cur_size {
            self.rehash(lg_target);
        }
    }

    /// Reset the table to empty state
    pub fn reset(&mut self) {
        let init_lg_cur = starting_sub_multiple(
            self.lg_max_size,
            MIN_LG_K,
            self.resize_factor.lg_value(),
        );
        let size = 1usize << init_lg_cur;
        self.keys = vec![0u64; size];
        self.summaries = default_summaries(size);
        self.num_entries = 0;
        self.theta = starting_theta_from_sampling_probability(self.sampling_probability);
        self.lg_cur_size = init_lg_cur;
        self.is_empty = true;
    }

    fn rehash(&mut self, new_lg_size: u8) {
        let entries = self.drain_entries();
        self.refill(new_lg_size, entries);
    }

    /// Takes every occupied entry out of the table, leaving it with no slots.
    fn drain_entries(&mut self) -> Vec<(u64, S)> {
        let keys = std::mem::take(&mut self.keys);
        let summaries = std::mem::take(&mut self.summaries);
        self.num_entries = 0;
        keys.into_iter()
            .zip(summaries)
            .filter(|(key, _)| *key != 0)
            .collect()
    }

    /// Re-inserts entries into freshly allocated slots of size 2^lg_size.
    fn refill(&mut self, lg_size: u8, entries: Vec<(u64, S)>) {
        let size = 1usize << lg_size;
        let mut keys = vec![0u64; size];
        let mut summaries = default_summaries(size);
        let mut num_inserted = 0;
        for (key, summary) in entries {
            match Self::find_in_keys(&keys, key, lg_size) {
                Some(index) => {
                    keys[index] = key;
                    summaries[index] = summary;
                    num_inserted += 1;
                }
                None => unreachable!(
                    "find_in_keys should always return Some if the entry is not empty."
                ),
            }
        }
        self.keys = keys;
        self.summaries = summaries;
        self.lg_cur_size = lg_size;
        self.num_entries = num_inserted;
    }

    /// Get stride for hash table probing
    fn get_stride(key: u64, lg_size: u8) -> usize {
        (2 * ((key >> lg_size) & STRIDE_MASK) + 1) as usize
    }
}

impl<S> ThetaHashTable<S> {
    /// Get number of entries
    pub fn num_entries(&self) -> usize {
        self.num_entries
    }

    /// Get theta
    pub fn theta(&self) -> u64 {
        self.theta
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Marks the table as having seen data.
    pub fn set_not_empty(&mut self) {
        self.is_empty = false;
    }

    /// Get iterator over keys, in slot order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.keys.iter().copied().filter(|&key| key != 0)
    }

    /// Get iterator over keys and their summaries, in slot order
    pub fn entries(&self) -> impl Iterator<Item = (u64, &S)> + '_ {
        self.keys
            .iter()
            .zip(self.summaries.iter())
            .filter(|(key, _)| **key != 0)
            .map(|(key, summary)| (*key, summary))
    }

    /// Get log2 of nominal size
    pub fn lg_nom_size(&self) -> u8 {
        self.lg_nom_size
    }

    /// Get log2 of the current number of slots
    pub fn lg_cur_size(&self) -> u8 {
        self.lg_cur_size
    }

    /// Get resize factor
    pub fn resize_factor(&self) -> ResizeFactor {
        self.resize_factor
    }

    /// Get the 16-bit fingerprint of the hash seed
    pub fn seed_hash(&self) -> u16 {
        self.seed_hash
    }
}

/// Keeps the `k` entries with the smallest keys.
///
/// Returns the smallest discarded key, which becomes the new theta, or None if there are no more
/// than `k` entries. Keys are unique, so every kept key is strictly below the returned one.
pub(crate) fn truncate_to_k_smallest<S>(entries: &mut Vec<(u64, S)>, k: usize) -> Option<u64> {
    if entries.len() <= k {
        return None;
    }
    let (_, kth, _) = entries.select_nth_unstable_by_key(k, |(key, _)| *key);
    let theta = kth.0;
    entries.truncate(k);
    Some(theta)
}

/// Number of entries a table of 2^lg_size slots may hold before it must grow or rebuild.
fn capacity_of(lg_size: u8, lg_nom_size: u8) -> usize {
    let fraction = if lg_size <= lg_nom_size {
        RESIZE_THRESHOLD
    } else {
        REBUILD_THRESHOLD
    };
    (fraction * (1usize << lg_size) as f64) as usize
}

fn default_summaries<S: Default>(size: usize) -> Vec<S> {
    std::iter::repeat_with(S::default).take(size).collect()
}

/// Compute initial lg_size for hash table based on target lg_size, minimum lg_size, and resize
/// factor. Make sure `lg_target = lg_init + n * lg_resize_factor`, where `n` is an integer and
/// `lg_init >= lg_min`
fn starting_sub_multiple(lg_target: u8, lg_min: u8, lg_resize_factor: u8) -> u8 {
    if lg_target <= lg_min {
        lg_min
    } else if lg_resize_factor == 0 {
        lg_target
    } else {
        ((lg_target - lg_min) % lg_resize_factor) + lg_min
    }
}

/// Compute initial theta for hash table based on sampling probability.
fn starting_theta_from_sampling_probability(sampling_probability: f32) -> u64 {
    if sampling_probability < 1.0 {
        (MAX_THETA as f64 * sampling_probability as f64) as u64
    } else {
        MAX_THETA
    }
}
