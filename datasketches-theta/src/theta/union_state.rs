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

//! Union engine shared by theta and tuple unions.
//!
//! The working table doubles as the running union: its theta is the minimum theta of every
//! ingested sketch, and it only holds keys below that theta. Summaries of keys seen more than
//! once are combined with a merge function supplied per call.

use crate::error::Error;
use crate::theta::hash_table::ThetaHashTable;
use crate::theta::hash_table::truncate_to_k_smallest;

/// Description of one sketch handed to [`UnionState::update`].
pub(crate) struct UnionInput<I> {
    pub is_empty: bool,
    pub is_ordered: bool,
    pub seed_hash: u16,
    pub theta: u64,
    pub entries: I,
}

/// Parts of a compact sketch produced by [`UnionState::result`].
#[derive(Debug)]
pub(crate) struct UnionResult<S> {
    pub is_empty: bool,
    pub is_ordered: bool,
    pub seed_hash: u16,
    pub theta: u64,
    pub entries: Vec<(u64, S)>,
}

#[derive(Debug, Clone)]
pub(crate) struct UnionState<S> {
    table: ThetaHashTable<S>,
    // fixed by the first ingested sketch
    seed_hash: Option<u16>,
}

impl<S: Default + Clone> UnionState<S> {
    pub fn new(table: ThetaHashTable<S>) -> Self {
        Self {
            table,
            seed_hash: None,
        }
    }

    /// Folds one sketch into the union.
    ///
    /// Every merge is computed against the state before the call, and nothing is written until
    /// all of them succeeded. On error the union is left exactly as it was.
    pub fn update<'a, I, F>(&mut self, input: UnionInput<I>, merge: F) -> Result<(), Error>
    where
        S: 'a,
        I: Iterator<Item = (u64, &'a S)>,
        F: Fn(&S, &S) -> Result<S, Error>,
    {
        match self.seed_hash {
            Some(expected) if expected != input.seed_hash => {
                return Err(Error::seed_hash_mismatch(expected, input.seed_hash));
            }
            _ => {}
        }
        if input.is_empty {
            self.seed_hash = Some(input.seed_hash);
            return Ok(());
        }

        let theta = self.table.theta().min(input.theta);
        let mut staged = Vec::new();
        for (key, summary) in input.entries {
            if key >= theta {
                if input.is_ordered {
                    break;
                }
                continue;
            }
            let (index, found) = self.table.find(key);
            let summary = if found {
                merge(self.table.summary(index), summary)?
            } else {
                summary.clone()
            };
            staged.push((key, summary));
        }

        self.seed_hash = Some(input.seed_hash);
        self.table.set_not_empty();
        self.table.lower_theta(theta);
        for (key, summary) in staged {
            // an insert may rebuild the table and lower theta below later keys
            if key >= self.table.theta() {
                continue;
            }
            let (index, found) = self.table.find(key);
            if found {
                self.table.replace_summary(index, summary);
            } else {
                self.table.insert(index, key, summary);
            }
        }
        Ok(())
    }

    /// Snapshot of the union holding at most k entries. The state itself is not modified.
    pub fn result(&self, ordered: bool) -> UnionResult<S> {
        let seed_hash = self.seed_hash();
        if self.table.is_empty() {
            return UnionResult {
                is_empty: true,
                is_ordered: true,
                seed_hash,
                theta: self.table.theta(),
                entries: vec![],
            };
        }

        let mut entries: Vec<(u64, S)> = self
            .table
            .entries()
            .map(|(key, summary)| (key, summary.clone()))
            .collect();
        let k = 1usize << self.table.lg_nom_size();
        let theta = truncate_to_k_smallest(&mut entries, k).unwrap_or(self.table.theta());
        if ordered {
            entries.sort_unstable_by_key(|(key, _)| *key);
        }
        UnionResult {
            is_empty: false,
            is_ordered: ordered,
            seed_hash,
            theta,
            entries,
        }
    }

    pub fn reset(&mut self) {
        self.table.reset();
        self.seed_hash = None;
    }

    /// Seed hash of the ingested sketches, or of the configured seed before the first ingest.
    pub fn seed_hash(&self) -> u16 {
        self.seed_hash.unwrap_or_else(|| self.table.seed_hash())
    }

    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// The running union theta.
    pub fn theta64(&self) -> u64 {
        self.table.theta()
    }
}
