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

use std::hash::Hasher;

const C1: u64 = 0x87c37b91114253d5;
const C2: u64 = 0x4cf5ad432745937f;
const BLOCK_LEN: usize = 16;

/// Streaming MurmurHash3 x64/128.
///
/// Bytes are buffered until a full 16-byte block is available, so feeding the same bytes in
/// different chunks yields the same hash.
#[derive(Debug, Clone)]
pub struct MurmurHash3X64128 {
    h1: u64,
    h2: u64,
    total_len: u64,
    tail: [u8; BLOCK_LEN],
    tail_len: usize,
}

impl MurmurHash3X64128 {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            h1: seed,
            h2: seed,
            total_len: 0,
            tail: [0; BLOCK_LEN],
            tail_len: 0,
        }
    }

    /// Returns both 64-bit words of the hash of everything written so far.
    pub fn finish128(&self) -> (u64, u64) {
        let mut h1 = self.h1;
        let mut h2 = self.h2;

        if self.tail_len > 8 {
            h2 ^= mix_k2(read_partial_u64(&self.tail[8..self.tail_len]));
        }
        if self.tail_len > 0 {
            h1 ^= mix_k1(read_partial_u64(&self.tail[..self.tail_len.min(8)]));
        }

        let total_len = self.total_len + self.tail_len as u64;
        h1 ^= total_len;
        h2 ^= total_len;
        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);
        h1 = fmix64(h1);
        h2 = fmix64(h2);
        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);
        (h1, h2)
    }

    fn process_block(&mut self, block: &[u8]) {
        let (lo, hi) = block.split_at(8);
        let k1 = read_partial_u64(lo);
        let k2 = read_partial_u64(hi);

        self.h1 ^= mix_k1(k1);
        self.h1 = self
            .h1
            .rotate_left(27)
            .wrapping_add(self.h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dce729);

        self.h2 ^= mix_k2(k2);
        self.h2 = self
            .h2
            .rotate_left(31)
            .wrapping_add(self.h1)
            .wrapping_mul(5)
            .wrapping_add(0x38495ab5);

        self.total_len += BLOCK_LEN as u64;
    }
}

impl Hasher for MurmurHash3X64128 {
    fn finish(&self) -> u64 {
        self.finish128().0
    }

    fn write(&mut self, mut bytes: &[u8]) {
        if self.tail_len > 0 {
            let wanted = (BLOCK_LEN - self.tail_len).min(bytes.len());
            self.tail[self.tail_len..self.tail_len + wanted].copy_from_slice(&bytes[..wanted]);
            self.tail_len += wanted;
            bytes = &bytes[wanted..];
            if self.tail_len < BLOCK_LEN {
                return;
            }
            let block = self.tail;
            self.process_block(&block);
            self.tail_len = 0;
        }

        let mut blocks = bytes.chunks_exact(BLOCK_LEN);
        for block in blocks.by_ref() {
            self.process_block(block);
        }

        let rest = blocks.remainder();
        self.tail[..rest.len()].copy_from_slice(rest);
        self.tail_len = rest.len();
    }
}

#[inline]
fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

#[inline]
fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// Reads up to 8 bytes as a little-endian u64, zero padding the missing high bytes.
#[inline]
fn read_partial_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}
