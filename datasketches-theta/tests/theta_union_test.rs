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

use std::ops::Range;

use datasketches_theta::common::NumStdDev;
use datasketches_theta::error::ErrorKind;
use datasketches_theta::hash::compute_seed_hash;
use datasketches_theta::theta::CompactThetaSketch;
use datasketches_theta::theta::MAX_THETA;
use datasketches_theta::theta::ThetaSketch;
use datasketches_theta::theta::ThetaSketchView;
use datasketches_theta::theta::ThetaUnion;
use datasketches_theta::tuple::TupleSketch;
use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn sketch_of(lg_k: u8, range: Range<u64>) -> ThetaSketch {
    let mut sketch = ThetaSketch::builder().lg_k(lg_k).build().unwrap();
    for i in range {
        sketch.update(i);
    }
    sketch
}

fn union_of(lg_k: u8, sketches: &[&CompactThetaSketch]) -> CompactThetaSketch {
    let mut union = ThetaUnion::builder().lg_k(lg_k).build().unwrap();
    for sketch in sketches {
        union.update(*sketch).unwrap();
    }
    union.get_result(true)
}

#[test]
fn test_union_exact_mode() {
    let a = sketch_of(12, 0..1000);
    let b = sketch_of(12, 500..1500);
    let mut union = ThetaUnion::builder().lg_k(12).build().unwrap();
    union.update(&a).unwrap();
    union.update(&b).unwrap();

    let result = union.get_result(true);
    assert!(!result.is_estimation_mode());
    assert_eq!(result.estimate(), 1500.0);
    assert_eq!(result.lower_bound(NumStdDev::Two), 1500.0);
    assert_eq!(result.upper_bound(NumStdDev::Two), 1500.0);
}

#[test]
fn test_union_estimation_mode() {
    let a = sketch_of(12, 0..10000);
    let b = sketch_of(12, 5000..15000);
    let mut union = ThetaUnion::builder().lg_k(12).build().unwrap();
    union.update(&a).unwrap();
    union.update(&b.compact(false)).unwrap();

    let result = union.get_result(true);
    assert!(result.is_estimation_mode());
    assert_eq!(result.num_retained(), 4096);
    assert_that!(result.estimate(), near(15000.0, 15000.0 * 0.05));
    assert_that!(result.lower_bound(NumStdDev::Two), le(result.estimate()));
    assert_that!(result.upper_bound(NumStdDev::Two), ge(result.estimate()));
}

#[test]
fn test_union_is_commutative() {
    let a = sketch_of(8, 0..3000).compact(true);
    let b = sketch_of(8, 2000..6000).compact(false);
    assert_eq!(union_of(8, &[&a, &b]), union_of(8, &[&b, &a]));
}

#[test]
fn test_union_is_associative() {
    let a = sketch_of(8, 0..3000).compact(true);
    let b = sketch_of(8, 2000..6000).compact(true);
    let c = sketch_of(8, 5000..9000).compact(false);

    let left = union_of(8, &[&union_of(8, &[&a, &b]), &c]);
    let right = union_of(8, &[&a, &union_of(8, &[&b, &c])]);
    let flat = union_of(8, &[&a, &b, &c]);
    assert_eq!(left, right);
    assert_eq!(left, flat);
}

#[test]
fn test_result_is_non_destructive() {
    let mut union = ThetaUnion::builder().lg_k(5).build().unwrap();
    union.update(&sketch_of(5, 0..1000)).unwrap();
    let first = union.get_result(true);
    assert_eq!(first, union.get_result(true));
    assert_eq!(first.num_retained(), 32);

    union.update(&sketch_of(5, 1000..2000)).unwrap();
    let second = union.get_result(true);
    assert!(second.theta64() <= first.theta64());
    assert_eq!(
        second,
        union_of(5, &[&sketch_of(5, 0..2000).compact(true)])
    );
}

#[test]
fn test_unordered_result() {
    let mut union = ThetaUnion::builder().build().unwrap();
    union.update(&sketch_of(12, 0..100)).unwrap();
    let result = union.get_result(false);
    assert!(!result.is_ordered());
    assert_eq!(result.num_retained(), 100);
}

#[test]
fn test_seed_mismatch() {
    let mut a = ThetaSketch::builder().seed(1).build().unwrap();
    let mut b = ThetaSketch::builder().seed(2).build().unwrap();
    a.update("a");
    b.update("b");

    let mut union = ThetaUnion::builder().build().unwrap();
    union.update(&a).unwrap();
    let before = union.get_result(true);
    let err = union.update(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
    assert_eq!(union.get_result(true), before);
    assert_eq!(before.seed_hash(), compute_seed_hash(1));

    // an empty sketch with a foreign seed is rejected too
    let empty = ThetaSketch::builder().seed(2).build().unwrap();
    let err = union.update(&empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSketch);
}

#[test]
fn test_union_with_empty_and_screened_sketches() {
    let mut union = ThetaUnion::builder().build().unwrap();
    union.update(&ThetaSketch::builder().build().unwrap()).unwrap();
    assert!(union.get_result(true).is_empty());

    // a sampled sketch that saw data but retained nothing still lowers theta
    let mut sampled = ThetaSketch::builder()
        .sampling_probability(0.0001)
        .build()
        .unwrap();
    sampled.update("only");
    union.update(&sampled).unwrap();
    let result = union.get_result(true);
    assert!(!result.is_empty());
    assert!(result.theta64() < MAX_THETA);
    assert_eq!(result.num_retained(), sampled.num_retained());
}

#[test]
fn test_disjoint_union_accuracy() {
    const TRIALS: usize = 20;
    let mut rng = StdRng::seed_from_u64(42);
    let mut within_tolerance = 0;
    for _ in 0..TRIALS {
        let seed: u64 = rng.random();
        let mut a = ThetaSketch::builder().lg_k(12).seed(seed).build().unwrap();
        let mut b = ThetaSketch::builder().lg_k(12).seed(seed).build().unwrap();
        for i in 0..10000u64 {
            a.update(i);
            b.update(i + 10000);
        }
        let mut union = ThetaUnion::builder().lg_k(12).seed(seed).build().unwrap();
        union.update(&a).unwrap();
        union.update(&b).unwrap();

        let estimate = union.get_result(true).estimate();
        if (estimate - 20000.0).abs() <= 20000.0 * 0.05 {
            within_tolerance += 1;
        }
    }
    assert!(within_tolerance >= 19, "{within_tolerance} of {TRIALS} trials");
}

#[test]
fn test_union_accepts_tuple_sketches() {
    let mut tuple = TupleSketch::<u64>::builder().build().unwrap();
    for i in 0..100u64 {
        tuple.update(i, i).unwrap();
    }
    let theta = sketch_of(12, 50..150);

    let mut union = ThetaUnion::builder().build().unwrap();
    union.update(&tuple).unwrap();
    union.update(&tuple.compact(true)).unwrap();
    union.update(&theta).unwrap();
    assert_eq!(union.get_result(true).estimate(), 150.0);
}

#[test]
fn test_sharded_build() {
    const SHARDS: u64 = 4;
    const PER_SHARD: u64 = 10000;

    let shards: Vec<CompactThetaSketch> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..SHARDS)
            .map(|shard| {
                scope.spawn(move || {
                    let start = shard * PER_SHARD;
                    sketch_of(16, start..start + PER_SHARD).compact(false)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let mut union = ThetaUnion::builder().lg_k(16).build().unwrap();
    for shard in &shards {
        union.update(shard).unwrap();
    }
    let single = sketch_of(16, 0..SHARDS * PER_SHARD);
    let result = union.get_result(true);
    assert_eq!(result.estimate(), single.estimate());
    assert_eq!(result, single.compact(true));
}
