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

use datasketches_theta::common::NumStdDev;
use datasketches_theta::error::Error;
use datasketches_theta::error::ErrorKind;
use datasketches_theta::theta::MAX_THETA;
use datasketches_theta::theta::ThetaSketch;
use datasketches_theta::theta::ThetaSketchView;
use datasketches_theta::tuple::CompactTupleSketch;
use datasketches_theta::tuple::TupleSketch;
use datasketches_theta::tuple::TupleSketchView;
use googletest::assert_that;
use googletest::prelude::near;

#[test]
fn test_empty() {
    let sketch = TupleSketch::<f64>::builder().build().unwrap();
    assert!(sketch.is_empty());
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 0.0);

    let compact = sketch.compact(true);
    assert!(compact.is_empty());
    assert_eq!(compact.num_retained(), 0);
}

#[test]
fn test_additive_merge() {
    let mut sketch = TupleSketch::<i64>::builder().build().unwrap();
    sketch.update("a", 3).unwrap();
    sketch.update("a", 4).unwrap();
    assert_eq!(sketch.num_retained(), 1);
    assert_eq!(sketch.estimate(), 1.0);

    let entries: Vec<(u64, i64)> = sketch.entries().map(|(h, s)| (h, *s)).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, 7);
}

#[test]
fn test_hashes_match_theta_sketch() {
    let mut tuple = TupleSketch::<u32>::builder().lg_k(6).build().unwrap();
    let mut theta = ThetaSketch::builder().lg_k(6).build().unwrap();
    for i in 0..2000 {
        tuple.update(i, 1).unwrap();
        theta.update(i);
    }
    assert_eq!(tuple.theta64(), theta.theta64());

    let mut tuple_hashes: Vec<u64> = tuple.iter().collect();
    tuple_hashes.sort_unstable();
    assert_eq!(tuple_hashes, theta.compact(true).entries());
}

#[test]
fn test_estimation_mode() {
    let mut sketch = TupleSketch::<u64>::builder().lg_k(10).build().unwrap();
    for i in 0..20000u64 {
        sketch.update(i, 1).unwrap();
        sketch.update(i, 1).unwrap();
    }
    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta64() < MAX_THETA);
    assert_that!(sketch.estimate(), near(20000.0, 20000.0 * 0.1));
    assert!(sketch.entries().all(|(_, count)| *count == 2));
}

#[test]
fn test_custom_policy() {
    let keep_max = |a: &u32, b: &u32| -> Result<u32, Error> { Ok(*a.max(b)) };
    let mut sketch = TupleSketch::<u32>::builder()
        .lg_k(8)
        .policy(keep_max)
        .build()
        .unwrap();
    for summary in [4, 11, 7] {
        sketch.update("key", summary).unwrap();
    }
    assert_eq!(sketch.entries().next().map(|(_, s)| *s), Some(11));
}

#[test]
fn test_policy_error_is_propagated() {
    let checked = |a: &u8, b: &u8| -> Result<u8, Error> {
        a.checked_add(*b)
            .ok_or_else(|| Error::new(ErrorKind::PolicyFailure, "summary overflow"))
    };
    let mut sketch = TupleSketch::<u8>::builder()
        .policy(checked)
        .build()
        .unwrap();
    sketch.update_f64(1.0, 250).unwrap();
    let err = sketch.update_f64(1.0, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PolicyFailure);
    assert_eq!(err.message(), "summary overflow");
    assert_eq!(sketch.entries().next().map(|(_, s)| *s), Some(250));
}

#[test]
fn test_update_str() {
    let mut sketch = TupleSketch::<u64>::builder().build().unwrap();
    sketch.update_str("", 5).unwrap();
    assert!(sketch.is_empty());

    sketch.update_str("pear", 1).unwrap();
    sketch.update_bytes(b"pear", 2).unwrap();
    assert_eq!(sketch.num_retained(), 1);
    assert_eq!(sketch.entries().next().map(|(_, s)| *s), Some(3));
}

#[test]
fn test_trim_and_reset() {
    let mut sketch = TupleSketch::<u64>::builder().lg_k(5).build().unwrap();
    for i in 0..500u64 {
        sketch.update(i, i).unwrap();
    }
    let before = sketch.compact(true);
    sketch.trim();
    assert_eq!(sketch.compact(true), before);

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.theta64(), MAX_THETA);
    assert_eq!(sketch.num_retained(), 0);
}

#[test]
fn test_compact_is_independent_copy() {
    let concat = |a: &String, b: &String| -> Result<String, Error> { Ok(format!("{a}{b}")) };
    let mut sketch = TupleSketch::<String>::builder()
        .policy(concat)
        .build()
        .unwrap();
    sketch.update(1, "x".to_string()).unwrap();
    let compact = sketch.compact(false);
    sketch.update(1, "y".to_string()).unwrap();

    assert_eq!(compact.entries().next().unwrap().1, "x");
    assert_eq!(sketch.entries().next().unwrap().1, "xy");
}

#[test]
fn test_compact_from_parts() {
    let compact =
        CompactTupleSketch::from_parts(false, true, 1, MAX_THETA / 4, vec![(1, 10u32), (2, 20)])
            .unwrap();
    assert!(compact.is_estimation_mode());
    assert_that!(compact.estimate(), near(8.0, 1e-6));

    let err = CompactTupleSketch::from_parts(false, true, 1, MAX_THETA, vec![(0, 10u32)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}
