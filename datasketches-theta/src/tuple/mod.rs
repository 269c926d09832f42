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

//! Tuple sketch implementation.
//!
//! A tuple sketch extends the theta sketch by attaching a summary value to every retained hash,
//! for example a counter or a sum of some metric associated with each distinct item. Estimation
//! works exactly as for theta sketches; the summaries of the retained sample describe the
//! population they were sampled from.
//!
//! - **TupleSketch**: Mutable sketch taking `(item, summary)` updates
//! - **CompactTupleSketch**: Immutable snapshot, optionally sorted
//! - **TupleUnion**: Merges sketches, combining summaries of shared hashes with a
//!   [`MergePolicy`]

mod compact;
mod policy;
mod sketch;
mod union;
mod view;

pub use self::compact::CompactTupleSketch;
pub use self::policy::AdditivePolicy;
pub use self::policy::MergePolicy;
pub use self::sketch::TupleSketch;
pub use self::sketch::TupleSketchBuilder;
pub use self::union::TupleUnion;
pub use self::union::TupleUnionBuilder;
pub use self::view::TupleSketchView;
