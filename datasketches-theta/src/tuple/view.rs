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

use crate::theta::ThetaSketchView;

/// Read-only contract of sketches whose retained hashes carry a summary.
///
/// This is what [`TupleUnion`](super::TupleUnion) accepts as input. Since every tuple sketch is
/// also a [`ThetaSketchView`], it can be fed to a theta union as well, which ignores the
/// summaries.
pub trait TupleSketchView: ThetaSketchView {
    /// Type of the value attached to each retained hash.
    type Summary;

    /// Returns an iterator over the retained hashes and their summaries, in the same order as
    /// [`iter`](ThetaSketchView::iter).
    fn entries(&self) -> impl Iterator<Item = (u64, &Self::Summary)> + '_;
}
