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

use crate::error::Error;

/// Controls how fast the internal hash table of a sketch or union grows when more space is
/// required.
///
/// Tables configured with a factor above X1 start out with the smallest submultiple of the
/// maximum size, and are multiplied by the factor on every resize until the maximum size is
/// reached.
///
/// "X1" means the table starts at full size. "X2" doubles on every resize, and similarly "X4"
/// and "X8" grow by factors of 4 and 8.
///
/// # Examples
///
/// ```
/// # use datasketches_theta::common::ResizeFactor;
/// let factor = ResizeFactor::X4;
/// assert_eq!(factor.value(), 4);
/// assert_eq!(factor.lg_value(), 2);
/// assert_eq!(ResizeFactor::try_from(8).unwrap(), ResizeFactor::X8);
/// assert!(ResizeFactor::try_from(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFactor {
    /// Do not resize. The table will be configured to full size.
    X1,
    /// Resize by factor of 2
    X2,
    /// Resize by factor of 4
    X4,
    /// Resize by factor of 8
    X8,
}

impl ResizeFactor {
    /// Returns the Log-base 2 of the Resize Factor
    pub fn lg_value(self) -> u8 {
        match self {
            ResizeFactor::X1 => 0,
            ResizeFactor::X2 => 1,
            ResizeFactor::X4 => 2,
            ResizeFactor::X8 => 3,
        }
    }

    /// Returns the Resize Factor.
    pub fn value(self) -> usize {
        1 << self.lg_value()
    }
}

impl TryFrom<usize> for ResizeFactor {
    type Error = Error;

    /// Converts a growth multiplier into a resize factor.
    ///
    /// Only the powers of two 1, 2, 4 and 8 are accepted.
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ResizeFactor::X1),
            2 => Ok(ResizeFactor::X2),
            4 => Ok(ResizeFactor::X4),
            8 => Ok(ResizeFactor::X8),
            _ => Err(Error::invalid_argument(format!(
                "resize factor must be one of 1, 2, 4 or 8, got {value}"
            ))),
        }
    }
}
