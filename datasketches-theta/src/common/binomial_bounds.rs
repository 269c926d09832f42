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

//! Confidence bounds on the size of a population given `num_samples` distinct items observed
//! while sampling with probability `theta`.
//!
//! The bounds use the classic binomial approximation with a continuity correction: with
//! `b = s * sqrt((1 - theta) / theta)` and `n' = (n -/+ 0.5) / theta` they are
//! `n' + b^2 / 2 -/+ (b / 2) * sqrt(b^2 + 4 * n')`.

use crate::common::NumStdDev;
use crate::error::Error;

// Sampling probabilities this close to one are treated as exact counting.
const NEAR_ONE_THETA: f64 = 1.0 - 1e-5;

/// Returns the approximate lower bound of the population size.
///
/// The result is never below `num_samples` and never above the estimate `num_samples / theta`.
pub(crate) fn lower_bound(
    num_samples: u64,
    theta: f64,
    num_std_dev: NumStdDev,
) -> Result<f64, Error> {
    check_theta(theta)?;
    if num_samples == 0 {
        return Ok(0.0);
    }
    let n = num_samples as f64;
    let estimate = n / theta;
    if theta > NEAR_ONE_THETA {
        return Ok(n);
    }
    let raw = cont_classic_lb(n, theta, num_std_dev.as_f64());
    Ok(raw.max(n).min(estimate))
}

/// Returns the approximate upper bound of the population size.
///
/// The result is never below the estimate `num_samples / theta`.
pub(crate) fn upper_bound(
    num_samples: u64,
    theta: f64,
    num_std_dev: NumStdDev,
) -> Result<f64, Error> {
    check_theta(theta)?;
    let n = num_samples as f64;
    let estimate = n / theta;
    if theta > NEAR_ONE_THETA {
        return Ok(n + 1.0);
    }
    let raw = cont_classic_ub(n, theta, num_std_dev.as_f64());
    Ok(raw.max(estimate))
}

fn check_theta(theta: f64) -> Result<(), Error> {
    if theta > 0.0 && theta <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "theta must be in (0.0, 1.0], got {theta}"
        )))
    }
}

fn cont_classic_lb(num_samples: f64, theta: f64, num_std_dev: f64) -> f64 {
    let n_hat = (num_samples - 0.5) / theta;
    let b = num_std_dev * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * (b * b);
    center - d
}

fn cont_classic_ub(num_samples: f64, theta: f64, num_std_dev: f64) -> f64 {
    let n_hat = (num_samples + 0.5) / theta;
    let b = num_std_dev * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * (b * b);
    center + d
}
