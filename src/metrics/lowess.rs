// FlowScope: Reconstruction of Per-Flow Behavior from Network Simulator Traces
// Copyright (C) 2025 The FlowScope Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Locally weighted scatterplot smoothing (LOWESS), used for the trend of slowdown over flow size.

use statrs::statistics::{Data, OrderStatistics};

/// Parameters of the smoother.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lowess {
    /// Share of the points used for each local fit, in `(0, 1]`
    pub frac: f64,
    /// Number of robustness iterations after the initial fit
    pub iterations: usize,
}

impl Default for Lowess {
    fn default() -> Self {
        Self {
            frac: 0.3,
            iterations: 3,
        }
    }
}

impl Lowess {
    /// Fit the smoother and return the fitted `(x, y)` pairs, sorted by `x`. Non-finite points are
    /// dropped. Fewer than two points yield an empty result.
    pub fn fit(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        let n = points.len();
        if n < 2 {
            log::debug!("Not enough points for a LOWESS fit");
            return Vec::new();
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

        let k = ((self.frac * n as f64).ceil() as usize).clamp(2, n);
        // residuals below this are numerical noise
        let tolerance = 1e-10 * (1.0 + ys.iter().map(|y| y.abs()).sum::<f64>() / n as f64);
        let mut robustness = vec![1.0; n];
        let mut fitted = local_fits(&xs, &ys, &robustness, &ys, k);

        for _ in 0..self.iterations {
            let residuals: Vec<f64> = ys
                .iter()
                .zip(&fitted)
                .map(|(y, f)| (y - f).abs())
                .collect();
            let s = Data::new(residuals.clone()).median();
            if s <= tolerance {
                break;
            }
            robustness = residuals.iter().map(|r| bisquare(r / (6.0 * s))).collect();
            fitted = local_fits(&xs, &ys, &robustness, &fitted, k);
        }

        xs.into_iter().zip(fitted).collect()
    }
}

/// Fit one weighted linear regression per point over its `k` nearest neighbors. Points whose
/// neighbors all have zero weight keep their value from `previous`.
fn local_fits(
    xs: &[f64],
    ys: &[f64],
    robustness: &[f64],
    previous: &[f64],
    k: usize,
) -> Vec<f64> {
    let n = xs.len();
    let mut left = 0;
    (0..n)
        .map(|i| {
            let x = xs[i];
            // slide the window of k neighbors towards x
            while left + k < n && x - xs[left] > xs[left + k] - x {
                left += 1;
            }
            let window = left..left + k;
            let radius = window
                .clone()
                .map(|j| (xs[j] - x).abs())
                .fold(0.0, f64::max);

            let weights: Vec<(usize, f64)> = window
                .map(|j| {
                    let d = (xs[j] - x).abs();
                    let w = if radius > 0.0 {
                        tricube(d / radius)
                    } else {
                        1.0
                    };
                    (j, w * robustness[j])
                })
                .filter(|(_, w)| *w > 0.0)
                .collect();
            weighted_linear_fit(&weights, xs, ys, x).unwrap_or(previous[i])
        })
        .collect()
}

/// Evaluate the weighted least-squares line through the given points at `x`.
fn weighted_linear_fit(weights: &[(usize, f64)], xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let sum_w: f64 = weights.iter().map(|(_, w)| w).sum();
    if sum_w <= 0.0 {
        return None;
    }
    let mean_x = weights.iter().map(|&(j, w)| w * xs[j]).sum::<f64>() / sum_w;
    let mean_y = weights.iter().map(|&(j, w)| w * ys[j]).sum::<f64>() / sum_w;
    let var_x: f64 = weights
        .iter()
        .map(|&(j, w)| w * (xs[j] - mean_x).powi(2))
        .sum();
    if var_x <= f64::EPSILON * sum_w {
        return Some(mean_y);
    }
    let cov: f64 = weights
        .iter()
        .map(|&(j, w)| w * (xs[j] - mean_x) * (ys[j] - mean_y))
        .sum();
    Some(mean_y + cov / var_x * (x - mean_x))
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        (1.0 - u.powi(3)).powi(3)
    }
}

fn bisquare(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        (1.0 - u * u).powi(2)
    }
}
