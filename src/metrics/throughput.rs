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
//! Bottleneck throughput over an overlapping sliding window.

use serde::{Deserialize, Serialize};

use crate::{records::ThroughputSample, timeline::Elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ThroughputPoint {
    /// Start of the window, in seconds since the global start
    pub time: f64,
    pub gbps: f64,
}

/// Compute the throughput for each sample except the last one, summing all bytes dequeued in
/// `[t, t + window)`. Windows overlap, so neighboring values are strongly correlated.
///
/// Window membership is decided on integer nanoseconds. Returns an empty series for a
/// non-positive window or for fewer than two samples.
pub fn windowed_throughput(
    samples: Option<&[Elapsed<ThroughputSample>]>,
    window: f64,
) -> Vec<ThroughputPoint> {
    let samples = samples.unwrap_or_default();
    if window <= 0.0 || samples.len() < 2 {
        log::debug!("Not enough throughput samples for a window of {window}s");
        return Vec::new();
    }
    let window_ns = (window * 1e9).round() as i64;

    let mut sorted: Vec<(i64, u64)> = samples
        .iter()
        .map(|s| (s.elapsed_ns, s.record.bytes_dequeued))
        .collect();
    sorted.sort_by_key(|(t, _)| *t);

    // prefix[i] is the number of bytes dequeued by the first i samples
    let prefix: Vec<u64> = std::iter::once(0)
        .chain(sorted.iter().scan(0u64, |acc, (_, b)| {
            *acc += b;
            Some(*acc)
        }))
        .collect();

    sorted[..sorted.len() - 1]
        .iter()
        .map(|&(t, _)| {
            let lo = sorted.partition_point(|(x, _)| *x < t);
            let hi = sorted.partition_point(|(x, _)| *x < t + window_ns);
            let bytes = prefix[hi] - prefix[lo];
            ThroughputPoint {
                time: t as f64 * 1e-9,
                gbps: bytes as f64 * 8.0 / (window * 1e9),
            }
        })
        .collect()
}
