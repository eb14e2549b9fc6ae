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
//! Aggregate congestion window summed over all senders.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{records::CongestionSample, timeline::Elapsed};

use super::rate::ByteUnit;

/// One point of the cumulative congestion window.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CumulativePoint {
    /// Seconds since the global start
    pub time: f64,
    /// Sum of the last known window of every sender, in the unit of the samples
    pub total: u64,
}

/// State threaded through the walk over all window updates: the last known window of each
/// sender, and their sum.
#[derive(Debug, Clone, Default)]
pub struct CumulativeState<'a> {
    last: HashMap<&'a str, u64>,
    total: u64,
}

impl<'a> CumulativeState<'a> {
    /// Replace the contribution of `sender` with `cwnd`, and return the new total.
    pub fn update(&mut self, sender: &'a str, cwnd: u64) -> u64 {
        let prev = self.last.insert(sender, cwnd).unwrap_or_default();
        self.total = self.total - prev + cwnd;
        self.total
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Compute the cumulative congestion window over time.
///
/// Senders are identified by their source endpoint. Each sender gets one additional update to
/// zero at the time of its last sample, so that senders that stopped reporting no longer count
/// towards the total. The result starts with `(0, 0)`. If there are no samples, the result is
/// empty.
pub fn cumulative_cwnd(samples: Option<&[Elapsed<CongestionSample>]>) -> Vec<CumulativePoint> {
    let samples = samples.unwrap_or_default();
    if samples.is_empty() {
        log::debug!("No congestion samples for the cumulative window");
        return Vec::new();
    }

    // group the updates by sender, in the order in which the senders first appear
    let senders = samples.iter().map(|s| s.record.src.as_str()).unique();
    let by_sender = samples
        .iter()
        .into_group_map_by(|s| s.record.src.as_str());

    let mut updates: Vec<(i64, &str, u64)> = Vec::with_capacity(samples.len() + by_sender.len());
    for sender in senders {
        let Some(sender_samples) = by_sender.get(sender) else {
            continue;
        };
        updates.extend(
            sender_samples
                .iter()
                .map(|s| (s.elapsed_ns, sender, s.record.cwnd)),
        );
        if let Some(last) = sender_samples.last() {
            updates.push((last.elapsed_ns, sender, 0));
        }
    }
    // stable, so ties keep the order from above
    updates.sort_by_key(|(t, _, _)| *t);

    std::iter::once(CumulativePoint {
        time: 0.0,
        total: 0,
    })
    .chain(
        updates
            .into_iter()
            .scan(CumulativeState::default(), |state, (t, sender, cwnd)| {
                Some(CumulativePoint {
                    time: t as f64 * 1e-9,
                    total: state.update(sender, cwnd),
                })
            }),
    )
    .collect()
}

/// How the cumulative window relates to the bandwidth-delay product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct BdpSaturation {
    /// Largest cumulative window, in bytes
    pub peak_bytes: f64,
    /// First time at which the cumulative window reaches the BDP
    pub first_reached: Option<f64>,
    /// Total time during which the cumulative window is at or above the BDP
    pub time_saturated: f64,
}

/// Summarize the cumulative window against `bdp_bytes`. The window is a step function: each
/// value holds until the next point. Returns `None` for an empty series.
pub fn bdp_saturation(
    series: &[CumulativePoint],
    bdp_bytes: u64,
    unit: ByteUnit,
) -> Option<BdpSaturation> {
    let bytes = |p: &CumulativePoint| p.total as f64 * unit.bytes();
    let saturated = |p: &CumulativePoint| bytes(p) >= bdp_bytes as f64;

    let peak_bytes = series.iter().map(bytes).max_by(f64::total_cmp)?;
    let first_reached = series.iter().find(|&p| saturated(p)).map(|p| p.time);
    let time_saturated = series
        .iter()
        .tuple_windows()
        .filter(|&(a, _)| saturated(a))
        .map(|(a, b)| b.time - a.time)
        .sum();

    Some(BdpSaturation {
        peak_bytes,
        first_reached,
        time_saturated,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(ns: i64, src: &str, cwnd: u64) -> Elapsed<CongestionSample> {
        Elapsed {
            elapsed_ns: ns,
            record: CongestionSample {
                timestamp: ns,
                src: src.to_string(),
                dst: "d:1".to_string(),
                msg_id: "0".to_string(),
                cwnd,
                rtt: 1000,
            },
        }
    }

    fn points(series: &[CumulativePoint]) -> Vec<(f64, u64)> {
        series.iter().map(|p| (p.time, p.total)).collect()
    }

    #[test]
    fn single_sender() {
        let s = vec![
            sample(0, "a:1", 5),
            sample(1_000_000_000, "a:1", 10),
            sample(2_000_000_000, "a:1", 3),
        ];
        assert_eq!(
            points(&cumulative_cwnd(Some(&s[..]))),
            vec![(0.0, 0), (0.0, 5), (1.0, 10), (2.0, 3), (2.0, 0)]
        );
    }

    #[test]
    fn no_double_counting() {
        let s = vec![
            sample(0, "a:1", 10),
            sample(1_000_000_000, "b:1", 20),
            sample(2_000_000_000, "a:1", 30),
            sample(3_000_000_000, "b:1", 5),
        ];
        assert_eq!(
            points(&cumulative_cwnd(Some(&s[..]))),
            vec![
                (0.0, 0),
                (0.0, 10),
                (1.0, 30),
                (2.0, 50),
                (2.0, 20),
                (3.0, 5),
                (3.0, 0),
            ]
        );
    }

    #[test]
    fn samples_without_rtt_count() {
        let mut late = sample(1_000_000_000, "a:1", 7);
        late.record.rtt = 0;
        let s = vec![sample(0, "a:1", 5), late];
        assert_eq!(
            points(&cumulative_cwnd(Some(&s[..]))),
            vec![(0.0, 0), (0.0, 5), (1.0, 7), (1.0, 0)]
        );
    }

    #[test]
    fn empty() {
        assert!(cumulative_cwnd(None).is_empty());
        assert!(cumulative_cwnd(Some(&[][..])).is_empty());
    }

    #[test]
    fn state_replaces_contribution() {
        let mut state = CumulativeState::default();
        assert_eq!(state.update("a", 10), 10);
        assert_eq!(state.update("b", 5), 15);
        assert_eq!(state.update("a", 2), 7);
        assert_eq!(state.total(), 7);
    }

    #[test]
    fn saturation() {
        let series = vec![
            CumulativePoint { time: 0.0, total: 0 },
            CumulativePoint { time: 1.0, total: 100 },
            CumulativePoint { time: 3.0, total: 50 },
            CumulativePoint { time: 4.0, total: 120 },
            CumulativePoint { time: 4.5, total: 0 },
        ];
        let s = bdp_saturation(&series, 100, ByteUnit::Bytes).unwrap();
        assert_eq!(s.peak_bytes, 120.0);
        assert_eq!(s.first_reached, Some(1.0));
        assert_eq!(s.time_saturated, 2.5);

        let s = bdp_saturation(&series, 1, ByteUnit::Kilobytes).unwrap();
        assert_eq!(s.peak_bytes, 120_000.0);
        assert!(bdp_saturation(&[], 100, ByteUnit::Bytes).is_none());
    }
}
