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
//! Jain fairness index of concurrent congestion windows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{records::CongestionSample, timeline::Elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FairnessPoint {
    /// Seconds since the global start
    pub time: f64,
    pub index: f64,
    /// Number of values the index was computed from
    pub flows: usize,
}

/// Jain fairness index `(sum x)^2 / (n * sum x^2)`. A single value (or none) is trivially fair.
/// If all of at least two values are zero, the index is 0.
pub fn jain_index(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 1.0;
    }
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|x| x * x).sum();
    if sum_sq == 0.0 {
        return 0.0;
    }
    sum * sum / (n as f64 * sum_sq)
}

/// Fairness of the congestion windows over time. The index is computed for every distinct
/// timestamp with at least two samples; other timestamps are omitted.
pub fn fairness_series(samples: Option<&[Elapsed<CongestionSample>]>) -> Vec<FairnessPoint> {
    let mut by_time: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for s in samples.unwrap_or_default() {
        by_time
            .entry(s.elapsed_ns)
            .or_default()
            .push(s.record.cwnd as f64);
    }

    let series: Vec<FairnessPoint> = by_time
        .into_iter()
        .filter(|(_, values)| values.len() >= 2)
        .map(|(t, values)| FairnessPoint {
            time: t as f64 * 1e-9,
            index: jain_index(&values),
            flows: values.len(),
        })
        .collect();
    if series.is_empty() {
        log::debug!("No timestamp with concurrent congestion samples");
    }
    series
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

    #[test]
    fn index() {
        assert_eq!(jain_index(&[1.0, 1.0]), 1.0);
        assert_eq!(jain_index(&[1.0, 3.0]), 0.8);
        assert_eq!(jain_index(&[5.0]), 1.0);
        assert_eq!(jain_index(&[]), 1.0);
        assert_eq!(jain_index(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn index_is_bounded() {
        let j = jain_index(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(j, 0.25);
        let j = jain_index(&[3.0, 7.0, 2.0]);
        assert!(j > 0.0 && j <= 1.0);
    }

    #[test]
    fn only_concurrent_timestamps() {
        let s = vec![
            sample(0, "a:1", 1),
            sample(0, "b:1", 3),
            sample(5, "a:1", 2),
            sample(9, "a:1", 4),
            sample(9, "b:1", 4),
        ];
        let series = fairness_series(Some(&s[..]));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].index, 0.8);
        assert_eq!(series[0].flows, 2);
        assert_eq!(series[1].time, 9.0 * 1e-9);
        assert_eq!(series[1].index, 1.0);
    }

    #[test]
    fn empty() {
        assert!(fairness_series(None).is_empty());
        assert!(fairness_series(Some(&[sample(0, "a:1", 1)][..])).is_empty());
    }
}
