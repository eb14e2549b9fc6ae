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
//! Conversion of the derived metrics into flat time-series records for rendering.

use crate::{
    flows::FlowTable,
    records::{QueueSample, SeriesKind, SeriesRecord, TokenSample},
    timeline::Elapsed,
};

use super::{
    cumulative::CumulativePoint,
    fairness::FairnessPoint,
    rate::{rate_gbps, ByteUnit, RateUnits},
    summary::UNNAMED_SWITCH,
    throughput::ThroughputPoint,
};

/// Key of the throughput series.
pub const BOTTLENECK_KEY: &str = "bottleneck";
/// Key of series aggregated over all flows.
pub const ALL_FLOWS_KEY: &str = "all";

fn point(series: SeriesKind, key: impl Into<String>, time: f64, value: f64) -> SeriesRecord {
    SeriesRecord {
        series,
        key: key.into(),
        time,
        value,
    }
}

/// Congestion window (KB), RTT (us) and rate (Gbps) of every flow. Rate points are only
/// produced for samples with a non-zero RTT.
pub fn flow_series(flows: &FlowTable, units: RateUnits) -> Vec<SeriesRecord> {
    let mut cwnd = Vec::new();
    let mut rtt = Vec::new();
    let mut rate = Vec::new();
    for flow in flows.iter() {
        let key = flow.id.to_string();
        for s in flow.samples.iter() {
            cwnd.push(point(
                SeriesKind::Cwnd,
                &key,
                s.time,
                units.cwnd_bytes(s.cwnd) * 1e-3,
            ));
            rtt.push(point(SeriesKind::Rtt, &key, s.time, units.rtt_micros(s.rtt)));
            if let Some(r) = rate_gbps(s.cwnd, s.rtt, units) {
                rate.push(point(SeriesKind::Rate, &key, s.time, r));
            }
        }
    }
    cwnd.into_iter().chain(rtt).chain(rate).collect()
}

fn switch_series<R>(
    kind: SeriesKind,
    samples: Option<&[Elapsed<R>]>,
    switch: impl Fn(&R) -> Option<&str>,
    value: impl Fn(&R) -> f64,
) -> Vec<SeriesRecord> {
    let mut records: Vec<SeriesRecord> = samples
        .unwrap_or_default()
        .iter()
        .map(|s| {
            point(
                kind,
                switch(&s.record).unwrap_or(UNNAMED_SWITCH),
                s.elapsed(),
                value(&s.record),
            )
        })
        .collect();
    // stable, so samples of a switch stay in input order
    records.sort_by(|a, b| a.key.cmp(&b.key));
    records
}

/// Queue occupancy (KB) of every switch.
pub fn queue_series(samples: Option<&[Elapsed<QueueSample>]>) -> Vec<SeriesRecord> {
    switch_series(
        SeriesKind::Queue,
        samples,
        |q| q.switch.as_deref(),
        |q| q.queue_size as f64 * 1e-3,
    )
}

/// Token count of every switch.
pub fn token_series(samples: Option<&[Elapsed<TokenSample>]>) -> Vec<SeriesRecord> {
    switch_series(
        SeriesKind::Tokens,
        samples,
        |t| t.switch.as_deref(),
        |t| t.tokens as f64,
    )
}

pub fn throughput_series(points: &[ThroughputPoint]) -> Vec<SeriesRecord> {
    points
        .iter()
        .map(|p| point(SeriesKind::Throughput, BOTTLENECK_KEY, p.time, p.gbps))
        .collect()
}

/// Cumulative congestion window in KB.
pub fn cumulative_series(points: &[CumulativePoint], unit: ByteUnit) -> Vec<SeriesRecord> {
    points
        .iter()
        .map(|p| {
            point(
                SeriesKind::CumulativeCwnd,
                ALL_FLOWS_KEY,
                p.time,
                p.total as f64 * unit.bytes() * 1e-3,
            )
        })
        .collect()
}

pub fn fairness_series(points: &[FairnessPoint]) -> Vec<SeriesRecord> {
    points
        .iter()
        .map(|p| point(SeriesKind::Fairness, ALL_FLOWS_KEY, p.time, p.index))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::records::CongestionSample;

    #[test]
    fn queue_grouped_by_switch() {
        let q = |ns: i64, switch: Option<&str>, size: u64| Elapsed {
            elapsed_ns: ns,
            record: QueueSample {
                timestamp: ns,
                switch: switch.map(str::to_string),
                queue_size: size,
            },
        };
        let s = vec![
            q(0, Some("S2"), 1000),
            q(1, Some("S1"), 2000),
            q(2, Some("S2"), 3000),
        ];
        let records = queue_series(Some(&s[..]));
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        let values: Vec<f64> = records.iter().map(|r| r.value).collect();
        assert_eq!(keys, vec!["S1", "S2", "S2"]);
        assert_eq!(values, vec![2.0, 1.0, 3.0]);
        assert!(records.iter().all(|r| r.series == SeriesKind::Queue));
    }

    #[test]
    fn untagged_tokens() {
        let s = vec![Elapsed {
            elapsed_ns: 0,
            record: TokenSample {
                timestamp: 0,
                switch: None,
                tokens: -3,
            },
        }];
        let records = token_series(Some(&s[..]));
        assert_eq!(records[0].key, UNNAMED_SWITCH);
        assert_eq!(records[0].value, -3.0);
        assert!(token_series(None).is_empty());
    }

    #[test]
    fn per_flow_series() {
        let c = |ns: i64, cwnd: u64, rtt: u64| Elapsed {
            elapsed_ns: ns,
            record: CongestionSample {
                timestamp: ns,
                src: "a:1".to_string(),
                dst: "b:1".to_string(),
                msg_id: "0".to_string(),
                cwnd,
                rtt,
            },
        };
        let s = vec![c(0, 10_000, 0), c(1_000, 10_000, 10_000)];
        let flows = FlowTable::resolve(None, Some(&s[..]));
        let records = flow_series(&flows, RateUnits::default());

        let of = |kind: SeriesKind| -> Vec<f64> {
            records
                .iter()
                .filter(|r| r.series == kind)
                .map(|r| r.value)
                .collect()
        };
        assert_eq!(of(SeriesKind::Cwnd), vec![10.0, 10.0]);
        assert_eq!(of(SeriesKind::Rtt), vec![0.0, 10.0]);
        let rate = of(SeriesKind::Rate);
        assert_eq!(rate.len(), 1);
        assert!((rate[0] - 8.0).abs() < 1e-9);
        assert!(records.iter().all(|r| r.key == "a:1->b:1"));

        assert!(flow_series(&FlowTable::default(), RateUnits::default()).is_empty());
    }
}
