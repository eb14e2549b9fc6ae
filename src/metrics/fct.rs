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
//! Flow completion times and slowdown against an ideal, uncongested network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};
use strum::IntoEnumIterator;

use crate::{
    flows::MessageKey,
    records::{BoundaryKind, MessageBoundary},
    timeline::Elapsed,
};

/// Closed-form completion time of a message in an empty network.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct IdealFctModel {
    /// Base round-trip time in seconds
    pub base_rtt: f64,
    /// Link bandwidth in bits per second
    pub link_bandwidth_bps: f64,
}

impl Default for IdealFctModel {
    fn default() -> Self {
        Self {
            base_rtt: 20e-6,
            link_bandwidth_bps: 100e9,
        }
    }
}

impl IdealFctModel {
    /// `base_rtt + size * 8 / bandwidth`, in seconds.
    pub fn ideal_fct(&self, size_bytes: u64) -> f64 {
        self.base_rtt + size_bytes as f64 * 8.0 / self.link_bandwidth_bps
    }

    pub fn slowdown(&self, size_bytes: u64, fct: f64) -> f64 {
        fct / self.ideal_fct(size_bytes)
    }
}

/// Completion time of a single message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FctRecord {
    pub src: String,
    pub dst: String,
    pub msg_id: String,
    /// Message size in bytes
    pub size: u64,
    pub start: f64,
    pub end: f64,
    pub fct: f64,
    pub ideal_fct: f64,
    pub slowdown: f64,
}

#[derive(Debug, Default)]
struct Pair {
    start: Option<(i64, u64)>,
    end: Option<i64>,
}

/// Pair the start and end boundaries of each message and compute its completion time. A later
/// boundary of the same kind replaces an earlier one in input order, so a message uses its last
/// start (and the size reported there) and its last end. Messages that never complete are left
/// out.
pub fn fct_records(
    boundaries: Option<&[Elapsed<MessageBoundary>]>,
    model: IdealFctModel,
) -> Vec<FctRecord> {
    let mut pairs: BTreeMap<MessageKey, Pair> = BTreeMap::new();
    for b in boundaries.unwrap_or_default() {
        let pair = pairs.entry(MessageKey::from(&b.record)).or_default();
        let t = b.elapsed_ns;
        match b.record.kind {
            BoundaryKind::Start => pair.start = Some((t, b.record.size)),
            BoundaryKind::End => pair.end = Some(t),
        }
    }

    let mut incomplete = 0;
    let records: Vec<FctRecord> = pairs
        .into_iter()
        .filter_map(|(key, pair)| {
            let (Some((start, size)), Some(end)) = (pair.start, pair.end) else {
                incomplete += 1;
                return None;
            };
            if end < start {
                log::warn!("Message {key} ends before it starts. Skipping it.");
                return None;
            }
            let fct = (end - start) as f64 * 1e-9;
            Some(FctRecord {
                src: key.flow.src,
                dst: key.flow.dst,
                msg_id: key.msg_id,
                size,
                start: start as f64 * 1e-9,
                end: end as f64 * 1e-9,
                fct,
                ideal_fct: model.ideal_fct(size),
                slowdown: model.slowdown(size, fct),
            })
        })
        .collect();

    if incomplete > 0 {
        log::debug!("{incomplete} messages without a matching start and end");
    }
    records
}

/// Flow size classes used to break down slowdowns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum SizeCategory {
    #[serde(rename = "<1KB")]
    #[strum(serialize = "<1KB")]
    Tiny,
    #[serde(rename = "1KB-10KB")]
    #[strum(serialize = "1KB-10KB")]
    Small,
    #[serde(rename = "10KB-100KB")]
    #[strum(serialize = "10KB-100KB")]
    Medium,
    #[serde(rename = "100KB-1MB")]
    #[strum(serialize = "100KB-1MB")]
    Large,
    #[serde(rename = ">1MB")]
    #[strum(serialize = ">1MB")]
    Huge,
}

impl SizeCategory {
    /// Category of a message size. Bins include their upper bound. Empty messages have no
    /// category.
    pub fn of(size_bytes: u64) -> Option<Self> {
        match size_bytes {
            0 => None,
            1..=1_000 => Some(Self::Tiny),
            1_001..=10_000 => Some(Self::Small),
            10_001..=100_000 => Some(Self::Medium),
            100_001..=1_000_000 => Some(Self::Large),
            _ => Some(Self::Huge),
        }
    }
}

/// Slowdown statistics of one size category.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlowdownStats {
    pub category: SizeCategory,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
}

impl SlowdownStats {
    fn new(category: SizeCategory, slowdowns: Vec<f64>) -> Option<Self> {
        let count = slowdowns.len();
        let mut sorted = slowdowns.clone();
        sorted.sort_by(f64::total_cmp);
        let mut data = Data::new(slowdowns);
        Some(Self {
            category,
            count,
            mean: data.mean()?,
            median: data.median(),
            min: data.min(),
            max: data.max(),
            p95: percentile(&sorted, 95.0)?,
            p99: percentile(&sorted, 99.0)?,
        })
    }
}

/// Percentile `p` (in `[0, 100]`) of sorted values, interpolating linearly between the two
/// closest ranks. `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Slowdown statistics per size category, in ascending order of size. Categories without
/// messages are left out.
pub fn slowdown_by_size(records: &[FctRecord]) -> Vec<SlowdownStats> {
    let mut by_category: BTreeMap<SizeCategory, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let Some(c) = SizeCategory::of(r.size) {
            by_category.entry(c).or_default().push(r.slowdown);
        }
    }
    SizeCategory::iter()
        .filter_map(|c| SlowdownStats::new(c, by_category.remove(&c)?))
        .collect()
}
