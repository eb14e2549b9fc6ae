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
//! Resolution of flow identities and their start and end times.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    records::{BoundaryKind, CongestionSample, MessageBoundary},
    timeline::Elapsed,
};

/// Identity of a flow: the *directed* pair of source and destination endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct FlowId {
    pub src: String,
    pub dst: String,
}

impl FlowId {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.src, self.dst)
    }
}

impl From<&CongestionSample> for FlowId {
    fn from(s: &CongestionSample) -> Self {
        Self::new(&s.src, &s.dst)
    }
}

impl From<&MessageBoundary> for FlowId {
    fn from(b: &MessageBoundary) -> Self {
        Self::new(&b.src, &b.dst)
    }
}

/// A single message of a flow, used to pair start and end boundaries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct MessageKey {
    pub flow: FlowId,
    pub msg_id: String,
}

impl From<&MessageBoundary> for MessageKey {
    fn from(b: &MessageBoundary) -> Self {
        Self {
            flow: b.into(),
            msg_id: b.msg_id.clone(),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.flow, self.msg_id)
    }
}

/// Start and end of a flow in seconds since the global start. `None` means that there is no
/// evidence for that bound in the traces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct FlowTiming {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl FlowTiming {
    /// Time between start and end, if both are known.
    pub fn duration(&self) -> Option<f64> {
        Some(self.end? - self.start?)
    }

    /// A flow without a resolved end is still active at the end of the trace.
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Neither start nor end could be resolved.
    pub fn is_unknown(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// A congestion sample owned by a flow.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FlowSample {
    /// Seconds since the global start
    pub time: f64,
    /// Congestion window in bytes
    pub cwnd: u64,
    pub rtt: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: FlowId,
    pub timing: FlowTiming,
    /// Congestion samples of this flow, in input order
    pub samples: Vec<FlowSample>,
}

/// Evidence collected for one flow before the timing is decided. Bounds are kept in
/// nanoseconds so that comparisons are exact.
#[derive(Debug, Default)]
struct Evidence {
    first_start: Option<i64>,
    last_end: Option<i64>,
    first_positive: Option<i64>,
    last_positive: Option<i64>,
    samples: Vec<FlowSample>,
}

impl Evidence {
    fn timing(&self) -> FlowTiming {
        let ns = |t: i64| t as f64 * 1e-9;
        FlowTiming {
            start: self.first_start.or(self.first_positive).map(ns),
            end: self.last_end.or(self.last_positive).map(ns),
        }
    }
}

/// Mapping of each flow identity to its resolved timing and samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    flows: BTreeMap<FlowId, Flow>,
}

impl FlowTable {
    /// Collect all flows referenced by either the message boundaries or the congestion samples
    /// and resolve their timing. Boundary events take precedence over congestion-window evidence.
    pub fn resolve(
        boundaries: Option<&[Elapsed<MessageBoundary>]>,
        samples: Option<&[Elapsed<CongestionSample>]>,
    ) -> Self {
        let mut evidence: BTreeMap<FlowId, Evidence> = BTreeMap::new();

        for b in boundaries.unwrap_or_default() {
            let e = evidence.entry(FlowId::from(&b.record)).or_default();
            let t = b.elapsed_ns;
            match b.record.kind {
                BoundaryKind::Start => {
                    e.first_start = Some(e.first_start.map_or(t, |x| x.min(t)));
                }
                BoundaryKind::End => {
                    e.last_end = Some(e.last_end.map_or(t, |x| x.max(t)));
                }
            }
        }

        for s in samples.unwrap_or_default() {
            let e = evidence.entry(FlowId::from(&s.record)).or_default();
            let t = s.elapsed_ns;
            if s.record.cwnd > 0 {
                e.first_positive = Some(e.first_positive.map_or(t, |x| x.min(t)));
                e.last_positive = Some(e.last_positive.map_or(t, |x| x.max(t)));
            }
            e.samples.push(FlowSample {
                time: s.elapsed(),
                cwnd: s.record.cwnd,
                rtt: s.record.rtt,
            });
        }

        let flows: BTreeMap<FlowId, Flow> = evidence
            .into_iter()
            .map(|(id, e)| {
                let timing = e.timing();
                if timing.is_unknown() {
                    log::debug!("Flow {id} has no timing evidence");
                }
                let flow = Flow {
                    id: id.clone(),
                    timing,
                    samples: e.samples,
                };
                (id, flow)
            })
            .collect();

        for flow in flows.values() {
            log::info!(
                "Flow {}: start={:?} end={:?}",
                flow.id,
                flow.timing.start,
                flow.timing.end
            );
        }

        Self { flows }
    }

    pub fn get(&self, id: &FlowId) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn timing(&self, id: &FlowId) -> Option<FlowTiming> {
        self.get(id).map(|f| f.timing)
    }

    /// All flows ordered by their identity.
    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// The mapping from flow identity to timing.
    pub fn timings(&self) -> BTreeMap<FlowId, FlowTiming> {
        self.flows
            .iter()
            .map(|(id, f)| (id.clone(), f.timing))
            .collect()
    }

    /// One flat record per flow, ready to be written as CSV.
    pub fn records(&self) -> Vec<FlowTimingRecord> {
        self.iter()
            .map(|f| FlowTimingRecord {
                src: f.id.src.clone(),
                dst: f.id.dst.clone(),
                start: f.timing.start,
                end: f.timing.end,
                duration: f.timing.duration(),
                active: f.timing.is_active(),
                samples: f.samples.len(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowTimingRecord {
    pub src: String,
    pub dst: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub duration: Option<f64>,
    pub active: bool,
    pub samples: usize,
}
