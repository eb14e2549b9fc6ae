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
//! Common time base for all traces of a run.
//!
//! Each trace file is timestamped independently. To compare them, every event is assigned an
//! elapsed time relative to the earliest event over *all* traces used together.

use crate::records::{
    CongestionSample, LogRecord, MessageBoundary, QueueSample, ThroughputSample, TokenSample,
};

/// An event together with its elapsed time since the global start of the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elapsed<R> {
    /// Nanoseconds since the global start
    pub elapsed_ns: i64,
    pub record: R,
}

impl<R> Elapsed<R> {
    /// Elapsed time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed_ns as f64 * 1e-9
    }
}

impl<R> LogRecord for Elapsed<R> {
    fn timestamp(&self) -> i64 {
        self.elapsed_ns
    }
}

/// Anything that holds timestamped events. Absent streams (`None`) contribute nothing.
pub trait EventStream {
    fn min_timestamp(&self) -> Option<i64>;
}

impl<R: LogRecord> EventStream for [R] {
    fn min_timestamp(&self) -> Option<i64> {
        self.iter().map(LogRecord::timestamp).min()
    }
}

impl<R: LogRecord> EventStream for Vec<R> {
    fn min_timestamp(&self) -> Option<i64> {
        self.as_slice().min_timestamp()
    }
}

impl<S: EventStream> EventStream for Option<S> {
    fn min_timestamp(&self) -> Option<i64> {
        self.as_ref().and_then(EventStream::min_timestamp)
    }
}

/// The global zero time of a set of streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalTimeline {
    origin: Option<i64>,
}

impl GlobalTimeline {
    /// Compute the origin as the minimum timestamp over all given streams jointly.
    pub fn new(streams: &[&dyn EventStream]) -> Self {
        Self {
            origin: streams.iter().filter_map(|s| s.min_timestamp()).min(),
        }
    }

    /// The origin in nanoseconds, or `None` if all streams were empty.
    pub fn origin(&self) -> Option<i64> {
        self.origin
    }

    /// Attach elapsed times to all events of a stream. Absent streams stay absent.
    pub fn normalize<R: LogRecord>(&self, stream: Option<Vec<R>>) -> Option<Vec<Elapsed<R>>> {
        let origin = self.origin.unwrap_or_default();
        stream.map(|events| {
            events
                .into_iter()
                .map(|record| Elapsed {
                    elapsed_ns: record.timestamp().saturating_sub(origin),
                    record,
                })
                .collect()
        })
    }
}

/// All raw traces of a single simulation run. Any of them may be missing.
#[derive(Debug, Clone, Default)]
pub struct Traces {
    pub congestion: Option<Vec<CongestionSample>>,
    pub messages: Option<Vec<MessageBoundary>>,
    pub queues: Option<Vec<QueueSample>>,
    pub tokens: Option<Vec<TokenSample>>,
    pub throughput: Option<Vec<ThroughputSample>>,
}

impl Traces {
    /// `true` if not a single trace is present.
    pub fn is_empty(&self) -> bool {
        self.congestion.is_none()
            && self.messages.is_none()
            && self.queues.is_none()
            && self.tokens.is_none()
            && self.throughput.is_none()
    }
}

/// The traces of a run, with elapsed times on a common time base.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTraces {
    pub timeline: GlobalTimeline,
    pub congestion: Option<Vec<Elapsed<CongestionSample>>>,
    pub messages: Option<Vec<Elapsed<MessageBoundary>>>,
    pub queues: Option<Vec<Elapsed<QueueSample>>>,
    pub tokens: Option<Vec<Elapsed<TokenSample>>>,
    pub throughput: Option<Vec<Elapsed<ThroughputSample>>>,
}

/// Put all traces of a run onto the same time base. Consumes the raw traces, so every stream is
/// normalized exactly once and against the same origin.
pub fn normalize(traces: Traces) -> NormalizedTraces {
    let timeline = GlobalTimeline::new(&[
        &traces.congestion,
        &traces.messages,
        &traces.queues,
        &traces.tokens,
        &traces.throughput,
    ]);
    match timeline.origin() {
        Some(origin) => log::debug!("Global start of the trace at {origin} ns"),
        None => log::debug!("All traces are empty"),
    }

    NormalizedTraces {
        timeline,
        congestion: timeline.normalize(traces.congestion),
        messages: timeline.normalize(traces.messages),
        queues: timeline.normalize(traces.queues),
        tokens: timeline.normalize(traces.tokens),
        throughput: timeline.normalize(traces.throughput),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tpt(ts: &[i64]) -> Vec<ThroughputSample> {
        ts.iter()
            .map(|&timestamp| ThroughputSample {
                timestamp,
                bytes_dequeued: 1,
            })
            .collect()
    }

    fn queue(ts: &[i64]) -> Vec<QueueSample> {
        ts.iter()
            .map(|&timestamp| QueueSample {
                timestamp,
                switch: None,
                queue_size: 0,
            })
            .collect()
    }

    fn elapsed<R>(stream: &Option<Vec<Elapsed<R>>>) -> Vec<i64> {
        stream
            .as_ref()
            .map(|s| s.iter().map(|e| e.elapsed_ns).collect())
            .unwrap_or_default()
    }

    #[test]
    fn origin_is_joint_minimum() {
        let traces = Traces {
            throughput: Some(tpt(&[500, 700])),
            queues: Some(queue(&[300, 900])),
            ..Default::default()
        };
        let n = normalize(traces);
        assert_eq!(n.timeline.origin(), Some(300));
        assert_eq!(elapsed(&n.throughput), vec![200, 400]);
        assert_eq!(elapsed(&n.queues), vec![0, 600]);
    }

    #[test]
    fn per_stream_normalization_differs() {
        let a = tpt(&[500, 700]);
        let b = queue(&[300, 900]);
        let joint = GlobalTimeline::new(&[&a, &b]);
        let alone = GlobalTimeline::new(&[&a]);
        assert_ne!(
            elapsed(&joint.normalize(Some(a.clone()))),
            elapsed(&alone.normalize(Some(a)))
        );
    }

    #[test]
    fn translation_invariant() {
        let shift = 1_234_567_890_123;
        let a = tpt(&[500, 700, 1000]);
        let b = queue(&[300, 900]);
        let a2 = tpt(&[500 + shift, 700 + shift, 1000 + shift]);
        let b2 = queue(&[300 + shift, 900 + shift]);

        let t1 = GlobalTimeline::new(&[&a, &b]);
        let t2 = GlobalTimeline::new(&[&a2, &b2]);
        assert_eq!(
            elapsed(&t1.normalize(Some(a))),
            elapsed(&t2.normalize(Some(a2)))
        );
        assert_eq!(
            elapsed(&t1.normalize(Some(b))),
            elapsed(&t2.normalize(Some(b2)))
        );
    }

    #[test]
    fn idempotent() {
        let a = tpt(&[500, 700]);
        let b = queue(&[300, 900]);
        let t = GlobalTimeline::new(&[&a, &b]);
        let a = t.normalize(Some(a));
        let b = t.normalize(Some(b));

        let again = GlobalTimeline::new(&[&a, &b]);
        assert_eq!(again.origin(), Some(0));
        assert_eq!(elapsed(&again.normalize(a.clone())), elapsed(&a));
        assert_eq!(elapsed(&again.normalize(b.clone())), elapsed(&b));
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let a = tpt(&[i64::MIN, i64::MAX]);
        let t = GlobalTimeline::new(&[&a]);
        assert_eq!(elapsed(&t.normalize(Some(a))), vec![0, i64::MAX]);
    }

    #[test]
    fn absent_streams_pass_through() {
        let n = normalize(Traces {
            throughput: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(n.timeline.origin(), None);
        assert!(n.congestion.is_none());
        assert_eq!(n.throughput.map(|s| s.len()), Some(0));
    }
}
