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
//! Module defining the record types of the simulator traces and the rows handed to renderers.
use serde::{Deserialize, Serialize};

/// Records carrying a raw simulator timestamp.
pub trait LogRecord {
    /// Timestamp in nanoseconds.
    fn timestamp(&self) -> i64;

    /// Timestamp in seconds.
    fn time(&self) -> f64 {
        self.timestamp() as f64 * 1e-9
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Congestion window and RTT reported by a sender.
pub struct CongestionSample {
    pub timestamp: i64,
    /// Sender endpoint, `address:port`
    pub src: String,
    /// Receiver endpoint, `address:port`
    pub dst: String,
    pub msg_id: String,
    /// Congestion window in bytes
    pub cwnd: u64,
    /// Round-trip time, usually in nanoseconds
    pub rtt: u64,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum_macros::EnumString,
)]
/// Marker of a message trace line.
pub enum BoundaryKind {
    #[serde(rename = "+")]
    #[strum(serialize = "+")]
    Start,
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Start (`+`) or completion (`-`) of a message.
pub struct MessageBoundary {
    pub kind: BoundaryKind,
    pub timestamp: i64,
    /// Message size in bytes
    pub size: u64,
    pub src: String,
    pub dst: String,
    pub msg_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Queue occupancy of a switch port. Untagged traces carry no switch identifier.
pub struct QueueSample {
    pub timestamp: i64,
    pub switch: Option<String>,
    /// Queue occupancy in bytes
    pub queue_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Token (credit) counter of a switch port. May become negative if depletion is allowed.
pub struct TokenSample {
    pub timestamp: i64,
    pub switch: Option<String>,
    pub tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Bytes dequeued at the bottleneck since the previous sample.
pub struct ThroughputSample {
    pub timestamp: i64,
    pub bytes_dequeued: u64,
}

impl LogRecord for CongestionSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl LogRecord for MessageBoundary {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl LogRecord for QueueSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl LogRecord for TokenSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl LogRecord for ThroughputSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
/// Kind of a time series in the output.
pub enum SeriesKind {
    /// Congestion window of a flow in KB
    Cwnd,
    /// RTT of a flow in us
    Rtt,
    /// Sending rate of a flow in Gbps
    Rate,
    /// Queue occupancy of a switch in KB
    Queue,
    /// Token count of a switch
    Tokens,
    /// Windowed bottleneck throughput in Gbps
    Throughput,
    /// Sum of the congestion windows of all senders in KB
    CumulativeCwnd,
    /// Jain fairness index of the concurrent congestion windows
    Fairness,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One point of a time series, keyed by the flow or switch it belongs to. Time is elapsed time
/// in seconds since the start of the trace.
pub struct SeriesRecord {
    pub series: SeriesKind,
    pub key: String,
    pub time: f64,
    pub value: f64,
}
