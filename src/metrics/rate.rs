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
//! Instantaneous sending rate derived from congestion window and RTT.

use serde::{Deserialize, Serialize};

use crate::flows::Flow;

/// Unit in which the congestion window is reported by the simulator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ByteUnit {
    #[default]
    Bytes,
    Kilobytes,
}

impl ByteUnit {
    /// Number of bytes in one unit.
    pub fn bytes(&self) -> f64 {
        match self {
            ByteUnit::Bytes => 1.0,
            ByteUnit::Kilobytes => 1e3,
        }
    }
}

/// Unit in which the RTT is reported by the simulator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Nanoseconds,
    Microseconds,
}

impl TimeUnit {
    /// Number of seconds in one unit.
    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1e-9,
            TimeUnit::Microseconds => 1e-6,
        }
    }

    /// Number of microseconds in one unit.
    pub fn micros(&self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1e-3,
            TimeUnit::Microseconds => 1.0,
        }
    }
}

/// Units of the raw congestion samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateUnits {
    pub cwnd: ByteUnit,
    pub rtt: TimeUnit,
}

impl RateUnits {
    /// Congestion window in bytes.
    pub fn cwnd_bytes(&self, cwnd: u64) -> f64 {
        cwnd as f64 * self.cwnd.bytes()
    }

    /// RTT in seconds.
    pub fn rtt_seconds(&self, rtt: u64) -> f64 {
        rtt as f64 * self.rtt.seconds()
    }

    /// RTT in microseconds.
    pub fn rtt_micros(&self, rtt: u64) -> f64 {
        rtt as f64 * self.rtt.micros()
    }
}

/// Sending rate `cwnd * 8 / rtt` in Gbps. The rate is undefined (`None`) for a zero RTT.
pub fn rate_gbps(cwnd: u64, rtt: u64, units: RateUnits) -> Option<f64> {
    if rtt == 0 {
        return None;
    }
    let bits = units.cwnd_bytes(cwnd) * 8.0;
    Some(bits / units.rtt_seconds(rtt) * 1e-9)
}

/// Rate series of a flow, as `(elapsed seconds, Gbps)`. Samples without RTT are left out.
pub fn rate_series(flow: &Flow, units: RateUnits) -> Vec<(f64, f64)> {
    flow.samples
        .iter()
        .filter_map(|s| Some((s.time, rate_gbps(s.cwnd, s.rtt, units)?)))
        .collect()
}
