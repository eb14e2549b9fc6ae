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
//! Parser for the bottleneck throughput trace (`.tpt`).
//!
//! Format: `<timestamp_ns> <bytes_dequeued>`

use crate::records::ThroughputSample;

use super::{parse_num, TraceParser};

pub struct ThroughputLogParser;

impl TraceParser for ThroughputLogParser {
    type Record = ThroughputSample;

    fn description() -> &'static str {
        "throughput"
    }

    fn min_fields() -> usize {
        2
    }

    fn parse_fields(fields: &[&str]) -> Option<ThroughputSample> {
        Some(ThroughputSample {
            timestamp: parse_num(fields[0])?,
            bytes_dequeued: parse_num(fields[1])?,
        })
    }
}
