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
//! Parser for the per-sender congestion statistics (`.log`).
//!
//! Format: `<timestamp_ns> <src> <dst> <msg_id> <cwnd> <rtt>`

use crate::records::CongestionSample;

use super::{parse_num, TraceParser};

pub struct CongestionLogParser;

impl TraceParser for CongestionLogParser {
    type Record = CongestionSample;

    fn description() -> &'static str {
        "congestion"
    }

    fn min_fields() -> usize {
        6
    }

    fn parse_fields(fields: &[&str]) -> Option<CongestionSample> {
        Some(CongestionSample {
            timestamp: parse_num(fields[0])?,
            src: fields[1].to_string(),
            dst: fields[2].to_string(),
            msg_id: fields[3].to_string(),
            cwnd: parse_num(fields[4])?,
            rtt: parse_num(fields[5])?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::test_line;

    fn sample(timestamp: i64, cwnd: u64, rtt: u64) -> CongestionSample {
        CongestionSample {
            timestamp,
            src: "10.0.0.1:1000".to_string(),
            dst: "10.0.0.3:2000".to_string(),
            msg_id: "7".to_string(),
            cwnd,
            rtt,
        }
    }

    #[test]
    fn full_line() {
        test_line::<CongestionLogParser>(
            "1000002000 10.0.0.1:1000 10.0.0.3:2000 7 62500 24000",
            Some(sample(1_000_002_000, 62500, 24000)),
        )
    }

    #[test]
    fn trailing_fields_ignored() {
        test_line::<CongestionLogParser>(
            "5 10.0.0.1:1000 10.0.0.3:2000 7 0 0 extra fields",
            Some(sample(5, 0, 0)),
        )
    }

    #[test]
    fn short_line() {
        test_line::<CongestionLogParser>("5 10.0.0.1:1000 10.0.0.3:2000 7 100", None)
    }

    #[test]
    fn non_numeric_window() {
        test_line::<CongestionLogParser>("5 10.0.0.1:1000 10.0.0.3:2000 7 big 100", None);
        test_line::<CongestionLogParser>("5 10.0.0.1:1000 10.0.0.3:2000 7 -3 100", None);
    }
}
