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
//! Parser for the message traces (`.tr`).
//!
//! Format: `+ <timestamp_ns> <size> <src> <dst> <msg_id>` when a message is started and the same
//! with a leading `-` once it is fully acknowledged.

use crate::records::{BoundaryKind, MessageBoundary};

use super::{parse_num, TraceParser};

pub struct MessageTraceParser;

impl TraceParser for MessageTraceParser {
    type Record = MessageBoundary;

    fn description() -> &'static str {
        "message"
    }

    fn min_fields() -> usize {
        6
    }

    fn parse_fields(fields: &[&str]) -> Option<MessageBoundary> {
        Some(MessageBoundary {
            kind: parse_num(fields[0])?,
            timestamp: parse_num(fields[1])?,
            size: parse_num(fields[2])?,
            src: fields[3].to_string(),
            dst: fields[4].to_string(),
            msg_id: fields[5].to_string(),
        })
    }
}
