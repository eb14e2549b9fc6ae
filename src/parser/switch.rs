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
//! Parsers for the per-switch queue (`.qlen`) and token (`.pru`) traces.
//!
//! Both come in two flavors. The tagged one prefixes each line with `que` or `pru` and names the
//! switch port: `que <timestamp_ns> <switch_id> <queue_size>`. A single tagged file may contain
//! both kinds of lines, each parser only picks its own tag. The untagged flavor is written by
//! single-bottleneck setups and omits the switch: `<timestamp_ns> <value>`.

use std::str::FromStr;

use crate::records::{QueueSample, TokenSample};

use super::{parse_num, TraceParser};

const QUEUE_TAG: &str = "que";
const TOKEN_TAG: &str = "pru";

/// Fields shared by tagged and untagged switch samples.
struct SwitchFields<T> {
    timestamp: i64,
    switch: Option<String>,
    value: T,
}

fn parse_switch_fields<T: FromStr>(tag: &str, fields: &[&str]) -> Option<SwitchFields<T>> {
    match fields {
        [t, ts, switch, value, ..] if *t == tag => Some(SwitchFields {
            timestamp: parse_num(ts)?,
            switch: Some(switch.to_string()),
            value: parse_num(value)?,
        }),
        // lines tagged for another trace kind
        [t, ..] if t.parse::<i64>().is_err() => None,
        [ts, value, ..] if parse_num::<T>(value).is_some() => Some(SwitchFields {
            timestamp: parse_num(ts)?,
            switch: None,
            value: parse_num(value)?,
        }),
        // untagged, but with the switch spelled out
        [ts, switch, value, ..] => Some(SwitchFields {
            timestamp: parse_num(ts)?,
            switch: Some(switch.to_string()),
            value: parse_num(value)?,
        }),
        _ => None,
    }
}

pub struct QueueLogParser;

impl TraceParser for QueueLogParser {
    type Record = QueueSample;

    fn description() -> &'static str {
        "queue"
    }

    fn min_fields() -> usize {
        2
    }

    fn parse_fields(fields: &[&str]) -> Option<QueueSample> {
        let f = parse_switch_fields(QUEUE_TAG, fields)?;
        Some(QueueSample {
            timestamp: f.timestamp,
            switch: f.switch,
            queue_size: f.value,
        })
    }
}

pub struct TokenLogParser;

impl TraceParser for TokenLogParser {
    type Record = TokenSample;

    fn description() -> &'static str {
        "token"
    }

    fn min_fields() -> usize {
        2
    }

    fn parse_fields(fields: &[&str]) -> Option<TokenSample> {
        let f = parse_switch_fields(TOKEN_TAG, fields)?;
        Some(TokenSample {
            timestamp: f.timestamp,
            switch: f.switch,
            tokens: f.value,
        })
    }
}
