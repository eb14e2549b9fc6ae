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
//! Per-switch summaries of the token traces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{records::TokenSample, timeline::Elapsed};

/// Name used for samples from traces without a switch identifier.
pub const UNNAMED_SWITCH: &str = "-";

/// Token statistics of one switch port.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenStats {
    pub switch: String,
    pub max: i64,
    pub mean: f64,
    pub count: usize,
}

/// Maximum, mean and number of token samples per switch, ordered by switch.
pub fn token_stats(samples: Option<&[Elapsed<TokenSample>]>) -> Vec<TokenStats> {
    let mut by_switch: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for s in samples.unwrap_or_default() {
        let switch = s.record.switch.as_deref().unwrap_or(UNNAMED_SWITCH);
        by_switch.entry(switch).or_default().push(s.record.tokens);
    }

    by_switch
        .into_iter()
        .filter_map(|(switch, tokens)| {
            let max = *tokens.iter().max()?;
            let mean = tokens.iter().map(|t| *t as f64).sum::<f64>() / tokens.len() as f64;
            log::info!(
                "Tokens of {switch}: max={max}, mean={mean:.2}, count={}",
                tokens.len()
            );
            Some(TokenStats {
                switch: switch.to_string(),
                max,
                mean,
                count: tokens.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample(switch: Option<&str>, tokens: i64) -> Elapsed<TokenSample> {
        Elapsed {
            elapsed_ns: 0,
            record: TokenSample {
                timestamp: 0,
                switch: switch.map(str::to_string),
                tokens,
            },
        }
    }

    #[test]
    fn stats_per_switch() {
        let s = vec![
            sample(Some("S1-S2"), 4),
            sample(Some("S2-S3"), 1),
            sample(Some("S1-S2"), -2),
            sample(Some("S1-S2"), 7),
            sample(None, 3),
        ];
        let stats = token_stats(Some(&s[..]));
        assert_eq!(
            stats,
            vec![
                TokenStats {
                    switch: UNNAMED_SWITCH.to_string(),
                    max: 3,
                    mean: 3.0,
                    count: 1
                },
                TokenStats {
                    switch: "S1-S2".to_string(),
                    max: 7,
                    mean: 3.0,
                    count: 3
                },
                TokenStats {
                    switch: "S2-S3".to_string(),
                    max: 1,
                    mean: 1.0,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn empty() {
        assert!(token_stats(None).is_empty());
    }
}
