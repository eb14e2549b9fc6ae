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
//! Metrics derived from the normalized traces and the resolved flows. All derivations are pure
//! functions and return an empty result if their input is empty or missing.

pub mod cumulative;
pub mod fairness;
pub mod fct;
pub mod lowess;
pub mod rate;
pub mod series;
pub mod summary;
pub mod throughput;

pub use cumulative::{bdp_saturation, cumulative_cwnd, BdpSaturation, CumulativePoint};
pub use fairness::{fairness_series, jain_index, FairnessPoint};
pub use fct::{
    fct_records, slowdown_by_size, FctRecord, IdealFctModel, SizeCategory, SlowdownStats,
};
pub use lowess::Lowess;
pub use rate::{rate_gbps, rate_series, ByteUnit, RateUnits, TimeUnit};
pub use summary::{token_stats, TokenStats};
pub use throughput::{windowed_throughput, ThroughputPoint};
