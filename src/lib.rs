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
//! Library for reconstructing per-flow behavior from the event traces of a network simulator.
//!
//! The traces are read by the [`parser`]s, put onto a common time base by the [`timeline`],
//! grouped into flows by [`flows`], and turned into time series and summaries by [`metrics`].
//! [`analysis`] runs all of these steps for a single simulation run.

pub mod analysis;
pub mod config;
pub mod flows;
pub mod metrics;
pub mod parser;
pub mod records;
pub mod timeline;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        analysis::{analyze, load_traces, Report, TraceFiles},
        config::AnalysisConfig,
        flows::{FlowId, FlowTable, FlowTiming},
        parser::TraceParser,
        records::LogRecord,
        timeline::{normalize, Elapsed, GlobalTimeline, Traces},
    };
}
