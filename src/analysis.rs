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
//! Analysis of a single simulation run: load the traces, put them on a common time base,
//! resolve the flows and derive all metrics.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    config::AnalysisConfig,
    flows::{FlowTable, FlowTimingRecord},
    metrics::{self, series, BdpSaturation, FctRecord, SlowdownStats, TokenStats},
    parser::{
        CongestionLogParser, MessageTraceParser, ParserError, QueueLogParser, ThroughputLogParser,
        TokenLogParser, TraceParser,
    },
    records::{SeriesKind, SeriesRecord},
    timeline::{normalize, Traces},
    util::PathBufExt,
};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("None of the trace files exist: {0:?}")]
    NoSources(Vec<PathBuf>),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paths of all trace files of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFiles {
    /// Congestion samples (`.log`)
    pub congestion: PathBuf,
    /// Message boundaries (`.tr`)
    pub messages: PathBuf,
    /// Queue occupancy (`.qlen`)
    pub queues: PathBuf,
    /// Token counters (`.pru`)
    pub tokens: PathBuf,
    /// Dequeued bytes at the bottleneck (`.tpt`)
    pub throughput: PathBuf,
}

impl TraceFiles {
    /// All traces written by the simulator for the run `base`, e.g.
    /// `outputs/bolt-simple-dumbbell_SWIFT_0`.
    pub fn from_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            congestion: base.suffixed("log"),
            messages: base.suffixed("tr"),
            queues: base.suffixed("qlen"),
            tokens: base.suffixed("pru"),
            throughput: base.suffixed("tpt"),
        }
    }

    pub fn paths(&self) -> [&Path; 5] {
        [
            self.congestion.as_path(),
            self.messages.as_path(),
            self.queues.as_path(),
            self.tokens.as_path(),
            self.throughput.as_path(),
        ]
    }
}

/// Read one trace. A missing file is remembered in `unavailable` and yields `None`.
fn load<P: TraceParser>(
    path: &Path,
    unavailable: &mut Vec<PathBuf>,
) -> Result<Option<Vec<P::Record>>, AnalysisError> {
    match P::read_file(path) {
        Ok(parsed) => Ok(Some(parsed.records)),
        Err(ParserError::SourceUnavailable(path)) => {
            log::warn!("{} unavailable: {path:?}", P::description());
            unavailable.push(path);
            Ok(None)
        }
        Err(ParserError::Io(e)) => Err(e.into()),
    }
}

/// Read all traces of a run. Missing files are skipped, unless not a single one exists.
pub fn load_traces(files: &TraceFiles) -> Result<Traces, AnalysisError> {
    let mut unavailable = Vec::new();
    let traces = Traces {
        congestion: load::<CongestionLogParser>(&files.congestion, &mut unavailable)?,
        messages: load::<MessageTraceParser>(&files.messages, &mut unavailable)?,
        queues: load::<QueueLogParser>(&files.queues, &mut unavailable)?,
        tokens: load::<TokenLogParser>(&files.tokens, &mut unavailable)?,
        throughput: load::<ThroughputLogParser>(&files.throughput, &mut unavailable)?,
    };
    if traces.is_empty() {
        return Err(AnalysisError::NoSources(unavailable));
    }
    Ok(traces)
}

/// Point of the slowdown trend over message size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TrendPoint {
    /// Message size in bytes
    pub size: f64,
    pub slowdown: f64,
}

/// Everything derived from a single run.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Report {
    /// Label of the run, built from the congestion control mode and the features
    pub label: String,
    /// Global start of the traces in nanoseconds
    pub origin_ns: Option<i64>,
    pub flows: Vec<FlowTimingRecord>,
    pub series: Vec<SeriesRecord>,
    pub fct: Vec<FctRecord>,
    pub slowdown: Vec<SlowdownStats>,
    pub slowdown_trend: Vec<TrendPoint>,
    pub tokens: Vec<TokenStats>,
    pub bdp: Option<BdpSaturation>,
}

/// Summary of a report, written as `summary.json`.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    label: &'a str,
    origin_ns: Option<i64>,
    num_flows: usize,
    num_messages: usize,
    slowdown: &'a [SlowdownStats],
    tokens: &'a [TokenStats],
    bdp: Option<&'a BdpSaturation>,
}

/// Derive all metrics of a run.
pub fn analyze(traces: Traces, config: &AnalysisConfig) -> Report {
    let label = config.label();
    log::info!("Analyzing run {label}");
    let traces = normalize(traces);
    let congestion = traces.congestion.as_deref();
    let messages = traces.messages.as_deref();

    let flows = FlowTable::resolve(messages, congestion);
    let units = config.rate_units();

    let cumulative = metrics::cumulative_cwnd(congestion);
    let bdp = config
        .bdp_bytes
        .and_then(|bdp| metrics::bdp_saturation(&cumulative, bdp, config.cwnd_unit));
    let throughput = metrics::windowed_throughput(
        traces.throughput.as_deref(),
        config.throughput_window,
    );
    let fairness = metrics::fairness_series(congestion);

    let fct = metrics::fct_records(messages, config.ideal_fct());
    let slowdown = metrics::slowdown_by_size(&fct);
    let trend_input: Vec<(f64, f64)> = fct.iter().map(|r| (r.size as f64, r.slowdown)).collect();
    let slowdown_trend = config
        .lowess()
        .fit(&trend_input)
        .into_iter()
        .map(|(size, slowdown)| TrendPoint { size, slowdown })
        .collect();

    let mut all_series = series::flow_series(&flows, units);
    all_series.extend(series::queue_series(traces.queues.as_deref()));
    all_series.extend(series::token_series(traces.tokens.as_deref()));
    all_series.extend(series::throughput_series(&throughput));
    all_series.extend(series::cumulative_series(&cumulative, config.cwnd_unit));
    all_series.extend(series::fairness_series(&fairness));

    let report = Report {
        label,
        origin_ns: traces.timeline.origin(),
        flows: flows.records(),
        series: all_series,
        fct,
        slowdown,
        slowdown_trend,
        tokens: metrics::token_stats(traces.tokens.as_deref()),
        bdp,
    };
    log::info!(
        "Found {} flows, {} completed messages and {} series points",
        report.flows.len(),
        report.fct.len(),
        report.series.len()
    );
    report
}

/// Write all records to a CSV file, with a header line.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_path(path)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a table into `dir`, unless it is empty.
fn write_table<T: Serialize>(
    dir: &Path,
    name: &str,
    records: &[T],
    written: &mut Vec<PathBuf>,
) -> Result<(), csv::Error> {
    if records.is_empty() {
        return Ok(());
    }
    let path = dir.then(name);
    write_csv(&path, records)?;
    written.push(path);
    Ok(())
}

impl Report {
    /// All points of one kind of series.
    pub fn series(&self, kind: SeriesKind) -> impl Iterator<Item = &SeriesRecord> {
        self.series.iter().filter(move |r| r.series == kind)
    }

    /// Write the report into `dir`: one CSV per non-empty series kind, the flow timings, the
    /// completion times and the slowdown statistics, plus `summary.json`. Returns the paths of
    /// all files written.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, AnalysisError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for kind in SeriesKind::iter() {
            let records: Vec<&SeriesRecord> = self.series(kind).collect();
            if records.is_empty() {
                log::debug!("No points in series {kind}");
            }
            write_table(dir, &format!("{kind}.csv"), &records, &mut written)?;
        }
        write_table(dir, "flows.csv", &self.flows, &mut written)?;
        write_table(dir, "fct.csv", &self.fct, &mut written)?;
        write_table(dir, "slowdown.csv", &self.slowdown, &mut written)?;
        write_table(dir, "slowdown_trend.csv", &self.slowdown_trend, &mut written)?;
        write_table(dir, "token_stats.csv", &self.tokens, &mut written)?;

        let path = dir.then("summary.json");
        let summary = Summary {
            label: &self.label,
            origin_ns: self.origin_ns,
            num_flows: self.flows.len(),
            num_messages: self.fct.len(),
            slowdown: &self.slowdown,
            tokens: &self.tokens,
            bdp: self.bdp.as_ref(),
        };
        fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        written.push(path);

        for path in written.iter() {
            log::info!("Written {path:?}");
        }
        Ok(written)
    }
}
