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
//! Scenario tests running the complete analysis on small traces of a dumbbell run.

use std::path::PathBuf;

use crate::{
    analysis::{analyze, load_traces, AnalysisError, Report, TraceFiles},
    config::AnalysisConfig,
    parser::{
        CongestionLogParser, MessageTraceParser, QueueLogParser, ThroughputLogParser,
        TokenLogParser, TraceParser,
    },
    records::SeriesKind,
    timeline::Traces,
};

const CONGESTION: &str = "\
1000010000 10.0.0.1:100 10.0.0.3:200 0 10000 10000
1000020000 10.0.0.2:101 10.0.0.4:201 0 20000 10000
1000030000 10.0.0.1:100 10.0.0.3:200 0 0 10000
1000030000 10.0.0.2:101 10.0.0.4:201 0 20000 0
";

const MESSAGES: &str = "\
+ 1000000000 125000 10.0.0.1:100 10.0.0.3:200 1
- 1000060000 125000 10.0.0.1:100 10.0.0.3:200 1
+ 1000005000 500 10.0.0.2:101 10.0.0.4:201 2
";

const QUEUES: &str = "\
que 1000001000 S1-S2 3000
pru 1000001000 S1-S2 5
que 1000003000 S1-S2 1000
";

const TOKENS: &str = "\
pru 1000002000 S1-S2 5
pru 1000004000 S1-S2 -1
";

const THROUGHPUT: &str = "\
999999000 500000
1000499000 500000
1002000000 1
";

fn traces() -> Traces {
    Traces {
        congestion: Some(CongestionLogParser::parse_str(CONGESTION).records),
        messages: Some(MessageTraceParser::parse_str(MESSAGES).records),
        queues: Some(QueueLogParser::parse_str(QUEUES).records),
        tokens: Some(TokenLogParser::parse_str(TOKENS).records),
        throughput: Some(ThroughputLogParser::parse_str(THROUGHPUT).records),
    }
}

fn values(report: &Report, kind: SeriesKind) -> Vec<f64> {
    report.series(kind).map(|r| r.value).collect()
}

fn secs(ns: i64) -> f64 {
    ns as f64 * 1e-9
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn dumbbell_run() {
    let report = analyze(traces(), &AnalysisConfig::default());

    // the throughput trace starts first
    assert_eq!(report.origin_ns, Some(999_999_000));

    assert_eq!(report.flows.len(), 2);
    let f1 = &report.flows[0];
    assert_eq!(f1.src, "10.0.0.1:100");
    assert_eq!(f1.start, Some(secs(1_000)));
    assert_eq!(f1.end, Some(secs(61_000)));
    let f2 = &report.flows[1];
    assert_eq!(f2.start, Some(secs(6_000)));
    assert_eq!(f2.end, Some(secs(31_000)));

    let tpt = values(&report, SeriesKind::Throughput);
    assert_eq!(tpt.len(), 2);
    assert!(close(tpt[0], 8.0));

    assert_eq!(
        values(&report, SeriesKind::CumulativeCwnd),
        vec![0.0, 10.0, 30.0, 20.0, 20.0, 20.0, 0.0]
    );
    assert_eq!(values(&report, SeriesKind::Fairness), vec![0.5]);
    assert_eq!(values(&report, SeriesKind::Queue), vec![3.0, 1.0]);
    assert_eq!(values(&report, SeriesKind::Tokens), vec![5.0, -1.0]);
    // one sample without RTT
    assert_eq!(values(&report, SeriesKind::Rate).len(), 3);
    assert_eq!(values(&report, SeriesKind::Cwnd).len(), 4);

    assert_eq!(report.fct.len(), 1);
    assert!(close(report.fct[0].slowdown, 2.0));
    assert_eq!(report.slowdown.len(), 1);
    assert_eq!(report.slowdown[0].count, 1);
    // LOWESS needs at least two points
    assert!(report.slowdown_trend.is_empty());

    assert_eq!(report.tokens.len(), 1);
    assert_eq!(report.tokens[0].max, 5);
    assert_eq!(report.tokens[0].mean, 2.0);
    assert!(report.bdp.is_none());
}

#[test]
fn shifted_traces_give_the_same_report() {
    let shift = |text: &str, tagged: bool| -> String {
        text.lines()
            .map(|line| {
                let mut fields: Vec<String> = line.split_whitespace().map(String::from).collect();
                let i = usize::from(tagged);
                let ts: i64 = fields[i].parse().unwrap();
                fields[i] = (ts + 7_000_000_000).to_string();
                fields.join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let shifted = Traces {
        congestion: Some(CongestionLogParser::parse_str(&shift(CONGESTION, false)).records),
        messages: Some(MessageTraceParser::parse_str(&shift(MESSAGES, true)).records),
        queues: Some(QueueLogParser::parse_str(&shift(QUEUES, true)).records),
        tokens: Some(TokenLogParser::parse_str(&shift(TOKENS, true)).records),
        throughput: Some(ThroughputLogParser::parse_str(&shift(THROUGHPUT, false)).records),
    };

    let a = analyze(traces(), &AnalysisConfig::default());
    let b = analyze(shifted, &AnalysisConfig::default());
    assert_eq!(b.origin_ns, Some(999_999_000 + 7_000_000_000));
    assert_eq!(a.flows, b.flows);
    assert_eq!(a.series, b.series);
    assert_eq!(a.fct, b.fct);
}

#[test]
fn missing_streams_degrade() {
    let traces = Traces {
        congestion: Some(CongestionLogParser::parse_str(CONGESTION).records),
        ..Default::default()
    };
    let report = analyze(traces, &AnalysisConfig::default());
    assert_eq!(report.origin_ns, Some(1_000_010_000));
    // without boundaries, timing comes from the congestion window
    assert_eq!(report.flows[0].start, Some(0.0));
    assert_eq!(report.flows[0].end, Some(0.0));
    assert!(report.fct.is_empty());
    assert!(report.tokens.is_empty());
    assert_eq!(report.series(SeriesKind::Throughput).count(), 0);
    assert_eq!(report.series(SeriesKind::Queue).count(), 0);
}

#[test]
fn empty_traces() {
    let report = analyze(Traces::default(), &AnalysisConfig::default());
    assert_eq!(report.origin_ns, None);
    assert!(report.flows.is_empty());
    assert!(report.series.is_empty());
}

#[test]
fn bdp_saturation_is_reported() {
    let config = AnalysisConfig {
        bdp_bytes: Some(25_000),
        ..Default::default()
    };
    let report = analyze(traces(), &config);
    let bdp = report.bdp.unwrap();
    assert_eq!(bdp.peak_bytes, 30_000.0);
    assert_eq!(bdp.first_reached, Some(secs(21_000)));
    assert!(close(bdp.time_saturated, secs(10_000)));
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("flowscope_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn read_and_write_files() {
    let dir = scratch_dir("files");
    let files = TraceFiles::from_base(dir.join("bolt-simple-dumbbell_SWIFT_0"));
    std::fs::write(&files.congestion, CONGESTION).unwrap();
    std::fs::write(&files.messages, MESSAGES).unwrap();
    std::fs::write(&files.queues, QUEUES).unwrap();
    std::fs::write(&files.throughput, THROUGHPUT).unwrap();

    let traces = load_traces(&files).unwrap();
    assert!(traces.tokens.is_none());
    assert_eq!(traces.congestion.as_ref().map(Vec::len), Some(4));
    assert_eq!(traces.queues.as_ref().map(Vec::len), Some(2));

    let report = analyze(traces, &AnalysisConfig::default());
    let out = dir.join("plots");
    let written = report.write(&out).unwrap();
    assert!(written.contains(&out.join("cwnd.csv")));
    assert!(written.contains(&out.join("summary.json")));
    assert!(!out.join("tokens.csv").exists());

    let csv = std::fs::read_to_string(out.join("cumulative_cwnd.csv")).unwrap();
    assert!(csv.starts_with("series,key,time,value\n"));
    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["num_flows"], 2);
    assert_eq!(summary["label"], "DEFAULT");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn no_trace_files() {
    let dir = scratch_dir("empty");
    let files = TraceFiles::from_base(dir.join("nothing"));
    match load_traces(&files) {
        Err(AnalysisError::NoSources(paths)) => assert_eq!(paths.len(), 5),
        other => panic!("expected NoSources, got {other:?}"),
    }
    std::fs::remove_dir_all(&dir).unwrap();
}
