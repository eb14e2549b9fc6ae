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
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flowscope::{
    analysis::write_csv,
    metrics::{fct_records, slowdown_by_size},
    parser::{MessageTraceParser, TraceParser},
    prelude::*,
    util,
};

/// Flow completion times and slowdowns of all messages in a message trace.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Message trace (`.tr`) to analyze.
    trace: PathBuf,
    /// JSON file with the analysis configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write the completion time of every message to this CSV file.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Base RTT of the ideal network in seconds.
    #[arg(long = "base-rtt")]
    base_rtt: Option<f64>,
    /// Link bandwidth of the ideal network in bits per second.
    #[arg(long)]
    bandwidth: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    util::init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Cannot load configuration from {path:?}"))?,
        None => AnalysisConfig::default(),
    };
    if let Some(base_rtt) = args.base_rtt {
        config.base_rtt = base_rtt;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.link_bandwidth_bps = bandwidth;
    }
    config.validate()?;

    let parsed = MessageTraceParser::read_file(&args.trace)
        .with_context(|| format!("Cannot read message trace {:?}", args.trace))?;
    let traces = normalize(Traces {
        messages: Some(parsed.records),
        ..Default::default()
    });
    let records = fct_records(traces.messages.as_deref(), config.ideal_fct());
    if records.is_empty() {
        log::warn!("No completed messages in {:?}", args.trace);
        return Ok(());
    }
    println!("Found {} completed messages", records.len());

    println!(
        "\n{:<12} {:>7} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "size", "count", "mean", "median", "min", "max", "p95", "p99"
    );
    for s in slowdown_by_size(&records) {
        println!(
            "{:<12} {:>7} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
            s.category.to_string(),
            s.count,
            s.mean,
            s.median,
            s.min,
            s.max,
            s.p95,
            s.p99
        );
    }

    if let Some(output) = args.output {
        write_csv(&output, &records)
            .with_context(|| format!("Cannot write completion times to {output:?}"))?;
        log::info!("Written {output:?}");
    }

    Ok(())
}
