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
    prelude::*,
    util::{self, PathBufExt},
};
use flowscope_utils::{
    other::get_timestamp,
    run_name::{extract_cc_mode, extract_features},
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Common path of the trace files of a run, without extension, e.g.
    /// `outputs/bolt-simple-dumbbell_SWIFT_0`.
    base: PathBuf,
    /// JSON file with the analysis configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory. Defaults to `plots/<run>_<timestamp>`.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Congestion control mode of the run. Guessed from the file name if not configured.
    #[arg(short = 'm', long = "cc-mode")]
    cc_mode: Option<String>,
    /// Feature enabled in the run. Can be given multiple times.
    #[arg(short, long = "feature")]
    features: Vec<String>,
    /// Length of the throughput window in seconds.
    #[arg(short = 'w', long = "window")]
    throughput_window: Option<f64>,
    /// Bandwidth-delay product in bytes, for the saturation summary.
    #[arg(short, long = "bdp")]
    bdp_bytes: Option<u64>,
}

impl Args {
    /// Apply the command-line overrides. Without any configuration of the mode, fall back to the
    /// markers in the run name.
    fn configure(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        let run_name = self.run_name();
        match (&self.cc_mode, &self.config) {
            (Some(mode), _) => config.cc_mode = mode.to_uppercase(),
            (None, None) => config.cc_mode = extract_cc_mode(&run_name).to_string(),
            (None, Some(_)) => {}
        }
        if !self.features.is_empty() {
            config.features = self.features.iter().map(|f| f.to_uppercase()).collect();
        } else if self.config.is_none() {
            config.features = extract_features(&run_name)
                .iter()
                .map(ToString::to_string)
                .collect();
        }
        if let Some(window) = self.throughput_window {
            config.throughput_window = window;
        }
        if self.bdp_bytes.is_some() {
            config.bdp_bytes = self.bdp_bytes;
        }
        config
    }

    fn run_name(&self) -> String {
        self.base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn main() -> anyhow::Result<()> {
    util::init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Cannot load configuration from {path:?}"))?,
        None => AnalysisConfig::default(),
    };
    let config = args.configure(config);
    config.validate()?;
    log::info!(
        "Congestion control mode: {}, features: {:?}",
        config.cc_mode,
        config.features
    );

    let files = TraceFiles::from_base(&args.base);
    let traces =
        load_traces(&files).with_context(|| format!("Cannot load traces of {:?}", args.base))?;
    let report = analyze(traces, &config);

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from("plots").then(format!("{}_{}", args.run_name(), get_timestamp()))
    });
    let written = report
        .write(&output)
        .with_context(|| format!("Cannot write the report to {output:?}"))?;
    log::info!("Wrote {} files to {output:?}", written.len());

    for flow in report.flows.iter() {
        println!(
            "{}->{}: start={} end={}",
            flow.src,
            flow.dst,
            fmt_time(flow.start),
            fmt_time(flow.end)
        );
    }

    Ok(())
}

fn fmt_time(t: Option<f64>) -> String {
    t.map(|t| format!("{t:.6}s"))
        .unwrap_or_else(|| "-".to_string())
}
