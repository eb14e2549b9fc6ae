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
//! Configuration of an analysis run.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::metrics::{ByteUnit, IdealFctModel, Lowess, RateUnits, TimeUnit};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Parameters of an analysis. Every field has a default, so a configuration file only needs to
/// name the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Congestion control algorithm of the run, e.g. `SWIFT`. Only used for labeling.
    pub cc_mode: String,
    /// Enabled features of the run, e.g. `PRU`. Only used for labeling.
    pub features: Vec<String>,
    /// Length of the throughput window in seconds
    pub throughput_window: f64,
    /// Base round-trip time of the ideal network, in seconds
    pub base_rtt: f64,
    /// Link bandwidth of the ideal network, in bits per second
    pub link_bandwidth_bps: f64,
    pub cwnd_unit: ByteUnit,
    pub rtt_unit: TimeUnit,
    /// Bandwidth-delay product in bytes, for the saturation summary
    pub bdp_bytes: Option<u64>,
    pub lowess_frac: f64,
    pub lowess_iterations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let ideal = IdealFctModel::default();
        let lowess = Lowess::default();
        Self {
            cc_mode: "DEFAULT".to_string(),
            features: Vec::new(),
            throughput_window: 1e-3,
            base_rtt: ideal.base_rtt,
            link_bandwidth_bps: ideal.link_bandwidth_bps,
            cwnd_unit: ByteUnit::default(),
            rtt_unit: TimeUnit::default(),
            bdp_bytes: None,
            lowess_frac: lowess.frac,
            lowess_iterations: lowess.iterations,
        }
    }
}

impl AnalysisConfig {
    /// Read the configuration from a JSON file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Reading configuration from {path:?}");
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are within their domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.throughput_window > 0.0) {
            return Err(ConfigError::Invalid("throughput_window must be positive"));
        }
        if !(self.link_bandwidth_bps > 0.0) {
            return Err(ConfigError::Invalid("link_bandwidth_bps must be positive"));
        }
        if !(self.base_rtt >= 0.0) {
            return Err(ConfigError::Invalid("base_rtt must not be negative"));
        }
        if !(self.lowess_frac > 0.0 && self.lowess_frac <= 1.0) {
            return Err(ConfigError::Invalid("lowess_frac must be in (0, 1]"));
        }
        Ok(())
    }

    /// Label of the run, e.g. `SWIFT_PRU_BTS`.
    pub fn label(&self) -> String {
        std::iter::once(self.cc_mode.as_str())
            .chain(self.features.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn rate_units(&self) -> RateUnits {
        RateUnits {
            cwnd: self.cwnd_unit,
            rtt: self.rtt_unit,
        }
    }

    pub fn ideal_fct(&self) -> IdealFctModel {
        IdealFctModel {
            base_rtt: self.base_rtt,
            link_bandwidth_bps: self.link_bandwidth_bps,
        }
    }

    pub fn lowess(&self) -> Lowess {
        Lowess {
            frac: self.lowess_frac,
            iterations: self.lowess_iterations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.throughput_window, 1e-3);
        assert_eq!(c.base_rtt, 20e-6);
        assert_eq!(c.link_bandwidth_bps, 100e9);
        assert_eq!(c.label(), "DEFAULT");
    }

    #[test]
    fn partial_json() {
        let c: AnalysisConfig = serde_json::from_str(
            r#"{"cc_mode": "SWIFT", "features": ["PRU"], "rtt_unit": "microseconds"}"#,
        )
        .unwrap();
        assert_eq!(c.label(), "SWIFT_PRU");
        assert_eq!(c.rtt_unit, TimeUnit::Microseconds);
        assert_eq!(c.cwnd_unit, ByteUnit::Bytes);
        assert_eq!(c.lowess_iterations, 3);
    }

    #[test]
    fn invalid_values() {
        let c = AnalysisConfig {
            throughput_window: 0.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
        let c = AnalysisConfig {
            lowess_frac: 1.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
        let c = AnalysisConfig {
            base_rtt: f64::NAN,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn from_file() {
        let path = std::env::temp_dir().join("flowscope_config_test.json");
        std::fs::write(&path, r#"{"throughput_window": 0.002, "bdp_bytes": 250000}"#).unwrap();
        let c = AnalysisConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(c.throughput_window, 0.002);
        assert_eq!(c.bdp_bytes, Some(250_000));

        assert!(matches!(
            AnalysisConfig::from_file(std::env::temp_dir().join("flowscope_no_such_config.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
