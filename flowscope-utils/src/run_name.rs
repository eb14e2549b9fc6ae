//! Classification of simulation runs from their output names.
//!
//! The simulator encodes the congestion-control mode and the enabled switch features in the
//! trace file names, e.g. `bolt-fairness_DEFAULT_PRU_0.log`. The analysis itself never looks at
//! file names; these helpers only exist so that a caller can derive a default configuration when
//! none is given explicitly.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Congestion-control algorithm a run was simulated with.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CcMode {
    #[default]
    Default,
    Swift,
    Bolt,
    Tcp,
}

/// Switch-side features that may be enabled in a run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum Feature {
    #[strum(serialize = "BTS")]
    Bts,
    #[strum(serialize = "PRU")]
    Pru,
    #[strum(serialize = "ABS")]
    Abs,
    #[strum(serialize = "MSG_AGG")]
    MsgAgg,
    #[strum(serialize = "PER_HOP")]
    PerHop,
}

impl Feature {
    /// Marker of the feature as it appears in a run name.
    fn marker(&self) -> &'static str {
        match self {
            Feature::Bts => "BTS",
            Feature::Pru => "PRU",
            Feature::Abs => "ABS",
            Feature::MsgAgg => "MSGAGG",
            Feature::PerHop => "PERHOP",
        }
    }
}

lazy_static! {
    static ref FEATURE_RE: Regex = Regex::new(r"_(BTS|PRU|ABS|MSGAGG|PERHOP)").unwrap();
}

/// Extract the congestion control mode from a run name. Explicit `_DEFAULT_` and `_SWIFT_`
/// markers win; otherwise any `_<MODE>_` or trailing `_<MODE>` is accepted. Falls back to
/// [`CcMode::Default`].
pub fn extract_cc_mode(name: impl AsRef<str>) -> CcMode {
    let name = name.as_ref().to_uppercase();
    if name.contains("_DEFAULT_") {
        return CcMode::Default;
    }
    if name.contains("_SWIFT_") {
        return CcMode::Swift;
    }

    let mode = CcMode::iter()
        .find(|mode| name.contains(&format!("_{mode}_")) || name.ends_with(&format!("_{mode}")))
        .unwrap_or_default();
    log::trace!("classified run name {name:?} as {mode}");
    mode
}

/// Extract the enabled features from a run name, in canonical order and without duplicates.
pub fn extract_features(name: impl AsRef<str>) -> Vec<Feature> {
    let found: BTreeSet<&str> = FEATURE_RE
        .captures_iter(name.as_ref())
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    Feature::iter()
        .filter(|f| found.contains(f.marker()))
        .collect()
}
