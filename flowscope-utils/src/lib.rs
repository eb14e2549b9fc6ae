//! Utility library for the FlowScope project

pub mod other;
pub mod run_name;
