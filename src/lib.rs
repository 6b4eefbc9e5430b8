//! Hourly simulation of a wind and solar park delivering a baseload contract
//! with a fleet of batteries and pumped hydro.

pub mod batch;
pub mod cli;
pub mod config;
pub mod finance;
pub mod io;
pub mod log;
pub mod profiles;
pub mod reporting;
/// Dispatch, yearly aggregation and multi-year orchestration.
pub mod sim;
pub mod storage;
