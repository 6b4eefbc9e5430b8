/// Calendar-year splitting of the hourly index.
pub mod calendar;
/// Hourly dispatch step.
pub mod dispatch;
pub mod engine;
pub mod kpi;
/// Running yearly totals.
pub mod metrics;
/// Price-step summary of missing and excess energy.
pub mod price_bins;
pub mod types;
/// Yearly driver.
pub mod year;

pub use engine::{Engine, SimulationOutput, simulate_dispatch, simulate_scenario};
pub use kpi::YearlyResult;
pub use types::HourlyRecord;
