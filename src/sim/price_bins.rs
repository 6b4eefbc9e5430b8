//! Spot-price bin summary of hourly missing and excess energy.

use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use chrono::Datelike;

use super::types::HourlyRecord;

/// Mean hourly missing and excess energy for hours whose spot price falls in one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBin {
    pub year: i32,
    /// Lower edge of the bin: `floor(spot / step) * step` (EUR/MWh).
    pub price_bin: f64,
    pub hours: usize,
    pub avg_missing_mwh: f64,
    pub avg_excess_mwh: f64,
}

/// Groups hourly records by year and spot-price step, sorted by (year, bin).
///
/// # Errors
///
/// Returns an error if `step` is not a positive, finite number.
pub fn summarize(records: &[HourlyRecord], step: f64) -> Result<Vec<PriceBin>> {
    ensure!(
        step > 0.0 && step.is_finite(),
        "price step must be > 0, got {step}"
    );

    // (year, bin index) -> (hours, missing, excess)
    let mut bins: BTreeMap<(i32, i64), (usize, f64, f64)> = BTreeMap::new();
    for r in records {
        let index = (r.spot / step).floor() as i64;
        let entry = bins
            .entry((r.timestamp.year(), index))
            .or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += r.missing_energy_mwh;
        entry.2 += r.excess_energy_mwh;
    }

    Ok(bins
        .into_iter()
        .map(|((year, index), (hours, missing, excess))| PriceBin {
            year,
            price_bin: index as f64 * step,
            hours,
            avg_missing_mwh: missing / hours as f64,
            avg_excess_mwh: excess / hours as f64,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{HourInput, HourOutcome};
    use chrono::NaiveDate;
    use float_cmp::assert_approx_eq;

    fn make_record(year: i32, spot: f64, missing: f64, excess: f64) -> HourlyRecord {
        let input = HourInput {
            timestamp: NaiveDate::from_ymd_opt(year, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            wind_mw: 0.0,
            solar_mw: 0.0,
            baseload_mw: 0.0,
            grid_connection_mw: None,
        };
        let outcome = HourOutcome {
            missing_mwh: missing,
            excess_mwh: excess,
            ..HourOutcome::default()
        };
        HourlyRecord::new(&input, &outcome, spot)
    }

    #[test]
    fn bins_by_floor_of_step() {
        let records = vec![
            make_record(2023, 12.0, 2.0, 0.0),
            make_record(2023, 19.9, 4.0, 1.0),
            make_record(2023, 20.0, 0.0, 3.0),
            make_record(2023, -5.0, 0.0, 8.0),
        ];
        let bins = summarize(&records, 10.0).unwrap();
        let edges: Vec<f64> = bins.iter().map(|b| b.price_bin).collect();
        assert_eq!(edges, vec![-10.0, 10.0, 20.0]);

        let ten = &bins[1];
        assert_eq!(ten.hours, 2);
        assert_approx_eq!(f64, ten.avg_missing_mwh, 3.0);
        assert_approx_eq!(f64, ten.avg_excess_mwh, 0.5);
    }

    #[test]
    fn sorted_by_year_then_bin() {
        let records = vec![
            make_record(2024, 5.0, 0.0, 0.0),
            make_record(2023, 50.0, 0.0, 0.0),
            make_record(2023, 5.0, 0.0, 0.0),
        ];
        let keys: Vec<(i32, f64)> = summarize(&records, 25.0)
            .unwrap()
            .iter()
            .map(|b| (b.year, b.price_bin))
            .collect();
        assert_eq!(keys, vec![(2023, 0.0), (2023, 50.0), (2024, 0.0)]);
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(summarize(&[], 0.0).is_err());
        assert!(summarize(&[], -1.0).is_err());
        assert!(summarize(&[], 5.0).unwrap().is_empty());
    }
}
