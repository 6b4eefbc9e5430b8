//! CSV export for yearly results, hourly detail and price-step summaries.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::kpi::storage_names;
use crate::sim::price_bins::PriceBin;
use crate::sim::{HourlyRecord, YearlyResult};

/// Column header for hourly detail export.
const HOURLY_HEADER: &str = "timestamp,wind_mw,solar_mw,baseload_mw,storage_charged_mwh,\
                             storage_discharged_mwh,missing_energy_mwh,excess_energy_mwh,\
                             redundant_energy_mwh,cycle_loss_mwh,spot,met";

/// Fixed leading columns of the yearly results export.
const YEARLY_HEADER: &str = "simulation_id,year,hours,wind_capacity_mw,solar_capacity_mw,\
                             baseload_mw,grid_connection_mw,total_wind_mwh,total_solar_mwh,\
                             baseload_energy_mwh,produced_to_baseload_mwh,wind_in_baseload_mwh,\
                             solar_in_baseload_mwh,excess_wind_mwh,excess_solar_mwh,\
                             redundant_wind_mwh,redundant_solar_mwh,charged_wind_mwh,\
                             charged_solar_mwh,missing_energy_mwh,cycle_loss_mwh,green_hours,\
                             green_hours_pct,res_share_pct,redundant_share_pct,\
                             overproduction_share_pct,missing_vwap,excess_vwap,wind_vwap,\
                             solar_vwap,avg_spot,baseload_cost_fixed,baseload_cost_vwap,\
                             break_even_fixed,break_even_vwap,break_even_market";

const PRICE_BIN_HEADER: &str = "year,price_bin,hours,avg_missing_mwh,avg_excess_mwh";

/// Timestamp layout used in exported files.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn header(columns: &str) -> impl Iterator<Item = &str> {
    columns.split(',').map(str::trim)
}

/// Exports yearly results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_yearly_csv(results: &[YearlyResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_yearly_csv(results, io::BufWriter::new(file))
}

/// Writes yearly results as CSV to any writer.
///
/// After the fixed columns come three columns per storage unit seen in any
/// result (`<name> power_mw`, `<name> avg_daily_cycles`,
/// `<name> zero_hours_pct`); they are left empty for rows without that unit.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_yearly_csv(results: &[YearlyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let names = storage_names(results);

    let mut columns: Vec<String> = header(YEARLY_HEADER).map(String::from).collect();
    for name in &names {
        columns.push(format!("{name} power_mw"));
        columns.push(format!("{name} avg_daily_cycles"));
        columns.push(format!("{name} zero_hours_pct"));
    }
    wtr.write_record(&columns)?;

    for r in results {
        let mut row = vec![
            r.simulation_id.to_string(),
            r.year.to_string(),
            r.hours.to_string(),
            format!("{:.3}", r.wind_capacity_mw),
            format!("{:.3}", r.solar_capacity_mw),
            format!("{:.3}", r.baseload_mw),
            format!("{:.3}", r.grid_connection_mw),
            format!("{:.3}", r.total_wind_mwh),
            format!("{:.3}", r.total_solar_mwh),
            format!("{:.3}", r.baseload_energy_mwh),
            format!("{:.3}", r.produced_to_baseload_mwh),
            format!("{:.3}", r.wind_in_baseload_mwh),
            format!("{:.3}", r.solar_in_baseload_mwh),
            format!("{:.3}", r.excess_wind_mwh),
            format!("{:.3}", r.excess_solar_mwh),
            format!("{:.3}", r.redundant_wind_mwh),
            format!("{:.3}", r.redundant_solar_mwh),
            format!("{:.3}", r.charged_wind_mwh),
            format!("{:.3}", r.charged_solar_mwh),
            format!("{:.3}", r.missing_energy_mwh),
            format!("{:.3}", r.cycle_loss_mwh),
            r.green_hours.to_string(),
            format!("{:.2}", r.green_hours_pct),
            format!("{:.2}", r.res_share_pct),
            format!("{:.2}", r.redundant_share_pct),
            format!("{:.2}", r.overproduction_share_pct),
            format!("{:.4}", r.prices.missing_vwap),
            format!("{:.4}", r.prices.excess_vwap),
            format!("{:.4}", r.prices.wind_vwap),
            format!("{:.4}", r.prices.solar_vwap),
            format!("{:.2}", r.prices.avg_spot),
            format!("{:.2}", r.baseload_cost_fixed),
            format!("{:.2}", r.baseload_cost_vwap),
            format!("{:.2}", r.break_even_fixed),
            format!("{:.2}", r.break_even_vwap),
            format!("{:.2}", r.break_even_market),
        ];
        for name in &names {
            match r.storage.iter().find(|s| s.name == *name) {
                Some(s) => {
                    row.push(format!("{:.3}", s.power_mw));
                    row.push(format!("{:.2}", s.avg_daily_cycles));
                    row.push(format!("{:.2}", s.zero_hours_pct));
                }
                None => row.extend([String::new(), String::new(), String::new()]),
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports hourly detail to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_hourly_csv(records: &[HourlyRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_hourly_csv(records, io::BufWriter::new(file))
}

/// Writes hourly detail as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(records: &[HourlyRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(HOURLY_HEADER))?;

    for r in records {
        wtr.write_record(&[
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.3}", r.wind_mw),
            format!("{:.3}", r.solar_mw),
            format!("{:.4}", r.baseload_mw),
            format!("{:.4}", r.storage_charged_mwh),
            format!("{:.4}", r.storage_discharged_mwh),
            format!("{:.4}", r.missing_energy_mwh),
            format!("{:.4}", r.excess_energy_mwh),
            format!("{:.4}", r.redundant_energy_mwh),
            format!("{:.4}", r.cycle_loss_mwh),
            format!("{:.2}", r.spot),
            r.met.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a price-step summary to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_price_bins_csv(bins: &[PriceBin], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_price_bins_csv(bins, io::BufWriter::new(file))
}

/// Writes a price-step summary as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_price_bins_csv(bins: &[PriceBin], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(PRICE_BIN_HEADER))?;

    for b in bins {
        wtr.write_record(&[
            b.year.to_string(),
            format!("{:.2}", b.price_bin),
            b.hours.to_string(),
            format!("{:.4}", b.avg_missing_mwh),
            format!("{:.4}", b.avg_excess_mwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
