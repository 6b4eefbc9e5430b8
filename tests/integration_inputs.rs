//! Integration tests for CSV inputs, batch mode and input validation.

mod common;

use std::fs;
use std::io::Write;

use baseload_sim::batch::run_batch;
use baseload_sim::io::export::export_yearly_csv;
use baseload_sim::io::import::{load_batch, load_profiles};
use baseload_sim::profiles::{InputError, ProductionProfile};
use baseload_sim::sim::{simulate_dispatch, simulate_scenario};

#[test]
fn missing_market_hour_is_an_alignment_error() {
    let timestamps = common::hourly_timestamps(common::midnight(2023, 6, 1), 3);
    let market = common::flat_market(&timestamps[..2], 50.0);
    let production =
        ProductionProfile::new(timestamps.clone(), vec![20.0; 3], vec![5.0; 3]).unwrap();

    let err = simulate_dispatch(&production, &market, &common::scenario(10.0, &[(2, 5.0)]))
        .unwrap_err();
    assert_eq!(
        err,
        InputError::Alignment {
            timestamp: timestamps[2]
        }
    );
    assert!(err.to_string().starts_with("input alignment error"));
}

#[test]
fn profile_file_drives_a_simulation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "timestamp,wind,solar,spot").unwrap();
    for (i, t) in common::hourly_timestamps(common::midnight(2023, 6, 1), 48)
        .iter()
        .enumerate()
    {
        // Windy first half of each day, calm second half
        let wind = if i % 24 < 12 { 0.5 } else { 0.05 };
        writeln!(file, "{},{wind},0.0,{}", t.format("%Y-%m-%d %H:%M"), 40 + i).unwrap();
    }
    drop(file);

    let profiles = load_profiles(&path).unwrap();
    assert_eq!(profiles.production.len(), 48);

    let mut config = common::scenario(20.0, &[(4, 10.0)]);
    config.plant.wind_capacity_mw = 100.0;
    config.plant.solar_capacity_mw = 0.0;
    let output = simulate_scenario(&profiles, &config).unwrap();

    assert_eq!(output.yearly.len(), 1);
    let year = &output.yearly[0];
    assert_eq!(year.hours, 48);
    assert_eq!(year.total_solar_mwh, 0.0);
    // Storage covers part of the calm hours but never a whole one
    assert!(output.hourly.iter().any(|r| r.storage_discharged_mwh > 0.0));
    assert!(year.missing_energy_mwh > 0.0);
    assert_eq!(year.green_hours, 24);
}

#[test]
fn batch_file_runs_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let batch_path = dir.path().join("batch.csv");
    fs::write(
        &batch_path,
        "grid_connection,wind_cap,solar_cap,baseload,battery_2h_mw,battery_2h_price,hydro_mw\n\
         60,100,50,30,10,500000,\n\
         0,80,80,25,,,20\n",
    )
    .unwrap();

    let rows = load_batch(&batch_path).unwrap();
    assert_eq!(rows.len(), 2);

    let profiles = common::synthetic_profiles(1);
    let base = common::scenario(30.0, &[]);
    let results = run_batch(&rows, &base, &profiles).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].simulation_id, 1);
    assert_eq!(results[1].simulation_id, 2);
    assert_eq!(results[0].grid_connection_mw, 60.0);
    assert_eq!(results[1].grid_connection_mw, 0.0);
    assert_eq!(results[1].baseload_mw, 25.0);
    assert_eq!(results[0].storage[0].name, "BESS 2h");
    assert_eq!(results[1].storage[0].name, "Pumped hydro");

    let out = dir.path().join("batch_results.csv");
    export_yearly_csv(&results, &out).unwrap();
    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert!(headers.iter().any(|h| h == "BESS 2h power_mw"));
    assert!(headers.iter().any(|h| h == "Pumped hydro zero_hours_pct"));
    assert_eq!(reader.records().count(), 2);
}

#[test]
fn invalid_batch_row_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let batch_path = dir.path().join("batch.csv");
    fs::write(&batch_path, "wind_cap,baseload\n100,30\n100,-5\n").unwrap();

    let rows = load_batch(&batch_path).unwrap();
    let err = run_batch(&rows, &common::scenario(30.0, &[]), &common::synthetic_profiles(1))
        .unwrap_err();
    assert!(err.to_string().contains("batch row 2"));
}
