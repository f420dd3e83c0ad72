//! End-to-end tests over files on disk: catalog CSV and per-sol pressure
//! files in, aggregate CSV and summary JSON out.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use dustspec::catalog::{columns, EventCatalog, EventFilter};
use dustspec::clock;
use dustspec::loader::{ingest_raw_file, sol_file_name, CsvSolDirectory, SolSource};
use dustspec::output::write_batch;
use dustspec::pipeline::{CaseId, CaseStatus, Pipeline, PipelineConfig, PipelineError, Statistic, WindowSpec};
use tempfile::tempdir;

const SOL: u32 = 100;

fn catalog_row(id: u32, sol: u32, ltst_hours: f64, dp: f64) -> String {
    let mut fields = vec![String::new(); 159];
    fields[columns::ID] = id.to_string();
    fields[columns::SOL] = sol.to_string();
    fields[columns::LTST_HOURS] = ltst_hours.to_string();
    fields[columns::UTC] = "2019-100T03:00:00.000Z".to_string();
    fields[columns::PRESSURE_DROP] = dp.to_string();
    fields[columns::WIND_SPEED_AVG] = "4.0".to_string();
    fields[columns::WIND_SPEED_STD] = "1.0".to_string();
    fields[columns::WIND_DIR_AVG] = "200".to_string();
    fields[columns::WIND_DIR_STD] = "15".to_string();
    fields[columns::TEMPERATURE_AVG] = "245.0".to_string();
    fields[columns::TEMPERATURE_STD] = "2.0".to_string();
    fields.join(",")
}

fn write_catalog(path: &Path) {
    let header = (0..159).map(|i| format!("col{}", i)).collect::<Vec<_>>().join(",");
    let rows = [
        catalog_row(1, SOL, 12.0, -2.5),
        catalog_row(2, SOL, 12.1, -3.0),
        catalog_row(3, 200, 12.0, -4.0),
        catalog_row(5, SOL, 12.05, -0.5),
    ];
    fs::write(path, format!("{}\n{}\n", header, rows.join("\n"))).unwrap();
}

/// 1 Hz samples from 11:40 to 12:20 local time on `sol`.
fn write_sol(dir: &Path, sol: u32) {
    let start = clock::sol_start(sol) + clock::duration_from_secs(11.0 * 3600.0 + 40.0 * 60.0);
    let mut text = String::from("MUTC,LMST,LTST,UTC,p\n");
    for i in 0..2400 {
        let t = i as f64;
        let timestamp = start + clock::duration_from_secs(t);
        let pressure = 710.0 - 0.0005 * t + 0.3 * (2.0 * PI * 0.05 * t).sin() + 0.02 * ((i * 13 % 7) as f64 - 3.0);
        text.push_str(&format!(
            "{},{} 11:20:00,{} 12:00:00,2019-100T03:00:00.000Z,{}\n",
            timestamp.format(clock::LOCAL_TIME_FORMAT),
            clock::ltst_prefix(sol),
            clock::ltst_prefix(sol),
            pressure
        ));
    }
    fs::write(dir.join(sol_file_name(sol)), text).unwrap();
}

#[test]
fn test_event_batch_writes_aggregate_and_summary() {
    let dir = tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.csv");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    write_catalog(&catalog_path);
    write_sol(&data_dir, SOL);

    let catalog = EventCatalog::from_path(&catalog_path).unwrap();
    assert_eq!(catalog.len(), 4);
    let ids = catalog.select(&EventFilter::PressureDropBelow(-1.0));
    assert_eq!(ids, vec![1, 2, 3]);

    let mut cases: Vec<CaseId> = ids.into_iter().map(CaseId::Event).collect();
    cases.push(CaseId::Event(99));

    let source = CsvSolDirectory::new(&data_dir);
    let config = PipelineConfig::default();
    let pipeline = Pipeline::new(Some(&catalog), &source, config.clone());
    let outcome = pipeline.run_batch_titled("dP_~-1", &cases).unwrap();

    assert_eq!(outcome.report.ok_count(), 2);
    assert_eq!(outcome.report.skipped_count(), 2);
    assert!(matches!(outcome.report.records[3].status, CaseStatus::Skipped(_)));
    assert_eq!(outcome.curves.len(), 1);
    assert_eq!(outcome.curves[0].name, "ratio");
    assert_eq!(outcome.curves[0].len(), 290);

    let out_dir = dir.path().join("results");
    let run_dir = write_batch(&out_dir, "dP_~-1", &config, &outcome, true).unwrap();
    assert_eq!(run_dir, out_dir.join("ratio_before_600s_lag20s"));

    let aggregate = fs::read_to_string(run_dir.join("aggregate.csv")).unwrap();
    let lines: Vec<&str> = aggregate.lines().collect();
    assert_eq!(lines[0], "curve,frequency,value");
    assert_eq!(lines.len(), 291);
    assert!(lines[1].starts_with("ratio,"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(run_dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["selection"], "dP_~-1");
    assert_eq!(summary["requested"], 4);
    assert_eq!(summary["contributed"], 2);
    assert_eq!(summary["skipped"].as_array().unwrap().len(), 2);
    assert_eq!(summary["curves"][0]["bins"], 290);

    assert!(run_dir.join("cases").join("ID=00001,sol=0100.csv").exists());
    assert!(run_dir.join("cases").join("ID=00002,sol=0100.csv").exists());
}

#[test]
fn test_quiet_sol_batch_without_catalog() {
    let dir = tempdir().unwrap();
    write_sol(dir.path(), SOL);

    let source = CsvSolDirectory::new(dir.path());
    let config = PipelineConfig {
        window: WindowSpec::FixedLocalTime {
            hour: 12,
            duration: 600.0,
        },
        statistic: Statistic::Smoothed,
        ..Default::default()
    };
    let pipeline = Pipeline::new(None, &source, config);
    let cases = [CaseId::QuietSol { sol: SOL, hour: 12 }, CaseId::QuietSol { sol: 5, hour: 12 }];
    let outcome = pipeline.run_batch(&cases).unwrap();

    assert_eq!(outcome.report.ok_count(), 1);
    let names: Vec<&str> = outcome.curves.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["spectrum", "smoothed"]);
    assert_eq!(outcome.curves[0].len(), 300);
    assert_eq!(outcome.curves[1].len(), 300);
}

#[test]
fn test_every_case_missing_is_an_error() {
    let dir = tempdir().unwrap();
    let source = CsvSolDirectory::new(dir.path());
    let pipeline = Pipeline::new(None, &source, PipelineConfig::default());
    let result = pipeline.run_batch(&[CaseId::QuietSol { sol: 7, hour: 12 }]);
    assert!(matches!(result, Err(PipelineError::NoCases(_))));
}

#[test]
fn test_ingest_then_load() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("raw_sol100.csv");
    fs::write(
        &raw,
        "SCLK,AOBT,LMST,LTST,UTC,PRESSURE,TEMP\n\
         1,1,00100 11:20:00,00100 12:00:00,2019-100T03:00:00.500Z,711.25,10\n\
         2,2,00100 11:20:01,00100 12:00:01,2019-100T03:00:01.500Z,,10\n",
    )
    .unwrap();

    let written = ingest_raw_file(&raw, None).unwrap();
    assert_eq!(written, dir.path().join("ps_calib_0100.csv"));

    let series = CsvSolDirectory::new(dir.path()).load_sol(SOL).unwrap().unwrap();
    assert_eq!(series.len(), 2);
    let first = &series.samples()[0];
    assert_eq!(first.pressure, 711.25);
    assert_eq!(
        first.timestamp,
        clock::sol_start(SOL) + clock::duration_from_secs(12.0 * 3600.0 + 0.5)
    );
    assert!(series.samples()[1].pressure.is_nan());
}
