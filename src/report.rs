//! Results output: CSV flush, run metadata and console statistics

use std::fs;
use std::path::{Path, PathBuf};

use crate::environment::SessionInfo;
use crate::error::BenchError;
use crate::runner::ResultRecord;

/// Write all records to a single CSV file, header row first. Returns
/// `false` without touching the filesystem when there is nothing to write.
pub fn write_csv(records: &[ResultRecord], path: &Path) -> Result<bool, BenchError> {
    if records.is_empty() {
        return Ok(false);
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| BenchError::Report(format!("{}: {e}", path.display())))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| BenchError::Report(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| BenchError::Report(e.to_string()))?;
    Ok(true)
}

/// Write the once-per-run metadata file next to the CSV.
pub fn write_run_metadata(
    csv_path: &Path,
    session: &SessionInfo,
) -> Result<PathBuf, BenchError> {
    let path = csv_path.with_file_name("run_metadata.json");

    let metadata = serde_json::json!({
        "harness": env!("CARGO_PKG_NAME"),
        "harness_version": env!("CARGO_PKG_VERSION"),
        "rustc_version": session.rustc_version,
        "platform": session.platform,
        "cpu_count": session.cpu_count,
        "memory_gb": session.memory_gb,
        "sql_server_host": session.sql_server_host,
        "network_context": session.network_context,
        "session_timestamp": session.timestamp,
    });

    let body = serde_json::to_string_pretty(&metadata)
        .map_err(|e| BenchError::Report(e.to_string()))?;
    fs::write(&path, body).map_err(|e| BenchError::Report(format!("{}: {e}", path.display())))?;
    Ok(path)
}

/// Per-method duration statistics over the successful runs.
pub fn print_summary(records: &[ResultRecord]) {
    let mut methods: Vec<&str> = Vec::new();
    for record in records {
        if !methods.contains(&record.method.as_str()) {
            methods.push(&record.method);
        }
    }

    println!("\nSummary:");
    for method in methods {
        let mut durations: Vec<f64> = records
            .iter()
            .filter(|r| r.method == method && r.success)
            .map(|r| r.duration_seconds)
            .collect();

        if durations.is_empty() {
            println!("  {method}: no successful runs");
            continue;
        }

        durations.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let min = durations[0];
        let max = durations[durations.len() - 1];
        let median = if durations.len() % 2 == 0 {
            (durations[durations.len() / 2 - 1] + durations[durations.len() / 2]) / 2.0
        } else {
            durations[durations.len() / 2]
        };

        println!("  {method}: median={median:.3}s  min={min:.3}s  max={max:.3}s");
    }
}
