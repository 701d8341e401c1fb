//! Observes completed requests and writes a latency trace: a
//! `requests.csv` row per trip and a `summary.json` blob. Kept out of
//! the library crate for the same reason as `workload`: reporting is a
//! demo concern, not a simulation-core one.

use std::path::Path;

use elevsim::{Request, Result};
use itertools::Itertools;

#[derive(serde::Serialize)]
struct Row {
    name: usize,
    start: usize,
    end: usize,
    start_time: f64,
    end_time: f64,
    latency: f64,
}

fn row(request: &Request) -> Option<Row> {
    let start_time = request.start_time?;
    let end_time = request.end_time?;
    Some(Row {
        name: request.name,
        start: request.start,
        end: request.end,
        start_time: start_time.0,
        end_time: end_time.0,
        latency: request.latency()?.0,
    })
}

/// Write one row per completed request to `dir/requests.csv`, sorted by
/// latency so the worst offenders are easy to spot.
pub fn write_csv(dir: &Path, completed: &[Request]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut writer = csv::Writer::from_path(dir.join("requests.csv"))?;

    for request in completed.iter().sorted_by(|a, b| {
        a.latency()
            .unwrap_or(elevsim::Duration(0.0))
            .cmp(&b.latency().unwrap_or(elevsim::Duration(0.0)))
    }) {
        if let Some(row) = row(request) {
            writer.serialize(row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write a small JSON summary (count, mean, max latency) to `dir/summary.json`.
pub fn write_summary(dir: &Path, completed: &[Request]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let latencies: Vec<f64> = completed.iter().filter_map(|r| r.latency()).map(|d| d.0).collect();

    let mean = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };
    let max = latencies.iter().cloned().fold(0.0f64, f64::max);

    let summary = serde_json::json!({
        "completed": latencies.len(),
        "mean_latency": mean,
        "max_latency": max,
    });

    let file = std::fs::File::create(dir.join("summary.json"))?;
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}
