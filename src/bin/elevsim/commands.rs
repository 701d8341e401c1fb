use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use elevsim::config::SimConstants;
use elevsim::engine::EndCondition;
use elevsim::{Result, Simulator, Time};
use tracing::info;

use crate::{monitor, workload};

pub fn config(config_file: Option<&str>) -> Result<()> {
    let constants = SimConstants::load(config_file)?;
    println!("{:#?}", constants);
    Ok(())
}

pub fn run(
    config_file: Option<&str>,
    until: Option<f64>,
    requests: usize,
    interarrival: f64,
    seed: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let constants = SimConstants::load(config_file)?;
    let seed = seed
        .or_else(|| constants.seed.clone())
        .unwrap_or_else(|| "elevsim".to_string());
    let output_dir = output.or_else(|| constants.output_dir.clone());

    info!(floors = constants.floors, elevators = constants.elevator_count, %seed, "starting run");

    let arrivals = workload::generate(&seed, constants.floors, requests, interarrival);

    let completed = Rc::new(RefCell::new(Vec::new()));
    let completed_sink = completed.clone();

    let mut sim = Simulator::new(constants);
    sim.controller.on_exit(move |r| completed_sink.borrow_mut().push(r));

    for arrival in arrivals {
        sim.schedule_request(arrival.fire_at, arrival.request);
    }

    let end = match until {
        Some(max) => EndCondition::Time { max: Time(max) },
        None => EndCondition::NoEvents,
    };
    sim.run(end);

    let completed = completed.borrow();
    info!(completed = completed.len(), "simulation finished");

    if let Some(dir) = output_dir {
        monitor::write_csv(&dir, &completed)?;
        monitor::write_summary(&dir, &completed)?;
        println!("wrote traces to {}", dir.display());
    } else {
        let mean: f64 = if completed.is_empty() {
            0.0
        } else {
            completed.iter().filter_map(|r| r.latency()).map(|d| d.0).sum::<f64>() / completed.len() as f64
        };
        println!("completed {} requests, mean latency {:.2}", completed.len(), mean);
    }

    Ok(())
}
