/*!
 * schedsim - Demo Entry Point
 *
 * Runs a sample workload through the auto-play driver and prints the final
 * snapshot plus derived metrics as JSON.
 */

use schedsim::{
    init_tracing, Algorithm, ProcessSpec, RunMetrics, SchedulerEngine, SimulationConfig,
    SimulationDriver, TimeQuantum,
};
use std::error::Error;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    let algorithm =
        std::env::var("SCHEDSIM_ALGORITHM").unwrap_or_else(|_| "fcfs".to_string());
    let algorithm = Algorithm::from_str(&algorithm)?;

    let mut config = SimulationConfig::new(algorithm);
    if algorithm.uses_rotation_queue() {
        let quantum: u64 = std::env::var("SCHEDSIM_QUANTUM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        config = config.with_quantum(TimeQuantum::new(quantum)?);
    }

    let processes = sample_workload();
    info!(
        algorithm = algorithm.as_str(),
        processes = processes.len(),
        "Starting simulation"
    );

    let engine = SchedulerEngine::new(config, processes)?;
    let driver = SimulationDriver::with_speed(engine, Duration::from_millis(10));
    let mut updates = driver.subscribe();

    driver.play();
    while !updates.borrow_and_update().run_complete {
        updates.changed().await?;
    }

    let snapshot = driver.snapshot();
    driver.shutdown().await;

    info!(ticks = snapshot.current_time, "Simulation complete");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!(
        "{}",
        serde_json::to_string_pretty(&RunMetrics::derive(&snapshot))?
    );

    Ok(())
}

fn sample_workload() -> Vec<ProcessSpec> {
    vec![
        ProcessSpec::new("P1", 0, 5, 2),
        ProcessSpec::new("P2", 1, 3, 1),
        ProcessSpec::new("P3", 2, 8, 4),
        ProcessSpec::new("P4", 3, 2, 3),
        ProcessSpec::new("P5", 4, 4, 2),
    ]
}
