/*!
 * Simulation Driver - Interval-Driven Auto-Play
 *
 * Background task that owns the engine and applies ticks at a configurable
 * cadence. The loop is the engine's sole owner, so at most one step is ever
 * in flight; pausing simply stops arming the next tick. Observers read
 * snapshots published over a watch channel after every command.
 */

use crate::core::errors::{ControlError, ControlResult};
use crate::scheduler::{SchedulerEngine, Snapshot};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Control messages for the driver task
#[derive(Debug, Clone)]
pub enum DriverCommand {
    /// Start interval-driven auto-play
    Play,
    /// Stop auto-play; the current tick (if any) still finishes
    Pause,
    /// Apply a single tick (rejected while auto-play is active)
    Step,
    /// Restart the run with the same configuration and processes
    Reset,
    /// Change the interval per tick
    SetSpeed(Duration),
    /// Shutdown the driver task
    Shutdown,
}

/// Handle to the simulation driver task
pub struct SimulationDriver {
    command_tx: mpsc::UnboundedSender<DriverCommand>,
    snapshot_rx: watch::Receiver<Snapshot>,
    playing: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SimulationDriver {
    /// Spawn a driver with the default speed of one tick per second
    pub fn spawn(engine: SchedulerEngine) -> Self {
        Self::with_speed(engine, Duration::from_millis(1000))
    }

    /// Spawn a driver with a custom interval per tick
    pub fn with_speed(engine: SchedulerEngine, speed: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let playing = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&playing);
        let handle = tokio::spawn(async move {
            run_driver_loop(engine, command_rx, snapshot_tx, flag, speed).await;
        });

        info!("Simulation driver spawned: {:?} per tick", speed);

        Self {
            command_tx,
            snapshot_rx,
            playing,
            handle: Some(handle),
        }
    }

    /// Start auto-play
    pub fn play(&self) {
        self.playing.store(true, Ordering::Relaxed);
        let _ = self.command_tx.send(DriverCommand::Play);
    }

    /// Pause auto-play; no further ticks are armed
    pub fn pause(&self) {
        self.playing.store(false, Ordering::Relaxed);
        let _ = self.command_tx.send(DriverCommand::Pause);
    }

    /// Apply a single manual tick
    ///
    /// Rejected while auto-play is active so two advances can never fold
    /// into the same logical time unit.
    pub fn step(&self) -> ControlResult<()> {
        if self.playing.load(Ordering::Relaxed) {
            return Err(ControlError::AutoPlayActive);
        }
        if self.snapshot_rx.borrow().run_complete {
            return Err(ControlError::RunComplete);
        }
        self.command_tx
            .send(DriverCommand::Step)
            .map_err(|_| ControlError::DriverGone)
    }

    /// Restart the run; auto-play stops
    pub fn reset(&self) {
        self.playing.store(false, Ordering::Relaxed);
        let _ = self.command_tx.send(DriverCommand::Reset);
    }

    /// Change the interval per tick
    pub fn set_speed(&self, speed: Duration) {
        let _ = self.command_tx.send(DriverCommand::SetSpeed(speed));
    }

    /// Whether auto-play is currently active
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Shutdown the driver task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(DriverCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Driver shutdown error: {}", e);
            } else {
                info!("Driver shutdown complete");
            }
        }
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        // Attempt graceful shutdown if the task is still running
        if self.handle.is_some() {
            let _ = self.command_tx.send(DriverCommand::Shutdown);
        }
    }
}

/// Core driver loop: interval ticks interleaved with control commands
async fn run_driver_loop(
    mut engine: SchedulerEngine,
    mut command_rx: mpsc::UnboundedReceiver<DriverCommand>,
    snapshot_tx: watch::Sender<Snapshot>,
    playing: Arc<AtomicBool>,
    speed: Duration,
) {
    let mut interval = tokio::time::interval(speed);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Driver loop started: {:?} per tick", speed);

    loop {
        tokio::select! {
            // Periodic auto-play tick
            _ = interval.tick() => {
                if playing.load(Ordering::Relaxed) && !engine.is_terminal() {
                    match engine.step() {
                        Ok(outcome) => {
                            if outcome.run_complete {
                                playing.store(false, Ordering::Relaxed);
                                info!("Run complete at tick {}", outcome.time);
                            }
                        }
                        Err(err) => {
                            playing.store(false, Ordering::Relaxed);
                            warn!("Auto-play stopped: {}", err);
                        }
                    }
                    let _ = snapshot_tx.send(engine.snapshot());
                }
            }

            // Handle control commands
            cmd = command_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    DriverCommand::Play => {
                        if engine.is_terminal() {
                            playing.store(false, Ordering::Relaxed);
                            warn!("Play ignored: run is complete");
                        } else {
                            playing.store(true, Ordering::Relaxed);
                            interval.reset();
                            info!("Auto-play started");
                        }
                    }

                    DriverCommand::Pause => {
                        playing.store(false, Ordering::Relaxed);
                        info!("Auto-play paused at tick {}", engine.state().current_time());
                    }

                    DriverCommand::Step => {
                        // Re-checked here: a Play command may have been
                        // processed after the handle's own check
                        if playing.load(Ordering::Relaxed) {
                            warn!("Manual step ignored while auto-play is active");
                        } else if let Err(err) = engine.step() {
                            warn!("Manual step ignored: {}", err);
                        }
                    }

                    DriverCommand::Reset => {
                        engine.reset();
                        playing.store(false, Ordering::Relaxed);
                    }

                    DriverCommand::SetSpeed(new_speed) => {
                        interval = tokio::time::interval(new_speed);
                        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                        info!("Driver speed updated: {:?} per tick", new_speed);
                    }

                    DriverCommand::Shutdown => {
                        info!("Driver shutting down");
                        break;
                    }
                }
                let _ = snapshot_tx.send(engine.snapshot());
            }
        }
    }
}
