//! Periodic execution of monitoring runs.

use super::run::{Monitor, RunOutcome};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    /// Send the health summary on the first run only.
    pub force_first: bool,
    /// Stop after this many runs.
    pub max_runs: Option<usize>,
}

/// Summary of a scheduler session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub completed: usize,
    pub aborted: usize,
}

/// Call `run_once` every `interval` until `shutdown` resolves or
/// `max_runs` is reached. Runs never overlap; a slow run delays the next tick.
pub async fn run_periodically<F>(monitor: &Monitor, schedule: Schedule, shutdown: F) -> ScheduleStats
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut stats = ScheduleStats::default();
    loop {
        if schedule.max_runs.is_some_and(|max| stats.completed + stats.aborted >= max) {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                let first = stats.completed + stats.aborted == 0;
                match monitor.run_once(schedule.force_first && first).await {
                    RunOutcome::Completed(_) => stats.completed += 1,
                    RunOutcome::Aborted { stage, .. } => {
                        warn!(stage = %stage, "Run aborted; retrying at next interval");
                        stats.aborted += 1;
                    }
                }
            }
        }
    }

    info!(
        completed = stats.completed,
        aborted = stats.aborted,
        "Scheduler stopped"
    );
    stats
}
