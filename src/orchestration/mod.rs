pub mod run;
pub mod scheduler;

pub use run::{Monitor, MonitorSettings, RunOutcome, RunReport, RunStage};
pub use scheduler::{run_periodically, Schedule, ScheduleStats};
