//! Cron trigger and the long-running loop that fires bump cycles.

pub mod cron;
pub mod engine;

pub use self::cron::CronTrigger;
pub use self::engine::run_scheduler_loop;
