use crate::bump::run_cycle;
use crate::devops::DevOpsClient;
use crate::scheduler::CronTrigger;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main scheduler execution loop.
///
/// Sleeps until the next cron firing, runs one bump cycle, and repeats until
/// `cancel` fires. Cycles never overlap: the next firing is computed only once
/// the current cycle has finished, and firings missed in the meantime are
/// dropped. Returns the number of cycles run.
pub async fn run_scheduler_loop(
    trigger: &CronTrigger,
    client: &dyn DevOpsClient,
    pool_names: &[String],
    cancel: CancellationToken,
) -> usize {
    info!(cron = %trigger.expression(), time_zone = ?trigger.time_zone(), "Scheduler engine started");

    let mut cycles = 0;
    let mut last_fired: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        // never fire the same instant twice if the timer wakes a little early
        let from = match last_fired {
            Some(last) if last > now => last,
            _ => now,
        };
        let Some(next) = trigger.next_after(from) else {
            error!(cron = %trigger.expression(), "Cron expression has no future firing");
            break;
        };

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        last_fired = Some(next);
        run_cycle(client, pool_names, &cancel).await;
        cycles += 1;

        if let Some(following) = trigger.next_after(next) {
            let finished = Utc::now();
            if following < finished {
                warn!(
                    fired_at = %next,
                    finished_at = %finished,
                    "Cycle overran the schedule, skipping missed firings"
                );
            }
        }
    }

    info!(cycles, "Job is stopping");
    cycles
}
