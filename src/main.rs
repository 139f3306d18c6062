use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use queuebump::bump::PoolOutcome;
use queuebump::config::WorkerConfig;
use queuebump::scheduler::CronTrigger;

#[derive(Parser)]
#[command(
    name = "queuebump",
    about = "Moves manual and CI builds ahead of scheduled builds in Azure DevOps agent pools",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, env = "QUEUEBUMP_CONFIG", default_value = "queuebump.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the worker and bump queues on every cron firing
    Run,

    /// Run a single bump cycle now
    Once {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Show what would be bumped, without bumping anything
    Plan,

    /// Preview the next firing times of the configured schedule
    NextRuns {
        /// Number of firings to show
        #[arg(long, default_value = "5")]
        count: usize,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout is reserved for command output
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Fail fast on configuration no cycle could run with.
fn validate(config: &WorkerConfig) -> Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("Could not validate arguments from config file. {e}");
        return Err(e.into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = WorkerConfig::load(&cli.config).map(WorkerConfig::with_env_overrides);
    match &loaded {
        Ok(cfg) => init_tracing(&cfg.logging.level, cfg.logging.json),
        Err(_) => init_tracing("info", false),
    }
    let config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Could not load configuration: {e}");
            return Err(e.into());
        }
    };
    tracing::info!(path = %cli.config.display(), "Loaded worker configuration");

    match cli.command {
        Commands::NextRuns { count } => {
            // only the schedule matters here
            let trigger = CronTrigger::from_config(&config.schedule)?;
            println!(
                "Next {} runs of '{}' ({:?}):",
                count,
                trigger.expression(),
                trigger.time_zone()
            );
            for time in trigger.upcoming(chrono::Utc::now(), count) {
                println!("{}", time.to_rfc3339());
            }
        }
        Commands::Run => {
            validate(&config)?;
            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Shutdown requested");
                    on_signal.cancel();
                }
            });
            queuebump::serve(&config, cancel).await?;
        }
        Commands::Once { json } => {
            validate(&config)?;
            let report = queuebump::run_once(&config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.pools.is_empty() {
                println!("No configured pool could be resolved.");
            } else {
                println!("{:<25} | {:<8} | Result", "Pool", "Id");
                println!("{:-<25}-|-{:-<8}-|-{:-<30}", "", "", "");
                for entry in &report.pools {
                    let result = match &entry.outcome {
                        PoolOutcome::Skipped => "SKIPPED (queue unavailable)".to_string(),
                        PoolOutcome::NothingToBump => "nothing to bump".to_string(),
                        PoolOutcome::Cancelled => "cancelled".to_string(),
                        PoolOutcome::Bumped(o) => {
                            format!("bumped {}/{}", o.succeeded, o.attempted)
                        }
                    };
                    println!("{:<25} | {:<8} | {}", entry.pool.name, entry.pool.id, result);
                }
                println!("\nTotal bumped: {}", report.total_bumped());
            }
        }
        Commands::Plan => {
            validate(&config)?;
            let plans = queuebump::preview(&config).await?;
            if plans.is_empty() {
                println!("No configured pool could be resolved.");
            }
            for (pool, plan) in plans {
                match plan {
                    None => println!("{}: queue unavailable", pool),
                    Some(plan) if plan.is_empty() => println!(
                        "{}: nothing to bump ({} scheduled waiting, {} manual/CI waiting)",
                        pool,
                        plan.scheduled_waiting(),
                        plan.non_scheduled_waiting()
                    ),
                    Some(plan) => println!(
                        "{}: would bump {:?} ({} scheduled waiting)",
                        pool,
                        plan.request_ids(),
                        plan.scheduled_waiting()
                    ),
                }
            }
        }
        Commands::CheckConfig => {
            validate(&config)?;
            println!(
                "Configuration OK: {} pool(s) in {}, schedule '{}'",
                config.pool_names().len(),
                config.organization_url(),
                config.schedule.cron_expression
            );
        }
    }

    Ok(())
}
