//! Reminder simulator.
//!
//! Runs the engine against the real clock with a JSON file store:
//! arms one reminder a little in the future and logs every alarm the
//! nag machine produces until Ctrl-C. Useful for watching the micro
//! loop behave on a live timeline.
//!
//! ```text
//! sprout-sim "Stretch" 10 60 3
//!             title     │  │  └ main repetitions
//!                       │  └ main interval (seconds)
//!                       └ first fire (seconds from now)
//! ```

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use time::UtcOffset;
use tokio_util::sync::CancellationToken;

use sprout_engine::alarm::{AlarmService, SystemClock, WallClock};
use sprout_engine::notify::LogNotifier;
use sprout_engine::runtime::dispatch_alarms;
use sprout_engine::storage::JsonFileStore;
use sprout_engine::{NagDriver, Reminder};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprout_engine=debug,sprout_sim=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: sprout-sim <title> <delay-secs> <interval-secs> <repetitions>");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  SPROUT_DB    store path (default: sprout.json)");
        std::process::exit(1);
    }
    let title = args[1].clone();
    let delay_secs: i64 = args[2].parse().context("delay must be a number")?;
    let interval_secs: i64 = args[3].parse().context("interval must be a number")?;
    let repetitions: u32 = args[4].parse().context("repetitions must be a number")?;

    let db_path = env::var("SPROUT_DB").unwrap_or_else(|_| "sprout.json".into());
    let store = Arc::new(JsonFileStore::open(&db_path)?);
    tracing::info!(path = %db_path, "store opened");

    let clock = SystemClock;
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let (service, handle, fired_rx) = AlarmService::new(&clock);
    let driver = Arc::new(NagDriver::new(store.clone(), Arc::new(handle), offset));

    let cancellation = CancellationToken::new();
    tokio::spawn(service.run(cancellation.clone()));
    tokio::spawn(dispatch_alarms(
        fired_rx,
        store.clone(),
        driver.clone(),
        Arc::new(LogNotifier),
        cancellation.clone(),
    ));

    let start_time_ms = clock.now_ms() + delay_secs * 1_000;
    let mut reminder =
        Reminder::new(title, start_time_ms).with_nag(interval_secs * 1_000, repetitions);
    let id = driver.arm(&mut reminder).await?;
    tracing::info!(
        reminder_id = id,
        start_time_ms,
        total_repetitions = reminder.total_repetitions,
        "reminder armed; waiting for alarms (Ctrl-C to stop)"
    );

    tokio::signal::ctrl_c().await?;
    cancellation.cancel();
    Ok(())
}
