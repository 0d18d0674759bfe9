//! Tokio-backed alarm service.
//!
//! An actor task owning the pending-alarm set. Components talk to it
//! through a cloneable [`AlarmServiceHandle`] (an mpsc command channel);
//! due alarms come out as [`AlarmFired`] events on a separate channel,
//! which the runtime dispatch loop feeds into the nag machine.
//!
//! Wall-clock fire times are mapped onto the tokio clock once, at
//! construction. Delivery is approximate by design — the platform
//! analogue gives no better guarantee.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::tracing::prelude::*;

use super::AlarmScheduler;

/// Source of the current wall-clock time in epoch milliseconds.
pub trait WallClock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_ms(&self) -> i64 {
        (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// A wake-up that came due.
///
/// `fired_at_ms` is the time the alarm was registered for; a late
/// delivery still reports its scheduled time so downstream transitions
/// are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmFired {
    pub reminder_id: i64,
    pub fired_at_ms: i64,
}

#[derive(Debug)]
enum Command {
    Schedule { reminder_id: i64, fire_at_ms: i64 },
    Cancel { reminder_id: i64 },
}

/// Cloneable front end to the service task.
#[derive(Debug, Clone)]
pub struct AlarmServiceHandle {
    command_tx: mpsc::Sender<Command>,
}

#[async_trait]
impl AlarmScheduler for AlarmServiceHandle {
    async fn schedule(&self, reminder_id: i64, fire_at_ms: i64) -> Result<()> {
        self.command_tx
            .send(Command::Schedule {
                reminder_id,
                fire_at_ms,
            })
            .await
            .map_err(|_| Error::Scheduler("alarm service stopped".into()))
    }

    async fn cancel(&self, reminder_id: i64) -> Result<()> {
        self.command_tx
            .send(Command::Cancel { reminder_id })
            .await
            .map_err(|_| Error::Scheduler("alarm service stopped".into()))
    }
}

pub struct AlarmService {
    command_rx: mpsc::Receiver<Command>,
    fired_tx: mpsc::Sender<AlarmFired>,
    /// reminder id -> pending wall-clock fire time. One entry per id.
    pending: HashMap<i64, i64>,
    anchor_instant: Instant,
    anchor_ms: i64,
}

impl AlarmService {
    /// Build the service plus its handle and the fired-event receiver.
    ///
    /// The clock is read once to anchor wall-clock times to the tokio
    /// clock; under `start_paused` tests the anchor is the paused start.
    pub fn new<C: WallClock + ?Sized>(
        clock: &C,
    ) -> (Self, AlarmServiceHandle, mpsc::Receiver<AlarmFired>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (fired_tx, fired_rx) = mpsc::channel(32);
        let service = Self {
            command_rx,
            fired_tx,
            pending: HashMap::new(),
            anchor_instant: Instant::now(),
            anchor_ms: clock.now_ms(),
        };
        (service, AlarmServiceHandle { command_tx }, fired_rx)
    }

    /// Run until cancelled or every handle is dropped.
    pub async fn run(self, cancellation: CancellationToken) {
        let AlarmService {
            mut command_rx,
            fired_tx,
            mut pending,
            anchor_instant,
            anchor_ms,
        } = self;

        let deadline_of = |fire_at_ms: i64| -> Instant {
            let delta_ms = fire_at_ms.saturating_sub(anchor_ms).max(0);
            anchor_instant + Duration::from_millis(delta_ms as u64)
        };

        trace!("alarm service started");
        loop {
            // Earliest pending alarm, ties broken by id for determinism.
            let next = pending
                .iter()
                .map(|(&id, &at)| (at, id))
                .min()
                .map(|(at, id)| (id, at));
            let deadline = match next {
                Some((_, at)) => deadline_of(at),
                None => Instant::now() + Duration::from_secs(3600),
            };

            tokio::select! {
                _ = cancellation.cancelled() => break,

                command = command_rx.recv() => match command {
                    Some(Command::Schedule { reminder_id, fire_at_ms }) => {
                        let replaced = pending.insert(reminder_id, fire_at_ms);
                        debug!(
                            reminder_id,
                            fire_at_ms,
                            replaced = replaced.is_some(),
                            "alarm scheduled"
                        );
                    }
                    Some(Command::Cancel { reminder_id }) => {
                        pending.remove(&reminder_id);
                        debug!(reminder_id, "alarm cancelled");
                    }
                    None => break,
                },

                _ = sleep_until(deadline), if next.is_some() => {
                    // next is Some whenever this branch is enabled.
                    let Some((reminder_id, fired_at_ms)) = next else {
                        continue;
                    };
                    pending.remove(&reminder_id);
                    debug!(reminder_id, fired_at_ms, "alarm fired");
                    let event = AlarmFired { reminder_id, fired_at_ms };
                    if fired_tx.send(event).await.is_err() {
                        debug!("fired-event channel closed");
                        break;
                    }
                }
            }
        }
        trace!("alarm service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, timeout};

    struct FixedClock(i64);
    impl WallClock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    const T0: i64 = 1_741_600_000_000;
    const HOUR: Duration = Duration::from_secs(3600);

    fn spawn_service() -> (AlarmServiceHandle, mpsc::Receiver<AlarmFired>, CancellationToken) {
        let (service, handle, fired_rx) = AlarmService::new(&FixedClock(T0));
        let cancellation = CancellationToken::new();
        tokio::spawn(service.run(cancellation.clone()));
        (handle, fired_rx, cancellation)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_at_the_scheduled_time() {
        let (handle, mut fired_rx, _cancellation) = spawn_service();

        handle.schedule(1, T0 + 60_000).await.unwrap();

        let start = time::Instant::now();
        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(
            fired,
            AlarmFired {
                reminder_id: 1,
                fired_at_ms: T0 + 60_000
            }
        );
        // The paused clock advanced exactly to the deadline.
        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_replaces_the_pending_alarm() {
        let (handle, mut fired_rx, _cancellation) = spawn_service();

        handle.schedule(1, T0 + 60_000).await.unwrap();
        handle.schedule(1, T0 + 120_000).await.unwrap();

        // Only the later wake-up fires.
        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(fired.fired_at_ms, T0 + 120_000);
        assert!(
            timeout(HOUR, fired_rx.recv()).await.is_err(),
            "replaced alarm fired anyway"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_alarm() {
        let (handle, mut fired_rx, _cancellation) = spawn_service();

        handle.schedule(1, T0 + 60_000).await.unwrap();
        handle.cancel(1).await.unwrap();

        assert!(timeout(HOUR, fired_rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_ids_fire_in_time_order() {
        let (handle, mut fired_rx, _cancellation) = spawn_service();

        handle.schedule(2, T0 + 120_000).await.unwrap();
        handle.schedule(1, T0 + 60_000).await.unwrap();

        assert_eq!(fired_rx.recv().await.unwrap().reminder_id, 1);
        assert_eq!(fired_rx.recv().await.unwrap().reminder_id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn past_fire_times_fire_immediately() {
        let (handle, mut fired_rx, _cancellation) = spawn_service();

        handle.schedule(1, T0 - 5_000).await.unwrap();

        let fired = timeout(Duration::from_secs(1), fired_rx.recv())
            .await
            .expect("overdue alarm did not fire")
            .unwrap();
        // Reports its registered time even when delivered late.
        assert_eq!(fired.fired_at_ms, T0 - 5_000);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_service() {
        let (handle, mut fired_rx, cancellation) = spawn_service();
        handle.schedule(1, T0 + 60_000).await.unwrap();

        cancellation.cancel();
        tokio::task::yield_now().await;

        // Service is gone: the fired channel closes without delivering.
        assert!(timeout(HOUR, fired_rx.recv()).await.unwrap_or(None).is_none());
    }
}
