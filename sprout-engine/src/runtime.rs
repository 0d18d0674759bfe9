//! The fired-alarm dispatch loop.
//!
//! Glues the alarm service to the nag machine: every delivered alarm
//! first posts the user-visible notification, then runs one transition
//! step. A failed step is logged and the loop keeps going — one
//! reminder's trouble must not silence the rest.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::alarm::{AlarmFired, AlarmScheduler};
use crate::nag::NagDriver;
use crate::notify::Notifier;
use crate::storage::Store;
use crate::tracing::prelude::*;

pub async fn dispatch_alarms<S, A, N>(
    mut fired_rx: mpsc::Receiver<AlarmFired>,
    store: Arc<S>,
    driver: Arc<NagDriver<S, A>>,
    notifier: Arc<N>,
    cancellation: CancellationToken,
) where
    S: Store,
    A: AlarmScheduler,
    N: Notifier,
{
    trace!("alarm dispatch loop started");
    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,

            event = fired_rx.recv() => {
                let Some(AlarmFired { reminder_id, fired_at_ms }) = event else {
                    break;
                };
                // Notification first, whatever branch the machine takes.
                match store.load_reminder(reminder_id).await {
                    Ok(Some(reminder)) => notifier.post_alarm(&reminder).await,
                    Ok(None) => {}
                    Err(err) => {
                        warn!(reminder_id, error = %err, "reminder snapshot load failed");
                    }
                }
                if let Err(err) = driver.handle_alarm_fired(reminder_id, fired_at_ms).await {
                    error!(reminder_id, error = %err, "reminder could not be rescheduled");
                }
            }
        }
    }
    trace!("alarm dispatch loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmService, AlarmServiceHandle, WallClock};
    use crate::reminder::Reminder;
    use crate::storage::{MemoryStore, Store};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;
    use time::UtcOffset;

    const T0: i64 = 1_741_600_000_000;

    struct FixedClock(i64);
    impl WallClock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        posted: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn post_alarm(&self, reminder: &Reminder) {
            self.posted.lock().push(reminder.id);
        }
    }

    fn wire() -> (
        Arc<MemoryStore>,
        Arc<NagDriver<MemoryStore, AlarmServiceHandle>>,
        Arc<CountingNotifier>,
        CancellationToken,
    ) {
        let store = Arc::new(MemoryStore::new());
        let (service, handle, fired_rx) = AlarmService::new(&FixedClock(T0));
        let driver = Arc::new(NagDriver::new(
            store.clone(),
            Arc::new(handle),
            UtcOffset::UTC,
        ));
        let notifier = Arc::new(CountingNotifier::default());
        let cancellation = CancellationToken::new();

        tokio::spawn(service.run(cancellation.clone()));
        tokio::spawn(dispatch_alarms(
            fired_rx,
            store.clone(),
            driver.clone(),
            notifier.clone(),
            cancellation.clone(),
        ));
        (store, driver, notifier, cancellation)
    }

    #[tokio::test(start_paused = true)]
    async fn armed_reminder_notifies_and_enters_the_micro_loop() {
        let (store, driver, notifier, _cancellation) = wire();

        let mut reminder =
            Reminder::new("Stretch", T0 + 60_000).with_nag(30 * 60_000, 3);
        let id = driver.arm(&mut reminder).await.unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;

        assert_eq!(notifier.posted.lock().as_slice(), &[id]);
        let stored = store.load_reminder(id).await.unwrap().unwrap();
        assert!(stored.in_micro_loop);
        assert_eq!(stored.micro_loop_entered_ms, Some(T0 + 60_000));
    }

    #[tokio::test(start_paused = true)]
    async fn micro_loop_renags_through_the_live_service() {
        let (store, driver, notifier, _cancellation) = wire();

        let mut reminder =
            Reminder::new("Stretch", T0 + 60_000).with_nag(30 * 60_000, 3);
        let id = driver.arm(&mut reminder).await.unwrap();

        // First fire at +60 s, micro fires every 2 minutes afterwards.
        tokio::time::sleep(Duration::from_secs(60 + 2 * 120 + 1)).await;

        assert_eq!(notifier.posted.lock().len(), 3);
        let stored = store.load_reminder(id).await.unwrap().unwrap();
        assert!(stored.in_micro_loop);
        // Entry time pinned to the first fire.
        assert_eq!(stored.micro_loop_entered_ms, Some(T0 + 60_000));
    }
}
