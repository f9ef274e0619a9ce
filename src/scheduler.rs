use crate::clock::Clock;
use crate::delivery::{Delivery, REMINDER_BODY, REMINDER_TITLE};
use crate::models::ReminderSettings;
use crate::occurrence::next_occurrence;
use crate::storage::Store;
use crate::worker::WorkerMessage;
use chrono::NaiveDateTime;
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

/// Floor applied when the computed fire time is already in the past (clock
/// change, late wake-up). Scheduling instead of firing inline keeps a
/// re-arming loop bounded.
const MIN_DELAY: Duration = Duration::from_secs(1);

/// The single in-memory timer slot. Arming always replaces the previous
/// handle, so at most one timer is ever live.
enum TimerSlot {
    Idle,
    Armed {
        fire_at: NaiveDateTime,
        handle: JoinHandle<()>,
    },
}

/// Owns the reminder's timer slot inside the worker context. Elapsed timers
/// report back through the worker inbox as [`WorkerMessage::TimerFired`]
/// rather than touching the scheduler from the timer task.
pub struct Scheduler {
    slot: TimerSlot,
    clock: Arc<dyn Clock>,
    delivery: Delivery,
    store: Store,
    inbox: mpsc::Sender<WorkerMessage>,
}

impl Scheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        delivery: Delivery,
        store: Store,
        inbox: mpsc::Sender<WorkerMessage>,
    ) -> Self {
        Self {
            slot: TimerSlot::Idle,
            clock,
            delivery,
            store,
            inbox,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn armed_for(&self) -> Option<NaiveDateTime> {
        match &self.slot {
            TimerSlot::Armed { fire_at, .. } => Some(*fire_at),
            TimerSlot::Idle => None,
        }
    }

    /// Computes the next occurrence, persists it, and starts the timer.
    /// Always cancels the previous timer first, so the most recent arm wins.
    pub async fn arm(&mut self, settings: &ReminderSettings) {
        self.cancel();
        let now = self.clock.now();
        let fire_at = next_occurrence(settings, now);
        self.store.set_next_scheduled(Some(fire_at)).await;
        self.start_timer(fire_at, now);
        info!("reminder armed for {fire_at}");
    }

    /// Re-arms for an occurrence that is already persisted (recovery after a
    /// restart) without recomputing or re-persisting it.
    pub async fn arm_at(&mut self, fire_at: NaiveDateTime) {
        self.cancel();
        let now = self.clock.now();
        self.start_timer(fire_at, now);
        info!("reminder re-armed for {fire_at}");
    }

    /// Idempotent: cancelling an idle scheduler is a no-op. Aborting the
    /// handle invalidates the timer itself rather than flagging around it.
    pub fn cancel(&mut self) {
        if let TimerSlot::Armed { handle, fire_at } =
            std::mem::replace(&mut self.slot, TimerSlot::Idle)
        {
            handle.abort();
            debug!("cancelled timer for {fire_at}");
        }
    }

    /// Invoked by the worker when a timer elapses. Delivers, then re-arms the
    /// self-perpetuating chain while the reminder stays enabled.
    pub async fn on_fire(&mut self, fired_at: NaiveDateTime) {
        // A fire message can already be queued in the inbox when its timer is
        // aborted; only the occurrence currently armed may deliver.
        match &self.slot {
            TimerSlot::Armed { fire_at, .. } if *fire_at == fired_at => {}
            _ => {
                debug!("ignoring stale timer fire for {fired_at}");
                return;
            }
        }
        self.slot = TimerSlot::Idle;

        self.deliver().await;

        let settings = self.store.settings().await;
        if settings.enabled {
            self.arm(&settings).await;
        } else {
            self.store.set_next_scheduled(None).await;
        }
    }

    pub async fn deliver(&self) {
        self.delivery.show(REMINDER_TITLE, REMINDER_BODY).await;
    }

    fn start_timer(&mut self, fire_at: NaiveDateTime, now: NaiveDateTime) {
        let delay = delay_until(fire_at, now);
        let inbox = self.inbox.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbox.send(WorkerMessage::TimerFired { fire_at }).await;
        });
        self.slot = TimerSlot::Armed { fire_at, handle };
    }
}

fn delay_until(fire_at: NaiveDateTime, now: NaiveDateTime) -> Duration {
    let millis = (fire_at - now).num_milliseconds();
    if millis < MIN_DELAY.as_millis() as i64 {
        MIN_DELAY
    } else {
        Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::delivery::testing::RecordingNotifier;
    use crate::models::Frequency;
    use crate::storage::temp_state_path;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use std::collections::BTreeSet;
    use tokio::sync::broadcast;

    struct Fixture {
        scheduler: Scheduler,
        clock: Arc<ManualClock>,
        notifier: Arc<RecordingNotifier>,
        fired: mpsc::Receiver<WorkerMessage>,
    }

    async fn fixture(tag: &str, now: NaiveDateTime) -> Fixture {
        let clock = Arc::new(ManualClock::new(now));
        let notifier = RecordingNotifier::granted();
        let store = Store::open(temp_state_path(tag)).await;
        let (events, _) = broadcast::channel(8);
        let delivery = Delivery::new(notifier.clone(), events, store.clone(), clock.clone());
        let (tx, rx) = mpsc::channel(8);
        Fixture {
            scheduler: Scheduler::new(clock.clone(), delivery, store, tx),
            clock,
            notifier,
            fired: rx,
        }
    }

    fn monday_0800() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn daily_at_9() -> ReminderSettings {
        ReminderSettings {
            enabled: true,
            time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            frequency: Frequency::Daily,
            days_of_week: BTreeSet::from([1, 3, 5]),
            next_scheduled: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn arm_persists_the_next_occurrence() {
        let mut fx = fixture("arm_persists", monday_0800()).await;
        let settings = daily_at_9();

        fx.scheduler.arm(&settings).await;

        let expected = monday_0800().date().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(fx.scheduler.armed_for(), Some(expected));
        assert_eq!(
            fx.scheduler.store().settings().await.next_scheduled,
            Some(expected)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_leaves_exactly_one_live_timer() {
        let mut fx = fixture("rearm_once", monday_0800()).await;
        let settings = daily_at_9();

        fx.scheduler.arm(&settings).await;
        fx.scheduler.arm(&settings).await;

        // Paused time auto-advances; only the surviving timer may report.
        let first = fx.fired.recv().await.unwrap();
        assert!(matches!(first, WorkerMessage::TimerFired { .. }));
        tokio::task::yield_now().await;
        assert!(fx.fired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_fire_from_reporting() {
        let mut fx = fixture("cancel", monday_0800()).await;
        fx.scheduler.arm(&daily_at_9()).await;

        fx.scheduler.cancel();
        assert_eq!(fx.scheduler.armed_for(), None);
        // Idempotent on an idle scheduler.
        fx.scheduler.cancel();

        tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
        assert!(fx.fired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn past_fire_time_still_schedules_with_a_floor() {
        let mut fx = fixture("floor", monday_0800()).await;
        let past = monday_0800() - ChronoDuration::hours(1);

        fx.scheduler.arm_at(past).await;
        assert_eq!(fx.scheduler.armed_for(), Some(past));

        // Fires after the one-second floor rather than synchronously.
        let fired = fx.fired.recv().await.unwrap();
        assert!(matches!(fired, WorkerMessage::TimerFired { fire_at } if fire_at == past));
    }

    #[tokio::test(start_paused = true)]
    async fn fire_delivers_and_rearms_for_the_next_day() {
        let mut fx = fixture("fire_rearms", monday_0800()).await;
        let settings = daily_at_9();
        fx.scheduler.store().replace_settings(settings.clone()).await;
        fx.scheduler.arm(&settings).await;
        let fire_at = fx.scheduler.armed_for().unwrap();

        fx.clock.set(fire_at);
        fx.scheduler.on_fire(fire_at).await;

        assert_eq!(fx.notifier.shown().len(), 1);
        let next = fire_at + ChronoDuration::days(1);
        assert_eq!(fx.scheduler.armed_for(), Some(next));
        assert_eq!(
            fx.scheduler.store().settings().await.next_scheduled,
            Some(next)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fire_with_reminders_disabled_goes_idle() {
        let mut fx = fixture("fire_disabled", monday_0800()).await;
        let mut settings = daily_at_9();
        fx.scheduler.arm(&settings).await;
        let fire_at = fx.scheduler.armed_for().unwrap();

        // The user disabled reminders between arming and firing.
        settings.enabled = false;
        fx.scheduler.store().replace_settings(settings).await;
        fx.clock.set(fire_at);
        fx.scheduler.on_fire(fire_at).await;

        assert_eq!(fx.notifier.shown().len(), 1);
        assert_eq!(fx.scheduler.armed_for(), None);
        assert_eq!(fx.scheduler.store().settings().await.next_scheduled, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_fire_for_a_replaced_timer_is_ignored() {
        let mut fx = fixture("stale_fire", monday_0800()).await;
        fx.scheduler.arm(&daily_at_9()).await;
        let armed = fx.scheduler.armed_for().unwrap();

        let stale = armed - ChronoDuration::hours(1);
        fx.scheduler.on_fire(stale).await;

        assert!(fx.notifier.shown().is_empty());
        assert_eq!(fx.scheduler.armed_for(), Some(armed));
    }
}
