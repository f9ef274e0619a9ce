use crate::models::ReminderSettings;
use crate::recovery::{reconcile, RecoveryTrigger};
use crate::scheduler::Scheduler;
use chrono::NaiveDateTime;
use std::{env, time::Duration};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};
use tracing::{debug, info};

/// The message protocol between the foreground surface and the worker. All
/// scheduling mutations travel through this inbox, which is what makes the
/// worker's operations atomic relative to each other.
#[derive(Debug)]
pub enum WorkerMessage {
    /// The foreground saved enabled settings; `fire_at` is its own view of
    /// the next occurrence, logged for drift diagnosis. The worker re-derives
    /// the authoritative value when arming.
    Schedule {
        fire_at: NaiveDateTime,
        settings: ReminderSettings,
    },
    Cancel,
    Recover(RecoveryTrigger),
    /// Reported by an elapsed timer task.
    TimerFired { fire_at: NaiveDateTime },
}

pub struct WorkerConfig {
    /// Low-frequency wake-up that feeds the recovery layer; `None` when the
    /// host offers no periodic hook.
    pub periodic_sync: Option<Duration>,
}

impl WorkerConfig {
    /// `PERIODIC_SYNC_SECS` env var; unset or 0 disables the periodic hook.
    pub fn from_env() -> Self {
        let periodic_sync = env::var("PERIODIC_SYNC_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self { periodic_sync }
    }
}

/// The background execution context: reconciles once on startup, then decodes
/// inbox messages and periodic ticks into scheduler operations until the
/// foreground drops its sender.
pub async fn run(mut scheduler: Scheduler, mut inbox: mpsc::Receiver<WorkerMessage>, config: WorkerConfig) {
    reconcile(&mut scheduler, RecoveryTrigger::WorkerStart).await;

    let mut sync = config
        .periodic_sync
        .map(|period| interval_at(Instant::now() + period, period));

    loop {
        tokio::select! {
            message = inbox.recv() => {
                let Some(message) = message else {
                    info!("worker inbox closed, stopping");
                    break;
                };
                handle(&mut scheduler, message).await;
            }
            _ = tick(&mut sync) => {
                reconcile(&mut scheduler, RecoveryTrigger::PeriodicSync).await;
            }
        }
    }
}

async fn handle(scheduler: &mut Scheduler, message: WorkerMessage) {
    match message {
        WorkerMessage::Schedule { fire_at, settings } => {
            debug!("schedule request, foreground expects {fire_at}");
            scheduler.arm(&settings).await;
        }
        WorkerMessage::Cancel => {
            scheduler.cancel();
            scheduler.store().set_next_scheduled(None).await;
        }
        WorkerMessage::Recover(trigger) => reconcile(scheduler, trigger).await,
        WorkerMessage::TimerFired { fire_at } => scheduler.on_fire(fire_at).await,
    }
}

async fn tick(sync: &mut Option<Interval>) {
    match sync {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
