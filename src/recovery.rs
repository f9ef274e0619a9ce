use crate::scheduler::Scheduler;
use tracing::{debug, info};

/// Everything that can wake the reconciliation pass. The paths race against
/// each other (a timer fire, a push, a periodic tick and a visibility change
/// can all notice the same overdue occurrence), so the pass must be safe to
/// run back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTrigger {
    WorkerStart,
    Visibility,
    PeriodicSync,
    Push,
}

/// Re-derives what the timer slot should look like from the persisted
/// settings and repairs it. Delivers at most once per computed occurrence:
/// an overdue occurrence is consumed by persisting a strictly future
/// replacement before any other path can observe it again.
pub async fn reconcile(scheduler: &mut Scheduler, trigger: RecoveryTrigger) {
    let settings = scheduler.store().settings().await;

    if !settings.enabled {
        scheduler.cancel();
        return;
    }

    let now = scheduler.now();
    match settings.next_scheduled {
        Some(next) if now < next => {
            if scheduler.armed_for() == Some(next) {
                debug!(?trigger, "timer live and consistent");
                return;
            }
            // The process restarted (or drifted); the promised occurrence is
            // still in the future, so re-arm without notifying.
            info!(?trigger, "re-arming lost timer for {next}");
            scheduler.arm_at(next).await;
        }
        Some(next) => {
            info!(?trigger, "occurrence {next} is overdue, delivering it now");
            scheduler.deliver().await;
            scheduler.arm(&settings).await;
        }
        None => {
            info!(?trigger, "no occurrence on record, arming");
            scheduler.arm(&settings).await;
        }
    }
}
