use crate::clock::Clock;
use crate::models::{DeliveryEvent, Permission};
use crate::storage::Store;
use notify_rust::{Notification, Timeout};
use std::{env, sync::Arc};
use tokio::sync::broadcast;
use tracing::{error, info};

pub const REMINDER_TITLE: &str = "Pain Diary";
pub const REMINDER_BODY: &str = "Don't forget to log today's pain entries";
pub const TEST_BODY: &str = "This is a test reminder. Notifications are working.";

type NotifyResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Platform notification surface, injected so the core never touches the
/// desktop session directly.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;
    fn show(&self, title: &str, body: &str) -> NotifyResult;
}

/// Desktop notifications via the host notification daemon. Permission is
/// modeled after the browser permission store; this binary reads it from the
/// `NOTIFY_PERMISSION` env var (`granted`/`denied`, anything else is the
/// not-yet-asked default).
pub struct DesktopNotifier {
    permission: Permission,
}

impl DesktopNotifier {
    pub fn from_env() -> Self {
        let permission = match env::var("NOTIFY_PERMISSION").as_deref() {
            Ok("granted") => Permission::Granted,
            Ok("denied") => Permission::Denied,
            _ => Permission::Default,
        };
        Self { permission }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn show(&self, title: &str, body: &str) -> NotifyResult {
        // A reminder only has value if the user acts on it, so it must stay
        // up until dismissed.
        Notification::new()
            .appname("pain-diary")
            .summary(title)
            .body(body)
            .timeout(Timeout::Never)
            .show()?;
        Ok(())
    }
}

/// Shows notifications and fans the resulting [`DeliveryEvent`] out to
/// foreground listeners, falling back to a persisted pending record when
/// nobody is subscribed.
#[derive(Clone)]
pub struct Delivery {
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<DeliveryEvent>,
    store: Store,
    clock: Arc<dyn Clock>,
}

impl Delivery {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        events: broadcast::Sender<DeliveryEvent>,
        store: Store,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifier,
            events,
            store,
            clock,
        }
    }

    pub fn permission(&self) -> Permission {
        self.notifier.permission()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.events.subscribe()
    }

    /// Never fails: without permission this is a no-op, and a daemon error is
    /// logged rather than surfaced, so the scheduler always re-arms.
    pub async fn show(&self, title: &str, body: &str) {
        if self.notifier.permission() != Permission::Granted {
            info!("notification permission not granted, skipping delivery");
            return;
        }

        if let Err(err) = self.notifier.show(title, body) {
            error!("failed to show notification: {err}");
            return;
        }

        let event = DeliveryEvent {
            title: title.to_string(),
            body: body.to_string(),
            timestamp: self.clock.now(),
        };
        if self.events.send(event.clone()).is_err() {
            // No foreground context is listening; record it for replay.
            self.store.push_pending(event).await;
        }
    }
}
