use crate::clock::Clock;
use crate::delivery::Delivery;
use crate::storage::Store;
use crate::worker::WorkerMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything the foreground handlers need: the shared persisted store, the
/// worker inbox, and the delivery channel (for permission state and test
/// notifications).
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub worker: mpsc::Sender<WorkerMessage>,
    pub delivery: Delivery,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        store: Store,
        worker: mpsc::Sender<WorkerMessage>,
        delivery: Delivery,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            worker,
            delivery,
            clock,
        }
    }
}
