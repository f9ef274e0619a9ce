use crate::models::{DeliveryEvent, ReminderSettings, StoredState};
use chrono::NaiveDateTime;
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{error, warn};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_state(path: &Path) -> StoredState {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(err) => {
                error!("failed to parse state file: {err}");
                StoredState::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredState::default(),
        Err(err) => {
            error!("failed to read state file: {err}");
            StoredState::default()
        }
    }
}

/// Shared handle on the single persisted record. Both execution contexts hold
/// a clone; writes are last-writer-wins. Persistence failures are logged and
/// the in-memory copy keeps serving the session.
#[derive(Clone)]
pub struct Store {
    path: PathBuf,
    state: Arc<Mutex<StoredState>>,
}

impl Store {
    /// Loads the persisted record, substituting defaults when it is missing,
    /// unreadable, or violates the settings invariants.
    pub async fn open(path: PathBuf) -> Self {
        let mut state = load_state(&path).await;
        if !state.settings.is_valid() {
            warn!("persisted reminder settings violate invariants, substituting defaults");
            state.settings = ReminderSettings::default();
        }
        let store = Self {
            path,
            state: Arc::new(Mutex::new(state)),
        };
        // Re-persist so a normalized record is what the next start reads.
        store.update(|_| {}).await;
        store
    }

    pub async fn settings(&self) -> ReminderSettings {
        self.state.lock().await.settings.clone()
    }

    pub async fn replace_settings(&self, settings: ReminderSettings) {
        self.update(|state| state.settings = settings).await;
    }

    pub async fn set_next_scheduled(&self, next: Option<NaiveDateTime>) {
        self.update(|state| state.settings.next_scheduled = next)
            .await;
    }

    pub async fn push_pending(&self, event: DeliveryEvent) {
        self.update(|state| state.pending_events.push(event)).await;
    }

    /// Replay-then-delete: hands back events recorded while no foreground
    /// context was listening.
    pub async fn drain_pending(&self) -> Vec<DeliveryEvent> {
        let mut drained = Vec::new();
        self.update(|state| drained = std::mem::take(&mut state.pending_events))
            .await;
        drained
    }

    async fn update<F: FnOnce(&mut StoredState)>(&self, mutate: F) {
        let mut state = self.state.lock().await;
        mutate(&mut state);
        if let Err(err) = write_state(&self.path, &state).await {
            error!("failed to persist reminder state: {err}");
        }
    }
}

async fn write_state(path: &Path, state: &StoredState) -> Result<(), std::io::Error> {
    let payload = serde_json::to_vec_pretty(state).map_err(std::io::Error::other)?;
    fs::write(path, payload).await
}

#[cfg(test)]
pub(crate) fn temp_state_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "pain_diary_{tag}_{}_{nanos}.json",
        std::process::id()
    ));
    path
}
