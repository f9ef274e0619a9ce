use pain_diary::clock::{Clock, SystemClock};
use pain_diary::delivery::{Delivery, DesktopNotifier};
use pain_diary::scheduler::Scheduler;
use pain_diary::storage::{resolve_data_path, Store};
use pain_diary::worker::{self, WorkerConfig};
use pain_diary::{router, AppState};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::sync::{broadcast, mpsc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_path = resolve_data_path()?;
    if let Some(parent) = data_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = Store::open(data_path).await;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (events, _) = broadcast::channel(16);
    let notifier = Arc::new(DesktopNotifier::from_env());
    let delivery = Delivery::new(notifier, events, store.clone(), clock.clone());

    // The worker is the background execution context; the inbox sender is the
    // only way the foreground reaches it.
    let (worker_tx, worker_rx) = mpsc::channel(32);
    let scheduler = Scheduler::new(
        clock.clone(),
        delivery.clone(),
        store.clone(),
        worker_tx.clone(),
    );
    tokio::spawn(worker::run(scheduler, worker_rx, WorkerConfig::from_env()));

    let state = AppState::new(store, worker_tx, delivery, clock);
    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
