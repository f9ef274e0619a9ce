use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/reminders",
            get(handlers::get_reminders).put(handlers::update_reminders),
        )
        .route("/api/reminders/test", post(handlers::test_notification))
        .route("/api/reminders/events", get(handlers::drain_events))
        .route("/api/reminders/visibility", post(handlers::visibility))
        .route("/api/push", post(handlers::push))
        .with_state(state)
}
