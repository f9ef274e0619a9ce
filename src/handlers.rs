use crate::delivery::{REMINDER_TITLE, TEST_BODY};
use crate::errors::AppError;
use crate::models::{
    DeliveryEvent, ReminderSettings, ReminderStatusResponse, UpdateSettingsRequest,
};
use crate::occurrence::next_occurrence;
use crate::recovery::RecoveryTrigger;
use crate::state::AppState;
use crate::ui::render_index;
use crate::worker::WorkerMessage;
use axum::{extract::State, http::StatusCode, response::Html, Json};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let settings = state.store.settings().await;
    Html(render_index(&settings, state.delivery.permission()))
}

pub async fn get_reminders(
    State(state): State<AppState>,
) -> Result<Json<ReminderStatusResponse>, AppError> {
    let settings = state.store.settings().await;
    Ok(Json(status_response(&state, settings)))
}

/// Full replacement of the settings, last-writer-wins. Persists first, then
/// hands scheduling to the worker.
pub async fn update_reminders(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<ReminderStatusResponse>, AppError> {
    let current = state.store.settings().await;
    let settings = ReminderSettings {
        enabled: payload.enabled,
        time: payload.time,
        frequency: payload.frequency,
        days_of_week: payload.days_of_week,
        next_scheduled: current.next_scheduled,
    };
    if settings.days_of_week.iter().any(|day| *day > 6) {
        return Err(AppError::bad_request("daysOfWeek entries must be 0-6"));
    }
    if !settings.is_valid() {
        return Err(AppError::bad_request(
            "weekly reminders need at least one day of the week",
        ));
    }

    state.store.replace_settings(settings.clone()).await;

    let message = if settings.enabled {
        let fire_at = next_occurrence(&settings, state.clock.now());
        WorkerMessage::Schedule {
            fire_at,
            settings: settings.clone(),
        }
    } else {
        WorkerMessage::Cancel
    };
    state
        .worker
        .send(message)
        .await
        .map_err(|_| AppError::worker_unavailable())?;

    Ok(Json(status_response(&state, settings)))
}

/// Immediate notification outside the schedule, so the user can verify the
/// permission setup. Shows nothing when permission is missing; the response
/// carries the permission state so the UI can explain why.
pub async fn test_notification(
    State(state): State<AppState>,
) -> Result<Json<ReminderStatusResponse>, AppError> {
    state.delivery.show(REMINDER_TITLE, TEST_BODY).await;
    let settings = state.store.settings().await;
    Ok(Json(status_response(&state, settings)))
}

/// The foreground became visible (page load or tab switch); have the worker
/// reconcile its timer against the persisted record.
pub async fn visibility(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    recover(&state, RecoveryTrigger::Visibility).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Push-message hook. Pushes are a secondary delivery path and must not
/// duplicate timer deliveries, so they trigger reconciliation instead of
/// showing a notification outright.
pub async fn push(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    recover(&state, RecoveryTrigger::Push).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replays notifications shown while no foreground context was listening.
/// Drained records are deleted.
pub async fn drain_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryEvent>>, AppError> {
    Ok(Json(state.store.drain_pending().await))
}

async fn recover(state: &AppState, trigger: RecoveryTrigger) -> Result<(), AppError> {
    state
        .worker
        .send(WorkerMessage::Recover(trigger))
        .await
        .map_err(|_| AppError::worker_unavailable())
}

fn status_response(state: &AppState, settings: ReminderSettings) -> ReminderStatusResponse {
    let next_occurrence = settings
        .enabled
        .then(|| next_occurrence(&settings, state.clock.now()));
    ReminderStatusResponse {
        permission: state.delivery.permission(),
        next_occurrence,
        settings,
    }
}
