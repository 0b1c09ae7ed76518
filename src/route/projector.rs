use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use serde_json::Value;

use crate::dto::res;
use crate::error::AppError;
use crate::projector::schedule::Schedule;
use crate::result::Result;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/projector/power", post(power))
        .route(
            "/api/projector/schedule",
            get(read_schedule).put(update_schedule),
        )
}

async fn power(State(state): State<AppState>, body: String) -> Result<Json<res::Power>> {
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let requested = match payload.get("state").and_then(Value::as_str) {
        Some("on") => "on",
        Some("off") => "off",
        _ => {
            return Err(AppError::bad_request(
                "Invalid 'state'. Expected 'on' or 'off'.",
            ))
        }
    };

    let succeeded = if requested == "on" {
        state.cec.power_on().await
    } else {
        state.cec.power_off().await
    };
    if !succeeded {
        return Err(AppError::InternalServerError(anyhow::anyhow!(
            "Failed to control the projector via CEC."
        )));
    }
    Ok(Json(res::Power::ok(requested)))
}

async fn read_schedule(State(state): State<AppState>) -> Result<Json<Schedule>> {
    Ok(Json(state.schedule.read().await?))
}

async fn update_schedule(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Schedule>> {
    let payload: Value = serde_json::from_str(&body)
        .map_err(|_| AppError::bad_request("Request body must be valid JSON."))?;
    let schedule = state.schedule.update(&payload).await?;
    state.scheduler.notify_update();
    Ok(Json(schedule))
}
