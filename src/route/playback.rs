use axum::routing::{get, post};
use axum::{extract::State, Json, Router};

use crate::dto::res;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/stop", post(stop))
        .route("/api/status", get(status))
}

async fn stop(State(state): State<AppState>) -> Json<res::Stopped> {
    state.playback.stop().await;
    Json(res::Stopped::new())
}

async fn status(State(state): State<AppState>) -> Json<res::PlaybackState> {
    match state.playback.status().await {
        Some(details) => {
            let media = state.media.get(&details.media_id).await;
            Json(res::PlaybackState::playing(media, details))
        }
        None => Json(res::PlaybackState::idle()),
    }
}
