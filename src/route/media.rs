use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use http::{header, StatusCode};
use serde_json::Value;

use crate::dto::req::JsonUpload;
use crate::dto::res;
use crate::error::AppError;
use crate::media::MediaItem;
use crate::result::Result;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/media", get(index).post(upload))
        .route("/api/media/upload-and-play", post(upload_and_play))
        .route("/api/media/{media}", delete(destroy))
        .route("/api/media/{media}/play", post(play))
}

async fn index(State(state): State<AppState>) -> Json<res::MediaList> {
    Json(res::MediaList {
        items: state.media.list().await,
    })
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaItem>)> {
    let (filename, content) = read_multipart_file(&mut multipart).await?;
    let item = state.media.add(&filename, &content).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Accepts either a multipart form or a JSON body with base64 content,
/// stores the media and immediately starts playing it.
async fn upload_and_play(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<res::Playing>)> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);

    let (filename, content) = if is_json {
        let body = String::from_request(request, &state)
            .await
            .map_err(|_| AppError::bad_request("Invalid JSON payload"))?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|_| AppError::bad_request("Invalid JSON payload"))?;
        let upload = JsonUpload::from_payload(&payload)?;
        (upload.filename, upload.content)
    } else {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|_| AppError::bad_request("Missing file upload"))?;
        read_multipart_file(&mut multipart).await?
    };

    let item = state.media.add(&filename, &content).await?;
    start_playback(&state, &item).await?;
    Ok((StatusCode::CREATED, Json(res::Playing::new(item))))
}

async fn destroy(
    State(state): State<AppState>,
    Path(media): Path<String>,
) -> Result<Response<String>> {
    if !state.media.delete(&media).await? {
        return Err(AppError::resource_not_found("Media item not found"));
    }
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body("".to_string())?)
}

async fn play(
    State(state): State<AppState>,
    Path(media): Path<String>,
) -> Result<Json<res::Playing>> {
    let item = state
        .media
        .get(&media)
        .await
        .ok_or(AppError::resource_not_found("Media item not found"))?;
    start_playback(&state, &item).await?;
    Ok(Json(res::Playing::new(item)))
}

async fn start_playback(state: &AppState, item: &MediaItem) -> Result<()> {
    let path = state.media.media_path(&item.filename);
    if tokio::fs::metadata(&path).await.is_err() {
        return Err(AppError::media_gone("Media file missing on disk"));
    }
    state.playback.play(&path, item.media_type, &item.id).await?;
    state.media.record_last_played(&item.id).await?;
    Ok(())
}

async fn read_multipart_file(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Missing file upload"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or(AppError::bad_request("Uploaded file has no filename"))?;
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {}", e)))?;
        return Ok((filename, content.to_vec()));
    }
    Err(AppError::bad_request("Missing file upload"))
}
