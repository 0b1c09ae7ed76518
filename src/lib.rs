use std::future::Future;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Level};

use crate::config::Config;
use crate::playback::PlaybackController;
use crate::projector::cec::CecController;
use crate::projector::schedule::ScheduleStore;
use crate::projector::scheduler::ProjectorScheduler;
use crate::route::AppState;

pub mod config;
pub mod log;
pub mod signal;

mod dto;
mod error;
mod media;
mod playback;
mod projector;
mod result;
mod route;
mod utils;

pub use error::AppError;

pub async fn serve<F>(cfg: Config, listener: TcpListener, signal: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let media = Arc::new(
        media::manager::Manager::load(cfg.media.root.clone())
            .await
            .expect("media library init error"),
    );
    let schedule = Arc::new(
        ScheduleStore::load(&cfg.media.root)
            .await
            .expect("schedule store init error"),
    );
    let playback = Arc::new(PlaybackController::new(cfg.player.clone()));
    let cec = Arc::new(CecController::new(cfg.cec.clone()));
    let scheduler = Arc::new(ProjectorScheduler::spawn(cec.clone(), schedule.clone()));

    let app_state = AppState {
        media,
        playback: playback.clone(),
        cec,
        schedule,
        scheduler: scheduler.clone(),
    };

    if cfg.media.auto_start_last {
        auto_start_last(&app_state).await;
    }

    let app = Router::new()
        .merge(route::media::route())
        .merge(route::playback::route())
        .merge(route::projector::route())
        .layer(DefaultBodyLimit::max(cfg.media.max_upload_size))
        .with_state(app_state)
        .nest_service("/media", ServeDir::new(&cfg.media.root))
        .layer(if cfg.http.cors {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let span = info_span!(
                        "http_request",
                        uri = ?request.uri(),
                        method = ?request.method(),
                        span_id = tracing::field::Empty,
                    );
                    span.record(
                        "span_id",
                        span.id().unwrap_or(tracing::Id::from_u64(42)).into_u64(),
                    );
                    span
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO))
                .on_failure(tower_http::trace::DefaultOnFailure::new().level(Level::INFO)),
        );

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .unwrap_or_else(|e| error!("Application error: {e}"));

    playback.stop().await;
    scheduler.shutdown().await;
}

/// Resumes the last played item on startup when configured to do so.
/// Failures are logged, never fatal.
async fn auto_start_last(state: &AppState) {
    let Some(item) = state.media.last_played().await else {
        return;
    };
    let path = state.media.media_path(&item.filename);
    if tokio::fs::metadata(&path).await.is_err() {
        warn!(media_id = %item.id, "last played media missing on disk, skipping auto-start");
        return;
    }
    match state.playback.play(&path, item.media_type, &item.id).await {
        Ok(()) => info!(media_id = %item.id, "auto-started last played media"),
        Err(e) => warn!("failed to auto-start last media: {:?}", e),
    }
}
