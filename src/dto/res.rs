use serde::Serialize;

use crate::media::MediaItem;
use crate::playback::PlaybackStatus;

#[derive(Debug, Serialize)]
pub struct MediaList {
    pub items: Vec<MediaItem>,
}

#[derive(Debug, Serialize)]
pub struct Playing {
    pub status: &'static str,
    pub media: MediaItem,
}

impl Playing {
    pub fn new(media: MediaItem) -> Self {
        Self {
            status: "playing",
            media,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaybackState {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PlaybackStatus>,
}

impl PlaybackState {
    pub fn idle() -> Self {
        Self {
            status: "idle",
            media: None,
            details: None,
        }
    }

    pub fn playing(media: Option<MediaItem>, details: PlaybackStatus) -> Self {
        Self {
            status: "playing",
            media,
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Stopped {
    pub status: &'static str,
}

impl Stopped {
    pub fn new() -> Self {
        Self { status: "stopped" }
    }
}

#[derive(Debug, Serialize)]
pub struct Power {
    pub status: &'static str,
    pub state: String,
}

impl Power {
    pub fn ok(state: &str) -> Self {
        Self {
            status: "ok",
            state: state.to_string(),
        }
    }
}
