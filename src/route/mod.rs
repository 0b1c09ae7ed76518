use std::sync::Arc;

use crate::media::manager::Manager;
use crate::playback::PlaybackController;
use crate::projector::cec::CecController;
use crate::projector::schedule::ScheduleStore;
use crate::projector::scheduler::ProjectorScheduler;

pub mod media;
pub mod playback;
pub mod projector;

#[derive(Clone)]
pub struct AppState {
    pub media: Arc<Manager>,
    pub playback: Arc<PlaybackController>,
    pub cec: Arc<CecController>,
    pub schedule: Arc<ScheduleStore>,
    pub scheduler: Arc<ProjectorScheduler>,
}
