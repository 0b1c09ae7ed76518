use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::cec::CecController;
use super::schedule::{PowerAction, Schedule, ScheduleStore, TIME_FORMAT};

/// Poll interval while no schedule entry is enabled.
const IDLE_POLL: Duration = Duration::from_secs(3600);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Background loop that powers the projector on/off at the configured
/// times. Sleeps until the next due action, wakes early on schedule
/// updates, and re-checks the schedule before every execution.
pub struct ProjectorScheduler {
    wake: Arc<Notify>,
    stop: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ProjectorScheduler {
    pub fn spawn(cec: Arc<CecController>, store: Arc<ScheduleStore>) -> Self {
        let wake = Arc::new(Notify::new());
        let stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run(cec, store, wake.clone(), stop.clone()));
        Self {
            wake,
            stop,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Wakes a sleeping cycle so it re-reads the schedule immediately.
    /// Called after every successful schedule update.
    pub fn notify_update(&self) {
        self.wake.notify_one();
    }

    pub async fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
        self.wake.notify_one();
        if let Some(handle) = self.handle.lock().await.take() {
            if timeout(SHUTDOWN_GRACE, handle).await.is_err() {
                warn!("projector scheduler did not stop within the shutdown grace period");
            }
        }
    }
}

async fn run(
    cec: Arc<CecController>,
    store: Arc<ScheduleStore>,
    wake: Arc<Notify>,
    stop: Arc<AtomicBool>,
) {
    info!("projector scheduler started");
    while !stop.load(Ordering::Relaxed) {
        let schedule = match store.read().await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("failed to read projector schedule: {:?}", e);
                Schedule::default()
            }
        };

        let Some((run_at, action)) = next_event(&schedule, Local::now()) else {
            wait_with_wake(&wake, IDLE_POLL).await;
            continue;
        };

        let delay = (run_at - Local::now()).to_std().unwrap_or(Duration::ZERO);
        if !delay.is_zero() && wait_with_wake(&wake, delay).await {
            // Woke early: the schedule may have changed or removed this event.
            continue;
        }
        if stop.load(Ordering::Relaxed) {
            break;
        }
        execute(&cec, &store, action).await;
    }
    info!("projector scheduler stopped");
}

/// Sleeps up to `duration`; returns true when woken early by a wake signal.
async fn wait_with_wake(wake: &Notify, duration: Duration) -> bool {
    tokio::select! {
        _ = wake.notified() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}

/// The earliest future occurrence over both actions: today at the entry's
/// time, or the same time tomorrow when that instant has already passed.
/// Computed fresh each cycle, never cached across schedule updates.
fn next_event(schedule: &Schedule, now: DateTime<Local>) -> Option<(DateTime<Local>, PowerAction)> {
    let mut events = Vec::new();
    for action in PowerAction::ALL {
        let entry = schedule.entry(action);
        if !entry.enabled {
            continue;
        }
        let Some(time) = entry.time.as_deref() else {
            continue;
        };
        let target = match NaiveTime::parse_from_str(time, TIME_FORMAT) {
            Ok(target) => target,
            Err(_) => {
                warn!(action = %action, time, "skipping invalid schedule time");
                continue;
            }
        };
        let Some(mut candidate) = now.with_time(target).single() else {
            continue;
        };
        if candidate <= now {
            let Some(rolled) = candidate.checked_add_days(Days::new(1)) else {
                continue;
            };
            candidate = rolled;
        }
        events.push((candidate, action));
    }
    events.sort_by_key(|(run_at, _)| *run_at);
    events.into_iter().next()
}

/// Re-reads the schedule before acting: an action disabled while we slept
/// is skipped silently. Command failures are logged, never propagated.
async fn execute(cec: &CecController, store: &ScheduleStore, action: PowerAction) {
    let schedule = match store.read().await {
        Ok(schedule) => schedule,
        Err(e) => {
            warn!("failed to re-read projector schedule: {:?}", e);
            return;
        }
    };
    if !schedule.entry(action).enabled {
        return;
    }

    let succeeded = match action {
        PowerAction::PowerOn => cec.power_on().await,
        PowerAction::PowerOff => cec.power_off().await,
    };
    if succeeded {
        info!(action = %action, "projector action executed");
    } else {
        error!(action = %action, "projector action failed");
    }
}
