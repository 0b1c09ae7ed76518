use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::Player;
use crate::error::AppError;
use crate::media::MediaKind;
use crate::result::Result;

/// How long a player gets to exit after SIGTERM, and again after SIGKILL.
const STOP_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct PlaybackSession {
    media_id: String,
    media_type: MediaKind,
    path: PathBuf,
    command: Vec<String>,
    child: Child,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    pub media_id: String,
    pub media_type: MediaKind,
    pub path: String,
    pub command: Vec<String>,
    pub pid: Option<u32>,
}

/// Owns at most one live player process. All transitions (teardown, launch,
/// reap) happen under the session lock so that at most one player is ever
/// alive after any call returns.
pub struct PlaybackController {
    player: Player,
    session: Mutex<Option<PlaybackSession>>,
}

impl PlaybackController {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            session: Mutex::new(None),
        }
    }

    /// Tears down any current session, then launches a player for the given
    /// media. On launch failure no session is recorded.
    pub async fn play(&self, media_path: &Path, media_type: MediaKind, media_id: &str) -> Result<()> {
        let media_path = tokio::fs::canonicalize(media_path)
            .await
            .unwrap_or_else(|_| media_path.to_path_buf());
        let command = build_command(&self.player, &media_path, media_type);

        let mut session = self.session.lock().await;
        teardown(&mut session).await;

        let child = Command::new(&command[0])
            .args(&command[1..])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AppError::executable_not_found(format!(
                    "{} executable not found. Install {} to enable playback.",
                    self.player.bin, self.player.bin
                )),
                _ => AppError::LaunchFailed(e.into()),
            })?;
        info!(media_id, pid = child.id(), "player started");

        *session = Some(PlaybackSession {
            media_id: media_id.to_string(),
            media_type,
            path: media_path,
            command,
            child,
        });
        Ok(())
    }

    /// Idempotent: stopping with no active session is a no-op.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        teardown(&mut session).await;
    }

    /// Reports the current session. A player that exited on its own is
    /// reaped here and the session cleared; this is the only place exit is
    /// detected.
    pub async fn status(&self) -> Option<PlaybackStatus> {
        let mut session = self.session.lock().await;
        if let Some(current) = session.as_mut() {
            if let Ok(Some(status)) = current.child.try_wait() {
                info!(media_id = %current.media_id, ?status, "player exited on its own");
                *session = None;
            }
        }
        session.as_ref().map(|current| PlaybackStatus {
            media_id: current.media_id.clone(),
            media_type: current.media_type,
            path: current.path.to_string_lossy().into_owned(),
            command: current.command.clone(),
            pid: current.child.id(),
        })
    }
}

fn build_command(player: &Player, media_path: &Path, media_type: MediaKind) -> Vec<String> {
    let mut command = vec![
        player.bin.clone(),
        "--fs".to_string(),
        "--no-terminal".to_string(),
    ];
    command.extend(player.extra_args.iter().cloned());
    match media_type {
        MediaKind::Video => command.push("--loop=inf".to_string()),
        MediaKind::Image => command.extend([
            "--loop-file=inf".to_string(),
            "--image-display-duration=inf".to_string(),
            "--keep-open=yes".to_string(),
        ]),
    }
    command.push(media_path.to_string_lossy().into_owned());
    command
}

/// Clears the session, terminating its process if still alive. Invoked from
/// both `play` and `stop` so the termination contract is defined once.
async fn teardown(session: &mut Option<PlaybackSession>) {
    let Some(mut current) = session.take() else {
        return;
    };
    if let Ok(Some(_)) = current.child.try_wait() {
        return;
    }
    terminate(&mut current.child).await;
}

/// SIGTERM, a bounded wait, then SIGKILL with another bounded wait.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
            match timeout(STOP_GRACE, child.wait()).await {
                Ok(_) => return,
                Err(_) => warn!(pid, "player ignored SIGTERM, killing"),
            }
        }
    }

    let _ = child.start_kill();
    if timeout(STOP_GRACE, child.wait()).await.is_err() {
        warn!("player did not exit after SIGKILL");
    }
}
