use std::{env, fs, net::SocketAddr, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub player: Player,
    #[serde(default)]
    pub cec: Cec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    #[serde(default = "default_http_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_cors")]
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    /// Directory holding uploaded media, the gallery catalog and the
    /// projector schedule file.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// Resume playback of the last played item on startup.
    #[serde(default = "default_auto_start_last")]
    pub auto_start_last: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(default = "default_player_bin")]
    pub bin: String,
    /// Extra arguments appended to every player launch command.
    #[serde(default = "default_player_extra_args")]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cec {
    #[serde(default = "default_cec_tool")]
    pub tool: String,
    #[serde(default = "default_cec_device")]
    pub device: Option<String>,
    #[serde(default = "default_cec_logical_address")]
    pub logical_address: Option<String>,
}

fn default_http_listen() -> SocketAddr {
    SocketAddr::from_str(&format!(
        "0.0.0.0:{}",
        env::var("PORT").unwrap_or(String::from("8000"))
    ))
    .expect("invalid listen address")
}

fn default_cors() -> bool {
    true
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

fn default_media_root() -> PathBuf {
    PathBuf::from(env::var("MEDIA_ROOT").unwrap_or(String::from("./media")))
}

fn default_max_upload_size() -> usize {
    512 * 1024 * 1024
}

fn default_auto_start_last() -> bool {
    matches!(
        env::var("AUTO_START_LAST")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "1" | "true" | "yes"
    )
}

fn default_player_bin() -> String {
    String::from("mpv")
}

fn default_player_extra_args() -> Vec<String> {
    env::var("MPV_EXTRA_ARGS")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn default_cec_tool() -> String {
    env::var("PROJECTOR_CEC_TOOL").unwrap_or(String::from("cec-ctl"))
}

fn default_cec_device() -> Option<String> {
    env::var("PROJECTOR_CEC_DEVICE").ok()
}

fn default_cec_logical_address() -> Option<String> {
    Some(env::var("PROJECTOR_CEC_LOGICAL_ADDR").unwrap_or(String::from("0")))
}

impl Default for Http {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
            cors: default_cors(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Media {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            max_upload_size: default_max_upload_size(),
            auto_start_last: default_auto_start_last(),
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self {
            bin: default_player_bin(),
            extra_args: default_player_extra_args(),
        }
    }
}

impl Default for Cec {
    fn default() -> Self {
        Self {
            tool: default_cec_tool(),
            device: default_cec_device(),
            logical_address: default_cec_logical_address(),
        }
    }
}

impl Config {
    pub fn parse(path: Option<String>) -> Self {
        let result = fs::read_to_string(path.unwrap_or(String::from("marquee.toml")))
            .or(fs::read_to_string("/etc/marquee/marquee.toml"))
            .unwrap_or("".to_string());
        let cfg: Self = toml::from_str(result.as_str()).expect("config parse error");
        match cfg.validate() {
            Ok(_) => cfg,
            Err(err) => panic!("config validate [{}]", err),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.player.bin.trim().is_empty() {
            return Err(anyhow::anyhow!("player.bin cannot be empty"));
        }
        if self.media.max_upload_size == 0 {
            return Err(anyhow::anyhow!("media.max_upload_size cannot be zero"));
        }
        Ok(())
    }
}
