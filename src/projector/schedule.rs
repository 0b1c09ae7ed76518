use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::result::Result;
use crate::utils::tmp_path_for;

pub const TIME_FORMAT: &str = "%H:%M";

const SCHEDULE_FILE: &str = "projector_schedule.json";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PowerAction {
    PowerOn,
    PowerOff,
}

impl PowerAction {
    pub const ALL: [PowerAction; 2] = [PowerAction::PowerOn, PowerAction::PowerOff];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::PowerOn => "power_on",
            PowerAction::PowerOff => "power_off",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub power_on: ScheduleEntry,
    #[serde(default)]
    pub power_off: ScheduleEntry,
}

/// One trigger configuration. An enabled entry without a time never fires.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub time: Option<String>,
}

impl Schedule {
    pub fn entry(&self, action: PowerAction) -> &ScheduleEntry {
        match action {
            PowerAction::PowerOn => &self.power_on,
            PowerAction::PowerOff => &self.power_off,
        }
    }
}

/// Persists the projector schedule as a whole-document JSON file in the
/// media root. Reads and writes are serialized by one lock; the scheduler
/// task reads while request handlers update.
pub struct ScheduleStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ScheduleStore {
    pub async fn load(media_root: &Path) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(media_root)
            .await
            .with_context(|| format!("failed to create media root {}", media_root.display()))?;
        let store = Self {
            path: media_root.join(SCHEDULE_FILE),
            lock: Mutex::new(()),
        };
        if tokio::fs::metadata(&store.path).await.is_err() {
            store.write(&Schedule::default()).await?;
        }
        Ok(store)
    }

    /// Returns a normalized copy of the persisted schedule: booleans
    /// coerced, missing or malformed fields defaulted.
    pub async fn read(&self) -> Result<Schedule> {
        let _guard = self.lock.lock().await;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read schedule file {}", self.path.display()))?;
        let data: Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse schedule file {}", self.path.display()))?;
        Ok(Schedule {
            power_on: read_entry(data.get("power_on")),
            power_off: read_entry(data.get("power_off")),
        })
    }

    /// Normalizes and validates both entries, then persists them in a single
    /// write. A validation failure on either action rejects the entire
    /// payload and leaves the persisted schedule untouched.
    pub async fn update(&self, payload: &Value) -> Result<Schedule> {
        let schedule = Schedule {
            power_on: normalize_entry(payload.get("power_on"), PowerAction::PowerOn)?,
            power_off: normalize_entry(payload.get("power_off"), PowerAction::PowerOff)?,
        };
        let _guard = self.lock.lock().await;
        self.write(&schedule).await?;
        Ok(schedule)
    }

    async fn write(&self, schedule: &Schedule) -> anyhow::Result<()> {
        let tmp_path = tmp_path_for(&self.path);
        let json = serde_json::to_string_pretty(schedule)?;
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("failed to replace schedule file {}", self.path.display()))?;
        Ok(())
    }
}

fn read_entry(entry: Option<&Value>) -> ScheduleEntry {
    let null = Value::Null;
    let entry = entry.unwrap_or(&null);
    ScheduleEntry {
        enabled: truthy(entry.get("enabled").unwrap_or(&null)),
        time: entry
            .get("time")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn normalize_entry(entry: Option<&Value>, action: PowerAction) -> Result<ScheduleEntry> {
    let null = Value::Null;
    let entry = entry.unwrap_or(&null);
    let enabled = truthy(entry.get("enabled").unwrap_or(&null));
    let time = match entry.get("time") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                NaiveTime::parse_from_str(trimmed, TIME_FORMAT).map_err(|_| {
                    AppError::schedule_validation(format!(
                        "{}.time must use HH:MM (24-hour) format",
                        action
                    ))
                })?;
                Some(trimmed.to_string())
            }
        }
        Some(_) => {
            return Err(AppError::schedule_validation(format!(
                "{}.time must be a string or null",
                action
            )))
        }
    };
    Ok(ScheduleEntry { enabled, time })
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
