use std::path::PathBuf;
use std::time::Duration;

use facemark_core::config::{
    DEFAULT_CAPTURE_INTERVAL, DEFAULT_DAILY_CAP, DEFAULT_DEDUP_THRESHOLD,
    DEFAULT_MAX_CAPTURES, DEFAULT_RECOGNITION_THRESHOLD,
};
use facemark_core::{MatchConfig, SessionConfig};

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Path to the embedding store file.
    pub store_path: PathBuf,
    /// Directory holding the per-day attendance ledgers.
    pub attendance_dir: PathBuf,
    /// Enrollment dedup distance threshold.
    pub dedup_threshold: f32,
    /// Recognition distance threshold (stricter than dedup).
    pub recognition_threshold: f32,
    /// Attendance marks permitted per identity per day.
    pub daily_cap: usize,
    /// Captures per full enrollment session.
    pub max_captures: usize,
    /// Minimum interval between accepted captures.
    pub capture_interval: Duration,
}

impl Config {
    /// Load configuration from `FACEMARK_*` environment variables with
    /// defaults. Data lives under `FACEMARK_DATA_DIR` (default `./data`)
    /// unless the store path or attendance dir is overridden directly.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("FACEMARK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let store_path = std::env::var("FACEMARK_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("encodings.json"));

        let attendance_dir = std::env::var("FACEMARK_ATTENDANCE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("attendance"));

        Self {
            store_path,
            attendance_dir,
            dedup_threshold: env_f32("FACEMARK_DEDUP_THRESHOLD", DEFAULT_DEDUP_THRESHOLD),
            recognition_threshold: env_f32(
                "FACEMARK_RECOGNITION_THRESHOLD",
                DEFAULT_RECOGNITION_THRESHOLD,
            ),
            daily_cap: env_usize("FACEMARK_DAILY_CAP", DEFAULT_DAILY_CAP),
            max_captures: env_usize("FACEMARK_MAX_CAPTURES", DEFAULT_MAX_CAPTURES),
            capture_interval: Duration::from_millis(env_u64(
                "FACEMARK_CAPTURE_INTERVAL_MS",
                DEFAULT_CAPTURE_INTERVAL.as_millis() as u64,
            )),
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            dedup_threshold: self.dedup_threshold,
            recognition_threshold: self.recognition_threshold,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_captures: self.max_captures,
            min_capture_interval: self.capture_interval,
        }
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
