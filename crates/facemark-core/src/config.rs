use std::time::Duration;

/// Default maximum distance at which two embeddings are considered the
/// same physical person during enrollment.
pub const DEFAULT_DEDUP_THRESHOLD: f32 = 0.48;

/// Default maximum distance at which a query is accepted as a known
/// identity during attendance scanning. Stricter than the dedup threshold.
pub const DEFAULT_RECOGNITION_THRESHOLD: f32 = 0.45;

/// Default attendance marks permitted per identity per calendar day.
pub const DEFAULT_DAILY_CAP: usize = 2;

/// Default captures in a full enrollment session.
pub const DEFAULT_MAX_CAPTURES: usize = 20;

/// Default minimum interval between accepted captures.
pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(700);

/// Distance thresholds for matching decisions.
///
/// Passed explicitly into the guard and the session controller; there is
/// no process-wide default beyond [`Default`].
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Below this distance, two embeddings are treated as one person
    /// during enrollment dedup checks.
    pub dedup_threshold: f32,
    /// Below this distance, a scanned face is labeled as a known identity.
    pub recognition_threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            recognition_threshold: DEFAULT_RECOGNITION_THRESHOLD,
        }
    }
}

/// Enrollment session shape: how many captures, how fast.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Session ends as Completed once this many captures are saved.
    pub max_captures: usize,
    /// Minimum time between two accepted captures.
    pub min_capture_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_captures: DEFAULT_MAX_CAPTURES,
            min_capture_interval: DEFAULT_CAPTURE_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Shorter capture-only preset: 8 captures at a 0.5s interval.
    pub fn capture_only() -> Self {
        Self {
            max_captures: 8,
            min_capture_interval: Duration::from_millis(500),
        }
    }
}
