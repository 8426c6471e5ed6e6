//! Session controller: drives enrollment and recognition over a sequence
//! of externally supplied frames.
//!
//! Single-threaded, cooperative: each iteration takes the next frame,
//! runs match/guard/ledger logic synchronously, and polls the cancel
//! token once. Sessions end when a terminal state is reached or the
//! frame source runs out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveTime;
use thiserror::Error;

use crate::config::{MatchConfig, SessionConfig};
use crate::guard::{EnrollmentCheck, EnrollmentGuard};
use crate::ledger::{AttendanceLedger, LedgerError, MarkOutcome};
use crate::matcher::nearest_match;
use crate::provider::{EmbeddingProvider, ProviderError};
use crate::store::{EmbeddingStore, StoreError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("no enrolled identities — run enrollment before marking attendance")]
    UntrainedModel,
}

/// Cooperative cancellation flag, polled once per frame iteration.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Terminal state of an enrollment session.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentOutcome {
    /// Reached the capture target, or the frame source ended first.
    Completed { captures: usize },
    /// A capture matched an embedding already enrolled under someone else.
    /// Captures saved earlier in this session are kept; the blocking
    /// capture and the rest of the session are discarded.
    DuplicateBlocked {
        identity: String,
        distance: f32,
        captures_kept: usize,
    },
    Cancelled { captures: usize },
}

/// Terminal state of a recognition session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// One attendance event was recorded; the session stops there.
    Marked { identity: String, time: NaiveTime },
    /// The matched identity is already at the daily cap; nothing written.
    LimitReached { identity: String },
    /// Frame source ended without any accepted match.
    NoMatch,
    Cancelled,
}

/// Drives sessions over the store, matcher, guard, and ledger.
pub struct SessionController<'a> {
    store: &'a EmbeddingStore,
    ledger: &'a AttendanceLedger,
    match_cfg: MatchConfig,
    session_cfg: SessionConfig,
}

impl<'a> SessionController<'a> {
    pub fn new(
        store: &'a EmbeddingStore,
        ledger: &'a AttendanceLedger,
        match_cfg: MatchConfig,
        session_cfg: SessionConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            match_cfg,
            session_cfg,
        }
    }

    /// Enroll `identity` from a frame sequence.
    ///
    /// Per frame: exactly one detected face is required (zero or several
    /// skip the frame), captures are throttled to the configured interval,
    /// and every capture passes the duplicate guard before it is persisted.
    /// Each accepted capture is saved immediately, so a later block or
    /// cancellation keeps earlier saves — fail-fast, not transactional.
    pub fn run_enrollment<P: EmbeddingProvider>(
        &self,
        identity: &str,
        frames: impl IntoIterator<Item = P::Frame>,
        provider: &mut P,
        cancel: &CancelToken,
    ) -> Result<EnrollmentOutcome, SessionError> {
        let guard = EnrollmentGuard::new(self.match_cfg.dedup_threshold);
        let mut snapshot = self.store.load()?;
        let mut captures = 0usize;
        let mut last_capture: Option<Instant> = None;

        tracing::info!(
            identity,
            target = self.session_cfg.max_captures,
            known = snapshot.total_embeddings(),
            "enrollment session started"
        );

        for frame in frames {
            if cancel.is_cancelled() {
                tracing::info!(identity, captures, "enrollment cancelled");
                return Ok(EnrollmentOutcome::Cancelled { captures });
            }

            let detections = provider.detect(&frame)?;
            if detections.len() != 1 {
                tracing::debug!(faces = detections.len(), "frame skipped: need exactly one face");
                continue;
            }

            if let Some(at) = last_capture {
                if at.elapsed() < self.session_cfg.min_capture_interval {
                    continue;
                }
            }

            let detection = &detections[0];
            match guard.check_duplicate(&detection.embedding, &snapshot, identity) {
                EnrollmentCheck::Blocked { identity: other, distance } => {
                    tracing::warn!(
                        claimed = identity,
                        conflicting = %other,
                        distance,
                        captures_kept = captures,
                        "face already enrolled under another identity; session aborted"
                    );
                    return Ok(EnrollmentOutcome::DuplicateBlocked {
                        identity: other,
                        distance,
                        captures_kept: captures,
                    });
                }
                EnrollmentCheck::Allowed => {}
            }

            snapshot = snapshot.append(identity, detection.embedding.clone());
            self.store.save(&snapshot)?;
            captures += 1;
            last_capture = Some(Instant::now());
            tracing::info!(identity, captures, "capture saved");

            if captures >= self.session_cfg.max_captures {
                break;
            }
        }

        tracing::info!(identity, captures, "enrollment session completed");
        Ok(EnrollmentOutcome::Completed { captures })
    }

    /// Scan frames for known faces and record at most one attendance event.
    ///
    /// All detections in a frame are considered (no single-face rule). The
    /// first detection matching under the recognition threshold goes to the
    /// ledger; both the mark and the cap refusal end the session.
    pub fn run_recognition<P: EmbeddingProvider>(
        &self,
        frames: impl IntoIterator<Item = P::Frame>,
        provider: &mut P,
        cancel: &CancelToken,
    ) -> Result<RecognitionOutcome, SessionError> {
        if !self.store.exists() {
            return Err(SessionError::UntrainedModel);
        }
        let snapshot = self.store.load()?;
        if snapshot.is_empty() {
            return Err(SessionError::UntrainedModel);
        }

        tracing::info!(known = snapshot.total_embeddings(), "recognition session started");

        for frame in frames {
            if cancel.is_cancelled() {
                tracing::info!("recognition cancelled");
                return Ok(RecognitionOutcome::Cancelled);
            }

            for detection in provider.detect(&frame)? {
                let Some(m) = nearest_match(&detection.embedding, &snapshot) else {
                    continue;
                };
                if m.distance >= self.match_cfg.recognition_threshold {
                    tracing::debug!(distance = m.distance, "face unknown");
                    continue;
                }

                let now = chrono::Local::now().naive_local();
                match self.ledger.mark(&m.identity, now)? {
                    MarkOutcome::LimitReached => {
                        return Ok(RecognitionOutcome::LimitReached { identity: m.identity });
                    }
                    MarkOutcome::Marked => {
                        return Ok(RecognitionOutcome::Marked {
                            identity: m.identity,
                            time: now.time(),
                        });
                    }
                }
            }
        }

        tracing::info!("recognition session ended without a match");
        Ok(RecognitionOutcome::NoMatch)
    }
}
