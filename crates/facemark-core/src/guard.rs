//! Cross-identity duplicate detection for enrollment.

use crate::matcher::nearest_match;
use crate::store::Snapshot;
use crate::types::Embedding;

/// Verdict on whether a capture may be enrolled under the claimed identity.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentCheck {
    Allowed,
    /// The capture is within the dedup threshold of an embedding already
    /// enrolled under a different identity.
    Blocked { identity: String, distance: f32 },
}

/// Rejects enrollments that would register one physical person under two
/// identities. Must run before any embedding reaches the store.
#[derive(Debug, Clone, Copy)]
pub struct EnrollmentGuard {
    dedup_threshold: f32,
}

impl EnrollmentGuard {
    pub fn new(dedup_threshold: f32) -> Self {
        Self { dedup_threshold }
    }

    /// Block iff the nearest stored embedding is within the dedup threshold
    /// and belongs to someone other than `claimed`. Matching the claimed
    /// identity itself is fine — that is just another sample of the same
    /// person.
    pub fn check_duplicate(
        &self,
        query: &Embedding,
        snapshot: &Snapshot,
        claimed: &str,
    ) -> EnrollmentCheck {
        match nearest_match(query, snapshot) {
            Some(m) if m.distance < self.dedup_threshold && m.identity != claimed => {
                EnrollmentCheck::Blocked {
                    identity: m.identity,
                    distance: m.distance,
                }
            }
            _ => EnrollmentCheck::Allowed,
        }
    }
}
