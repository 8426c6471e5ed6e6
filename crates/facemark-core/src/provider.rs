//! Embedding provider seam.
//!
//! Locating faces in a frame and computing their embeddings is delegated
//! to an external detector/encoder. The session controller only sees this
//! trait; the frame type is whatever the provider consumes.

use thiserror::Error;

use crate::types::Detection;

/// Error from the external detector/encoder.
#[derive(Error, Debug)]
#[error("embedding provider: {0}")]
pub struct ProviderError(pub String);

/// External collaborator that turns a frame into zero or more detections.
///
/// Implementations must be deterministic for a fixed frame so session
/// behavior stays testable.
pub trait EmbeddingProvider {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>, ProviderError>;
}
