use serde::{Deserialize, Serialize};

/// Rectangle for a detected face, in frame coordinates.
///
/// Edges follow the (top, right, bottom, left) convention used by the
/// embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRect {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Face embedding vector (fixed-dimension, provider-defined).
///
/// Serializes as a bare float array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of dimensions in the vector.
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Compute Euclidean distance between two embeddings.
    ///
    /// Lower = more similar. Mismatched dimensions are compared over the
    /// shorter length; providers are expected to emit a fixed dimension.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// One face reported by the embedding provider: where it is in the frame
/// and the embedding extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub location: FaceRect,
    pub embedding: Embedding,
}
