//! Replay frame source: detections captured ahead of time, one frame per
//! JSONL line.
//!
//! The core treats face detection and embedding extraction as an external
//! collaborator. This provider replays a capture file where each line is a
//! JSON array of detections
//! (`[{"location": {"top":..,"right":..,"bottom":..,"left":..},
//!     "embedding": [..]}, ...]`), which keeps the whole pipeline
//! deterministic and camera-free.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use facemark_core::{Detection, EmbeddingProvider, ProviderError};

/// Provider whose frames are pre-extracted detection lists.
pub struct ReplayProvider;

impl EmbeddingProvider for ReplayProvider {
    type Frame = Vec<Detection>;

    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>, ProviderError> {
        Ok(frame.clone())
    }
}

/// Load all frames from a JSONL capture file. Blank lines are skipped;
/// a malformed line fails the whole load with its line number.
pub fn load_frames(path: &Path) -> Result<Vec<Vec<Detection>>> {
    let file = File::open(path)
        .with_context(|| format!("opening frames file {}", path.display()))?;

    let mut frames = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let detections: Vec<Detection> = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: bad frame", path.display(), i + 1))?;
        frames.push(detections);
    }

    tracing::debug!(path = %path.display(), frames = frames.len(), "frames loaded");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        let mut f = File::create(&path).unwrap();
        writeln!(
            f,
            r#"[{{"location":{{"top":0,"right":10,"bottom":10,"left":0}},"embedding":[0.1,0.2]}}]"#
        )
        .unwrap();
        writeln!(f).unwrap();
        writeln!(f, "[]").unwrap();

        let frames = load_frames(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 1);
        assert_eq!(frames[0][0].embedding.values, vec![0.1, 0.2]);
        assert!(frames[1].is_empty());
    }

    #[test]
    fn test_load_frames_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.jsonl");
        std::fs::write(&path, "not json\n").unwrap();
        let err = load_frames(&path).unwrap_err();
        assert!(err.to_string().contains(":1:"));
    }
}
