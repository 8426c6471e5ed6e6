//! Persisted embedding store: `{identity → [embedding]}` as one JSON file.
//!
//! The snapshot is loaded wholesale at session start and replaced wholesale
//! on save. Saves go through a sibling temp file and a rename, so a failed
//! write never clobbers the previous persisted version.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Embedding;

/// On-disk format version. Bump on any schema change.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
    #[error("store file has unsupported format version {0}")]
    UnsupportedVersion(u32),
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
}

/// All embeddings enrolled under one identity, in capture order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub name: String,
    pub embeddings: Vec<Embedding>,
}

/// In-memory view of the full store: identities in enrollment order,
/// embeddings within an identity in capture order. That enumeration order
/// is what makes nearest-match tie-breaking deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub identities: Vec<IdentityRecord>,
}

impl Snapshot {
    /// Return a new snapshot with `embedding` appended to `identity`,
    /// creating the identity at the end of the enumeration order if absent.
    /// Pure: the receiver is consumed, nothing is persisted.
    pub fn append(mut self, identity: &str, embedding: Embedding) -> Snapshot {
        match self.identities.iter_mut().find(|r| r.name == identity) {
            Some(record) => record.embeddings.push(embedding),
            None => self.identities.push(IdentityRecord {
                name: identity.to_string(),
                embeddings: vec![embedding],
            }),
        }
        self
    }

    /// All (identity, embedding) pairs in stable enumeration order.
    pub fn iter_flat(&self) -> impl Iterator<Item = (&str, &Embedding)> {
        self.identities
            .iter()
            .flat_map(|r| r.embeddings.iter().map(move |e| (r.name.as_str(), e)))
    }

    /// Total embeddings across all identities.
    pub fn total_embeddings(&self) -> usize {
        self.identities.iter().map(|r| r.embeddings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_embeddings() == 0
    }
}

/// Versioned on-disk wrapper around [`Snapshot`].
#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    identities: Vec<IdentityRecord>,
}

/// Handle to the single-file embedding store.
pub struct EmbeddingStore {
    path: PathBuf,
}

impl EmbeddingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any persisted store exists. Recognition uses this to tell
    /// "never trained" apart from "trained but empty".
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the full snapshot. An absent file is an empty store.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no store file; starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let file: StoreFile = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        if file.version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(file.version));
        }

        let snapshot = Snapshot {
            identities: file.identities,
        };
        tracing::debug!(
            path = %self.path.display(),
            identities = snapshot.identities.len(),
            embeddings = snapshot.total_embeddings(),
            "store loaded"
        );
        Ok(snapshot)
    }

    /// Atomically replace the persisted snapshot. On failure the previous
    /// persisted version remains intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            version: SNAPSHOT_FORMAT_VERSION,
            identities: snapshot.identities.clone(),
        };
        let json = serde_json::to_vec(&file)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            embeddings = snapshot.total_embeddings(),
            "store saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(v: &[f32]) -> Embedding {
        Embedding::new(v.to_vec())
    }

    #[test]
    fn test_load_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddingStore::new(dir.path().join("encodings.json"));
        assert!(!store.exists());
        let snapshot = store.load().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddingStore::new(dir.path().join("encodings.json"));

        let snapshot = Snapshot::default()
            .append("alice", emb(&[0.1, 0.2]))
            .append("bob", emb(&[0.9, 0.8]))
            .append("alice", emb(&[0.11, 0.21]));
        store.save(&snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.identities[0].name, "alice");
        assert_eq!(loaded.identities[0].embeddings.len(), 2);
        assert_eq!(loaded.identities[1].name, "bob");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encodings.json");
        let store = EmbeddingStore::new(&path);
        store.save(&Snapshot::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encodings.json");
        fs::write(&path, b"not json at all").unwrap();
        let store = EmbeddingStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_load_unsupported_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encodings.json");
        fs::write(&path, br#"{"version": 99, "identities": []}"#).unwrap();
        let store = EmbeddingStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(StoreError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_append_preserves_enumeration_order() {
        let snapshot = Snapshot::default()
            .append("carol", emb(&[0.0]))
            .append("dave", emb(&[1.0]))
            .append("carol", emb(&[0.5]));

        let flat: Vec<&str> = snapshot.iter_flat().map(|(n, _)| n).collect();
        assert_eq!(flat, vec!["carol", "carol", "dave"]);
        assert_eq!(snapshot.total_embeddings(), 3);
    }

    #[test]
    fn test_save_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddingStore::new(dir.path().join("encodings.json"));

        store
            .save(&Snapshot::default().append("alice", emb(&[0.1])))
            .unwrap();
        store
            .save(&Snapshot::default().append("bob", emb(&[0.2])))
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.identities.len(), 1);
        assert_eq!(loaded.identities[0].name, "bob");
    }
}
