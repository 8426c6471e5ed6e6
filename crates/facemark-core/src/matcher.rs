//! Nearest-neighbor search over the embedding store.

use crate::store::Snapshot;
use crate::types::Embedding;

/// Best match for a query embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub identity: String,
    pub distance: f32,
}

/// Find the stored embedding with the globally minimal Euclidean distance
/// to `query` and return its identity together with that distance.
///
/// O(N) over all embeddings; `None` when the snapshot holds none. Exact
/// ties go to the first embedding in enumeration order (identities in
/// enrollment order, embeddings within an identity in capture order) via
/// the strictly-smaller comparison. Any future parallel scan must keep
/// this tie-break order.
pub fn nearest_match(query: &Embedding, snapshot: &Snapshot) -> Option<Match> {
    let mut best: Option<Match> = None;

    for (identity, stored) in snapshot.iter_flat() {
        let distance = query.euclidean_distance(stored);
        let is_better = match &best {
            None => true,
            Some(prev) => distance < prev.distance,
        };
        if is_better {
            best = Some(Match {
                identity: identity.to_string(),
                distance,
            });
        }
    }

    best
}
