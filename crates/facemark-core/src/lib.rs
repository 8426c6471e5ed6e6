//! facemark-core — identity matching and attendance bookkeeping.
//!
//! Given face embeddings from an external provider, decides who a face
//! belongs to, blocks one person from enrolling under two identities,
//! and caps attendance marks per identity per day.

pub mod config;
pub mod guard;
pub mod ledger;
pub mod matcher;
pub mod provider;
pub mod session;
pub mod store;
pub mod types;

pub use config::{MatchConfig, SessionConfig};
pub use guard::{EnrollmentCheck, EnrollmentGuard};
pub use ledger::{AttendanceLedger, LedgerError, MarkOutcome};
pub use matcher::{nearest_match, Match};
pub use provider::{EmbeddingProvider, ProviderError};
pub use session::{
    CancelToken, EnrollmentOutcome, RecognitionOutcome, SessionController, SessionError,
};
pub use store::{EmbeddingStore, IdentityRecord, Snapshot, StoreError};
pub use types::{Detection, Embedding, FaceRect};
