pub mod media;
pub mod history;
pub mod transfer;
pub mod allow_list;
pub mod candidate;
pub mod journal;
pub mod summary;

pub use media::{MediaIdentity, MediaKind};
pub use history::{parse_completed_at, HistoryRecord};
pub use transfer::{DownloadArtifact, FileRef, TransferRecord};
pub use allow_list::AllowListEntry;
pub use candidate::{Candidate, RecognizedMedia, SubscriptionOutcome, SubscriptionRequest, UNKNOWN_ID};
pub use journal::JournalEntry;
pub use summary::RunSummary;
