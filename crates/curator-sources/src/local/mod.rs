pub mod storage;
pub mod snapshot;
pub mod state;

pub use storage::LocalFileStorage;
pub use snapshot::{HostSnapshot, JsonHostStore, LibraryItem, SubscriptionEntry};
pub use state::FileStateStore;
