pub mod traits;
pub mod error;
pub mod factory;
pub mod gemini;
pub mod tmdb;
pub mod local;
pub mod notify;

pub use traits::{FileStorage, HistoryStore, KeyValueStore, LibraryIndex, Notifier, Recognizer, Recommender, SubscriptionService};
pub use error::SourceError;
pub use factory::Collaborators;
pub use gemini::GeminiRecommender;
pub use tmdb::TmdbRecognizer;
pub use local::{FileStateStore, HostSnapshot, JsonHostStore, LibraryItem, LocalFileStorage, SubscriptionEntry};
pub use notify::{LogNotifier, WebhookNotifier};
