use curator_models::{Candidate, MediaKind, RecognizedMedia};
use curator_sources::{HistoryStore, LibraryIndex, Recognizer, SourceError, SubscriptionService};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ActiveSubscription,
    InHistory,
    InLibrary,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::ActiveSubscription => write!(f, "already has an active subscription"),
            RejectReason::InHistory => write!(f, "already in history"),
            RejectReason::InLibrary => write!(f, "already in library"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// New title; subscribe using the canonical identity
    Subscribe(RecognizedMedia),
    Reject(RecognizedMedia, RejectReason),
    /// Recognition found nothing for the candidate
    Unrecognized,
}

/// Resolves a candidate to its canonical identity and checks it against
/// subscriptions, history and the library
pub struct AcquisitionDecider {
    recognizer: Arc<dyn Recognizer>,
    subscriptions: Arc<dyn SubscriptionService>,
    history: Arc<dyn HistoryStore>,
    library: Arc<dyn LibraryIndex>,
    kind: MediaKind,
}

impl AcquisitionDecider {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        subscriptions: Arc<dyn SubscriptionService>,
        history: Arc<dyn HistoryStore>,
        library: Arc<dyn LibraryIndex>,
    ) -> Self {
        Self {
            recognizer,
            subscriptions,
            history,
            library,
            kind: MediaKind::Movie,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub async fn decide(&self, candidate: &Candidate) -> Result<Decision, SourceError> {
        let year = Some(candidate.year.as_str()).filter(|year| !year.is_empty());
        let Some(media) = self.recognizer.recognize(&candidate.title, year, self.kind).await? else {
            return Ok(Decision::Unrecognized);
        };

        if let Some(declared) = candidate.declared_tmdb_id() {
            if declared != media.tmdb_id {
                warn!(
                    operation = "acquisition_decide",
                    title = %candidate.title,
                    declared_id = declared,
                    canonical_id = media.tmdb_id,
                    "Declared id disagrees with recognized id, using recognized id"
                );
            }
        }

        if self.subscriptions.has_active(media.tmdb_id).await? {
            return Ok(Decision::Reject(media, RejectReason::ActiveSubscription));
        }
        if self.history.history_contains(media.tmdb_id).await? {
            return Ok(Decision::Reject(media, RejectReason::InHistory));
        }
        if self.library.contains(self.kind, media.tmdb_id).await? {
            return Ok(Decision::Reject(media, RejectReason::InLibrary));
        }

        Ok(Decision::Subscribe(media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, FakeRecognizer};
    use curator_models::{HistoryRecord, MediaIdentity};

    fn decider(host: FakeHost, recognizer: FakeRecognizer) -> AcquisitionDecider {
        let host = Arc::new(host);
        AcquisitionDecider::new(Arc::new(recognizer), host.clone(), host.clone(), host)
    }

    #[tokio::test]
    async fn test_rejects_each_existing_source() {
        let mut host = FakeHost::with_history(vec![HistoryRecord {
            id: 1,
            identity: MediaIdentity::movie(2),
            name: "Seen".into(),
            username: None,
            completed_at: "2024-01-01 00:00:00".into(),
            image: None,
        }]);
        host.active.insert(1);
        host.library.insert(3);
        let decider = decider(host, FakeRecognizer::with(&[("Subbed", 1), ("Seen", 2), ("Owned", 3), ("New", 4)]));

        let reason = |decision: Decision| match decision {
            Decision::Reject(_, reason) => Some(reason),
            _ => None,
        };
        assert_eq!(
            reason(decider.decide(&Candidate::new("Subbed", "2020", "1")).await.unwrap()),
            Some(RejectReason::ActiveSubscription)
        );
        assert_eq!(
            reason(decider.decide(&Candidate::new("Seen", "2020", "2")).await.unwrap()),
            Some(RejectReason::InHistory)
        );
        assert_eq!(
            reason(decider.decide(&Candidate::new("Owned", "2020", "3")).await.unwrap()),
            Some(RejectReason::InLibrary)
        );
        assert!(matches!(
            decider.decide(&Candidate::new("New", "2020", "4")).await.unwrap(),
            Decision::Subscribe(media) if media.tmdb_id == 4
        ));
    }

    #[tokio::test]
    async fn test_canonical_id_wins_over_declared() {
        let mut host = FakeHost::default();
        host.active.insert(500);
        let decider = decider(host, FakeRecognizer::with(&[("Renamed", 500)]));

        // Declared 7 is free, but the recognized 500 is already subscribed
        let decision = decider.decide(&Candidate::new("Renamed", "2021", "7")).await.unwrap();
        assert!(matches!(decision, Decision::Reject(media, RejectReason::ActiveSubscription) if media.tmdb_id == 500));
    }

    #[tokio::test]
    async fn test_unrecognized_candidate() {
        let decider = decider(FakeHost::default(), FakeRecognizer::default());
        assert_eq!(
            decider.decide(&Candidate::new("Nobody Knows", "1999", "unknown")).await.unwrap(),
            Decision::Unrecognized
        );
    }
}
