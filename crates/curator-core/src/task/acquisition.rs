use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use curator_config::{AcquisitionConfig, Config};
use curator_models::{Candidate, JournalEntry, RecognizedMedia, RunSummary, SubscriptionRequest};
use curator_sources::{Collaborators, KeyValueStore, Notifier, Recommender, SubscriptionService};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use crate::acquisition::{AcquisitionDecider, Decision};
use crate::error::TaskError;
use crate::journal::Journal;
use crate::parser::{RecommendationParser, RegexRecommendationParser};
use super::{send_summary, Task, ACQUISITION_JOURNAL_KEY, ACQUISITION_TASK};

/// Built-in recommender prompt, dated, with the user's extra requirements appended
pub fn build_prompt(today: NaiveDate, extra: &str) -> String {
    let mut prompt = format!(
        "Today is {}.\n\
         Act as a professional film recommendation expert.\n\
         Recommend 5 family-friendly animated films that are already released or will be released within the next 3 months.\n\
         Requirements:\n\
         1. Use the official title as listed on TheMovieDB (TMDB).\n\
         2. Answer one film per line in exactly the format 《Title》(Year) (TMDB ID: number), with no other text or list markers.",
        today.format("%Y-%m-%d")
    );
    let extra = extra.trim();
    if !extra.is_empty() {
        prompt.push_str("\n\nAdditional requirements:\n");
        prompt.push_str(extra);
    }
    prompt
}

enum ItemOutcome {
    Added,
    Skipped,
}

/// Asks the recommender for titles and subscribes to the ones not yet known
pub struct AcquisitionTask {
    config: AcquisitionConfig,
    tmdb_api_key: String,
    recommender: Arc<dyn Recommender>,
    subscriptions: Arc<dyn SubscriptionService>,
    decider: AcquisitionDecider,
    parser: Box<dyn RecommendationParser>,
    notifier: Arc<dyn Notifier>,
    state: Arc<dyn KeyValueStore>,
    journal: Journal,
}

impl AcquisitionTask {
    pub fn new(config: &Config, collaborators: &Collaborators) -> Self {
        let acquisition = config.acquisition.clone();
        let journal = Journal::new(
            collaborators.state.clone(),
            ACQUISITION_JOURNAL_KEY,
            acquisition.journal_limit,
        );
        Self {
            config: acquisition,
            tmdb_api_key: config.tmdb.api_key.clone(),
            recommender: collaborators.recommender.clone(),
            subscriptions: collaborators.subscriptions.clone(),
            decider: AcquisitionDecider::new(
                collaborators.recognizer.clone(),
                collaborators.subscriptions.clone(),
                collaborators.history.clone(),
                collaborators.library.clone(),
            ),
            parser: Box::new(RegexRecommendationParser::new()),
            notifier: collaborators.notifier.clone(),
            state: collaborators.state.clone(),
            journal,
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn prompt(&self) -> String {
        build_prompt(Local::now().date_naive(), &self.config.prompt)
    }

    async fn process(&self, candidate: &Candidate, added_ids: &mut HashSet<u32>) -> ItemOutcome {
        let media = match self.decider.decide(candidate).await {
            Ok(Decision::Subscribe(media)) => media,
            Ok(Decision::Reject(media, reason)) => {
                info!(
                    operation = "acquisition_run",
                    title = %candidate.title,
                    tmdb_id = media.tmdb_id,
                    "Skipping: {}",
                    reason
                );
                return ItemOutcome::Skipped;
            }
            Ok(Decision::Unrecognized) => {
                warn!(
                    operation = "acquisition_run",
                    title = %candidate.title,
                    year = %candidate.year,
                    "Could not recognize title, skipping"
                );
                return ItemOutcome::Skipped;
            }
            Err(e) => {
                error!(
                    operation = "acquisition_run",
                    title = %candidate.title,
                    error = %e,
                    "Failed to evaluate candidate, skipping"
                );
                return ItemOutcome::Skipped;
            }
        };

        if added_ids.contains(&media.tmdb_id) {
            debug!(operation = "acquisition_run", tmdb_id = media.tmdb_id, "Already added in this run");
            return ItemOutcome::Skipped;
        }

        let request = self.request_for(candidate, &media);
        match self.subscriptions.add(&request).await {
            Ok(outcome) => match outcome.id {
                Some(id) => {
                    added_ids.insert(media.tmdb_id);
                    info!(
                        operation = "acquisition_run",
                        title = %media.title,
                        tmdb_id = media.tmdb_id,
                        subscription_id = id,
                        "Subscription added"
                    );
                    let year = request.year.clone().unwrap_or_default();
                    let entry = JournalEntry::new(media.title.clone(), year, media.poster.clone());
                    if let Err(e) = self.journal.append(entry).await {
                        error!(
                            operation = "acquisition_run",
                            tmdb_id = media.tmdb_id,
                            error = %e,
                            "Subscription added but journal update failed"
                        );
                    }
                    ItemOutcome::Added
                }
                None => {
                    error!(
                        operation = "acquisition_run",
                        title = %media.title,
                        message = %outcome.message,
                        "Subscription was not created"
                    );
                    ItemOutcome::Skipped
                }
            },
            Err(e) => {
                error!(
                    operation = "acquisition_run",
                    title = %media.title,
                    error = %e,
                    "Failed to add subscription"
                );
                ItemOutcome::Skipped
            }
        }
    }

    fn request_for(&self, candidate: &Candidate, media: &RecognizedMedia) -> SubscriptionRequest {
        SubscriptionRequest {
            title: media.title.clone(),
            year: media.year.clone().or_else(|| Some(candidate.year.clone())),
            kind: self.decider.kind(),
            tmdb_id: media.tmdb_id,
            owner_tag: ACQUISITION_TASK.to_string(),
            save_path: self.config.save_path.clone().filter(|path| !path.trim().is_empty()),
            sites: self.config.sites.clone(),
        }
    }
}

#[async_trait]
impl Task for AcquisitionTask {
    fn name(&self) -> &'static str {
        ACQUISITION_TASK
    }

    fn configure(&mut self, config: &Config) {
        self.config = config.acquisition.clone();
        self.tmdb_api_key = config.tmdb.api_key.clone();
        self.journal = Journal::new(self.state.clone(), ACQUISITION_JOURNAL_KEY, self.config.journal_limit);
    }

    fn is_enabled(&self) -> bool {
        self.config.common.enabled
    }

    async fn run(&self) -> Result<RunSummary, TaskError> {
        if self.config.api_key.trim().is_empty() {
            info!(operation = "acquisition_run", task = ACQUISITION_TASK, "No recommender API key configured");
            return Err(TaskError::ConfigIncomplete("acquisition needs an api_key".to_string()));
        }
        // Recognition goes through TMDB
        if self.tmdb_api_key.trim().is_empty() {
            info!(operation = "acquisition_run", task = ACQUISITION_TASK, "No TMDB API key configured");
            return Err(TaskError::ConfigIncomplete("acquisition needs tmdb.api_key".to_string()));
        }

        let prompt = self.prompt();
        debug!(operation = "acquisition_run", prompt = %prompt, "Prompt built");
        let text = self.recommender.complete(&prompt).await;
        if text.trim().is_empty() {
            error!(operation = "acquisition_run", task = ACQUISITION_TASK, "Recommender returned no result, run aborted");
            return Err(TaskError::Recommender);
        }

        let candidates = self.parser.parse(&text);
        let mut summary = RunSummary::new(ACQUISITION_TASK);
        summary.found = candidates.len();
        info!(operation = "acquisition_run", candidates = candidates.len(), "Parsed recommender output");

        let mut added_ids = HashSet::new();
        for candidate in &candidates {
            match self.process(candidate, &mut added_ids).await {
                ItemOutcome::Added => summary.processed += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
            }
        }

        info!(operation = "acquisition_run", task = ACQUISITION_TASK, "{}", summary.summary_line());
        if self.config.common.notify && summary.processed > 0 {
            send_summary(self.notifier.as_ref(), &summary).await;
        }
        Ok(summary)
    }

    fn describe_schedule(&self) -> (String, bool) {
        self.config.effective_cron()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        collaborators, FakeHost, FakeRecognizer, FakeRecommender, FakeStorage, MemoryStore, RecordingNotifier,
    };

    struct Fixture {
        host: Arc<FakeHost>,
        state: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        recommender: Arc<FakeRecommender>,
        task: AcquisitionTask,
    }

    fn fixture(host: FakeHost, recognizer: FakeRecognizer, response: &str) -> Fixture {
        let host = Arc::new(host);
        let state = Arc::new(MemoryStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let recommender = Arc::new(FakeRecommender::new(response));
        let mut collaborators =
            collaborators(host.clone(), Arc::new(FakeStorage::default()), state.clone(), notifier.clone());
        collaborators.recognizer = Arc::new(recognizer);
        collaborators.recommender = recommender.clone();

        let mut config = Config::default();
        config.acquisition.common.enabled = true;
        config.acquisition.common.notify = true;
        config.acquisition.api_key = "key".to_string();
        config.tmdb.api_key = "tmdb".to_string();
        config.acquisition.sites = vec![2];
        let task = AcquisitionTask::new(&config, &collaborators);
        Fixture { host, state, notifier, recommender, task }
    }

    #[test]
    fn test_build_prompt() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let plain = build_prompt(today, "  ");
        assert!(plain.starts_with("Today is 2024-05-17."));
        assert!(plain.contains("《Title》(Year) (TMDB ID: number)"));
        assert!(!plain.contains("Additional requirements"));

        let extended = build_prompt(today, "Only Pixar films");
        assert!(extended.ends_with("Additional requirements:\nOnly Pixar films"));
    }

    #[tokio::test]
    async fn test_subscribes_only_unknown_titles() {
        let mut host = FakeHost::default();
        host.active.insert(12);
        let f = fixture(
            host,
            FakeRecognizer::with(&[("Finding Nemo", 12), ("Old Movie", 99)]),
            "《Finding Nemo》(2003) (TMDB ID: 12)\n《Old Movie》(1990) (TMDB ID: 99)",
        );

        let summary = f.task.run().await.unwrap();
        assert_eq!(f.host.added_ids(), vec![99]);
        assert_eq!(summary.found, 2);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);

        let request = f.host.added.lock().unwrap()[0].clone();
        assert_eq!(request.owner_tag, "acquisition");
        assert_eq!(request.year.as_deref(), Some("1990"));
        assert_eq!(request.sites, vec![2]);

        let journal = f.task.journal().entries().await.unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].title, "Old Movie");
        assert_eq!(journal[0].detail, "1990");
        assert_eq!(f.notifier.count(), 1);
        assert_eq!(f.recommender.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recommender_failure_has_no_side_effects() {
        let f = fixture(FakeHost::default(), FakeRecognizer::with(&[("Up", 14160)]), "");

        assert!(matches!(f.task.run().await, Err(TaskError::Recommender)));
        assert!(f.host.added_ids().is_empty());
        assert_eq!(f.state.writes(), 0);
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_candidates_never_reach_add() {
        let mut host = FakeHost::with_history(vec![curator_models::HistoryRecord {
            id: 1,
            identity: curator_models::MediaIdentity::movie(2),
            name: "Seen".into(),
            username: None,
            completed_at: "2024-01-01 00:00:00".into(),
            image: None,
        }]);
        host.active.insert(1);
        host.library.insert(3);
        let f = fixture(
            host,
            FakeRecognizer::with(&[("Subbed", 1), ("Seen", 2), ("Owned", 3)]),
            "《Subbed》(2020) (TMDB ID: 1)\n《Seen》(2020) (TMDB ID: 2)\n《Owned》(2020) (TMDB ID: 3)",
        );

        let summary = f.task.run().await.unwrap();
        assert!(f.host.added_ids().is_empty());
        assert_eq!(summary.skipped, 3);
        // Nothing added, so no notification
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_item_failures_are_isolated() {
        let mut host = FakeHost::default();
        host.fail_add.insert(1);
        let mut recognizer = FakeRecognizer::with(&[("Broken", 1), ("Fine", 3)]);
        recognizer.failing.insert("Flaky".to_string());
        let f = fixture(
            host,
            recognizer,
            "《Broken》(2020) (TMDB ID: 1)\n《Flaky》(2021) (TMDB ID: 2)\n《Ghost》(2022) (TMDB ID: 4)\n《Fine》(2023) (TMDB ID: 3)",
        );

        let summary = f.task.run().await.unwrap();
        assert_eq!(summary.found, 4);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 3);
        assert_eq!(f.host.added_ids(), vec![3]);
    }

    #[tokio::test]
    async fn test_duplicate_canonical_id_added_once() {
        let f = fixture(
            FakeHost::default(),
            FakeRecognizer::with(&[("Up", 14160), ("Oben", 14160)]),
            "《Up》(2009) (TMDB ID: 14160)\n《Oben》(2009) (TMDB ID: 14160)",
        );
        let summary = f.task.run().await.unwrap();
        assert_eq!(f.host.added_ids(), vec![14160]);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_incomplete_config() {
        let f = fixture(FakeHost::default(), FakeRecognizer::default(), "《Up》(2009)");
        let mut config = Config::default();
        config.acquisition.api_key = String::new();
        let mut task = f.task;
        task.configure(&config);
        assert!(task.run().await.unwrap_err().is_config_incomplete());
        assert!(f.recommender.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_add_lets_duplicate_retry() {
        let host = FakeHost::default();
        host.fail_add_once.lock().unwrap().insert(14160);
        let f = fixture(
            host,
            FakeRecognizer::with(&[("Up", 14160), ("Oben", 14160)]),
            "《Up》(2009) (TMDB ID: 14160)\n《Oben》(2009) (TMDB ID: 14160)",
        );
        let summary = f.task.run().await.unwrap();
        assert_eq!(f.host.added_ids(), vec![14160]);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_missing_tmdb_key_stops_before_recommender() {
        let f = fixture(FakeHost::default(), FakeRecognizer::with(&[("Up", 14160)]), "《Up》(2009) (TMDB ID: 14160)");
        let mut config = Config::default();
        config.acquisition.common.enabled = true;
        config.acquisition.api_key = "key".to_string();
        let mut task = f.task;
        task.configure(&config);

        assert!(task.run().await.unwrap_err().is_config_incomplete());
        assert!(f.recommender.prompts.lock().unwrap().is_empty());
        assert!(f.host.added_ids().is_empty());
    }
}
