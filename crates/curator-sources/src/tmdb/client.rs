use async_trait::async_trait;
use curator_models::{MediaKind, RecognizedMedia};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use crate::error::SourceError;
use crate::tmdb::api;
use crate::traits::Recognizer;

/// Title/year recognition against TMDB search
#[derive(Clone)]
pub struct TmdbRecognizer {
    client: Client,
    api_key: String,
    language: String,
}

impl TmdbRecognizer {
    pub fn new(api_key: String, language: String, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, api_key, language })
    }
}

#[async_trait]
impl Recognizer for TmdbRecognizer {
    async fn recognize(
        &self,
        title: &str,
        year: Option<&str>,
        kind: MediaKind,
    ) -> Result<Option<RecognizedMedia>, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::NotConfigured("TMDB API key".to_string()));
        }

        let response = api::search(&self.client, &self.api_key, &self.language, title, year, kind).await?;
        debug!(
            operation = "tmdb_search",
            title = %title,
            year = ?year,
            results = response.results.len(),
            "TMDB search finished"
        );
        Ok(api::pick_best(&response.results, title, year))
    }
}
