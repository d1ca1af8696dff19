use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};
use crate::error::SourceError;
use crate::gemini::api;
use crate::traits::Recommender;

/// Gemini `generateContent` as a text-completion collaborator
#[derive(Clone)]
pub struct GeminiRecommender {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiRecommender {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, api_key, model })
    }

    async fn try_complete(&self, prompt: &str) -> Result<String, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::NotConfigured("Gemini API key".to_string()));
        }
        let response = api::generate_content(&self.client, &self.model, &self.api_key, prompt).await?;
        Ok(response.first_text().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl Recommender for GeminiRecommender {
    async fn complete(&self, prompt: &str) -> String {
        info!(operation = "recommender_call", model = %self.model, "Calling Gemini");
        match self.try_complete(prompt).await {
            Ok(text) if text.is_empty() => {
                warn!(
                    operation = "recommender_call",
                    model = %self.model,
                    "Gemini answered successfully but returned no text"
                );
                String::new()
            }
            Ok(text) => text,
            Err(SourceError::Status { status: 404, .. }) => {
                error!(
                    operation = "recommender_call",
                    model = %self.model,
                    "Gemini returned 404; check that the model name exists and is available"
                );
                String::new()
            }
            Err(e) => {
                error!(
                    operation = "recommender_call",
                    model = %self.model,
                    error = %e,
                    "Gemini request failed"
                );
                String::new()
            }
        }
    }
}
