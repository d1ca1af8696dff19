use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::error::SourceError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate, if any
    pub(crate) fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

pub(crate) fn generate_url(model: &str, api_key: &str) -> String {
    format!(
        "{}/{}:generateContent?key={}",
        API_BASE,
        urlencoding::encode(model),
        urlencoding::encode(api_key)
    )
}

/// POST a single-turn prompt and decode the response body
pub(crate) async fn generate_content(
    client: &Client,
    model: &str,
    api_key: &str,
    prompt: &str,
) -> Result<GenerateResponse, SourceError> {
    let payload = GenerateRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart { text: prompt }],
        }],
    };

    let response = client
        .post(generate_url(model, api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            service: "gemini".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    debug!(operation = "gemini_response", bytes = body.len(), "Received Gemini response");
    let parsed: GenerateResponse = serde_json::from_str(&body)?;
    Ok(parsed)
}
