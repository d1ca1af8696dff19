use curator_models::{MediaKind, RecognizedMedia};
use reqwest::Client;
use serde::Deserialize;
use crate::error::SourceError;

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    id: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    original_title: Option<String>,
    #[serde(default)]
    original_name: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

impl SearchResult {
    fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .or(self.original_title.as_deref())
            .or(self.original_name.as_deref())
    }

    fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .filter(|d| d.len() >= 4)
            .map(|d| &d[..4])
    }

    fn matches_title(&self, title: &str) -> bool {
        let wanted = normalize_title(title);
        [&self.title, &self.name, &self.original_title, &self.original_name]
            .iter()
            .filter_map(|t| t.as_deref())
            .any(|t| normalize_title(t) == wanted)
    }
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Choose the result to trust for a title/year query
///
/// Prefers an exact (normalised) title match with the requested year, then
/// any exact title match, then whatever TMDB ranked first.
pub(crate) fn pick_best(results: &[SearchResult], title: &str, year: Option<&str>) -> Option<RecognizedMedia> {
    let exact_with_year = results
        .iter()
        .find(|r| r.matches_title(title) && year.is_some() && r.year() == year);
    let exact = results.iter().find(|r| r.matches_title(title));

    let best = exact_with_year.or(exact).or_else(|| results.first())?;
    Some(RecognizedMedia {
        tmdb_id: best.id,
        title: best.display_title().unwrap_or(title).to_string(),
        year: best.year().map(str::to_string),
        poster: best.poster_path.as_ref().map(|p| format!("{}{}", IMAGE_BASE, p)),
    })
}

pub(crate) async fn search(
    client: &Client,
    api_key: &str,
    language: &str,
    title: &str,
    year: Option<&str>,
    kind: MediaKind,
) -> Result<SearchResponse, SourceError> {
    let (path, year_param) = match kind {
        MediaKind::Movie => ("search/movie", "year"),
        MediaKind::Tv => ("search/tv", "first_air_date_year"),
    };

    let mut url = format!(
        "{}/{}?api_key={}&language={}&query={}",
        API_BASE,
        path,
        urlencoding::encode(api_key),
        urlencoding::encode(language),
        urlencoding::encode(title)
    );
    if let Some(year) = year {
        url.push_str(&format!("&{}={}", year_param, urlencoding::encode(year)));
    }

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            service: "tmdb".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
