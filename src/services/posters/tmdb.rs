//! TMDb poster lookup
//!
//! API Flow:
//! 1. Details: /movie/{movie_id}?api_key=KEY → JSON with `poster_path`
//! 2. Image URL: {image_base}/{poster_path}

use crate::{
    error::{AppError, AppResult},
    models::TmdbMovieDetails,
    services::posters::PosterLookup,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbPosterProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
}

impl TmdbPosterProvider {
    /// Creates a provider whose HTTP requests give up after `timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        image_base_url: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Joins the image base and a poster path with exactly one slash
    fn image_url(&self, poster_path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url,
            poster_path.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl PosterLookup for TmdbPosterProvider {
    async fn fetch_poster(&self, movie_id: i64) -> AppResult<Option<String>> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RemoteLookup(format!(
                "TMDb API returned status {}: {}",
                status, body
            )));
        }

        // The request URL carries the API key, so it is stripped from errors
        let details: TmdbMovieDetails = response
            .json()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        let poster = details
            .poster_path
            .filter(|path| !path.trim().is_empty())
            .map(|path| self.image_url(&path));

        tracing::debug!(
            movie_id = movie_id,
            found = poster.is_some(),
            provider = "tmdb",
            "Poster lookup completed"
        );

        Ok(poster)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
