//! Poster resolution
//!
//! Bollywood rows carry a direct poster URL; every other row is resolved remotely
//! through a pluggable lookup. Lookups are time-bounded and cached, and any failure
//! degrades to a placeholder image instead of an error.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{placeholder_poster_url, MovieRecord, PosterRef},
    store::PosterCache,
};

pub mod tmdb;

pub use tmdb::TmdbPosterProvider;

/// Remote source of poster images
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterLookup: Send + Sync {
    /// Fetch the poster image URL for a movie id
    ///
    /// `Ok(None)` means the service knows the movie but has no poster for it.
    async fn fetch_poster(&self, movie_id: i64) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct PosterService {
    /// `None` when no API key is configured
    lookup: Option<Arc<dyn PosterLookup>>,
    cache: PosterCache,
    timeout: Duration,
}

impl PosterService {
    pub fn new(
        lookup: Option<Arc<dyn PosterLookup>>,
        cache: PosterCache,
        timeout: Duration,
    ) -> Self {
        if lookup.is_none() {
            tracing::warn!("No poster lookup configured, remote posters will use placeholders");
        }

        Self {
            lookup,
            cache,
            timeout,
        }
    }

    /// Poster URL for one record; never fails
    pub async fn resolve(&self, record: &MovieRecord) -> String {
        let url = match record.poster_ref() {
            PosterRef::Direct(url) => url,
            PosterRef::Remote(movie_id) => self.resolve_remote(movie_id).await,
        };

        url.unwrap_or_else(|| placeholder_poster_url(&record.title))
    }

    /// Resolves posters for all records in parallel, keeping input order
    pub async fn resolve_batch(&self, records: &[&MovieRecord]) -> Vec<String> {
        let mut tasks = Vec::with_capacity(records.len());

        for record in records {
            let service = self.clone();
            let record = (*record).clone();
            let title = record.title.clone();
            let task = tokio::spawn(async move { service.resolve(&record).await });
            tasks.push((title, task));
        }

        let mut urls = Vec::with_capacity(tasks.len());
        for (title, task) in tasks {
            match task.await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::error!(error = %e, "Poster task join error");
                    urls.push(placeholder_poster_url(&title));
                }
            }
        }

        urls
    }

    async fn resolve_remote(&self, movie_id: i64) -> Option<String> {
        if let Some(url) = self.cache.get(movie_id).await {
            tracing::debug!(movie_id = movie_id, "Poster cache hit");
            return Some(url);
        }

        let lookup = self.lookup.as_ref()?;

        match tokio::time::timeout(self.timeout, lookup.fetch_poster(movie_id)).await {
            Ok(Ok(Some(url))) => {
                self.cache.insert(movie_id, url.clone()).await;
                Some(url)
            }
            Ok(Ok(None)) => {
                tracing::debug!(
                    movie_id = movie_id,
                    provider = lookup.name(),
                    "No poster available"
                );
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    movie_id = movie_id,
                    provider = lookup.name(),
                    error = %e,
                    "Poster lookup failed, using placeholder"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    movie_id = movie_id,
                    provider = lookup.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Poster lookup timed out, using placeholder"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Origin;

    fn record(movie_id: i64, title: &str, origin: Origin, poster_url: Option<&str>) -> MovieRecord {
        MovieRecord {
            movie_id,
            title: title.to_string(),
            origin: Some(origin),
            tags: vec![],
            overview: vec![],
            cast: vec![],
            crew: vec![],
            poster_url: poster_url.map(str::to_string),
        }
    }

    fn service(lookup: Option<Arc<dyn PosterLookup>>) -> PosterService {
        PosterService::new(
            lookup,
            PosterCache::new(100, Duration::from_secs(60)),
            Duration::from_millis(100),
        )
    }

    struct SlowLookup;

    #[async_trait::async_trait]
    impl PosterLookup for SlowLookup {
        async fn fetch_poster(&self, _movie_id: i64) -> AppResult<Option<String>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some("https://late.example/poster.jpg".to_string()))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_bollywood_uses_direct_url_without_lookup() {
        let mut mock = MockPosterLookup::new();
        mock.expect_fetch_poster().never();
        mock.expect_name().return_const("mock");

        let posters = service(Some(Arc::new(mock) as Arc<dyn PosterLookup>));
        let devdas = record(1, "Devdas", Origin::Bollywood, Some("https://img.example/devdas.jpg"));

        assert_eq!(posters.resolve(&devdas).await, "https://img.example/devdas.jpg");
    }

    #[tokio::test]
    async fn test_bollywood_without_url_gets_placeholder() {
        let posters = service(None);
        let movie = record(1, "Kal Ho Naa Ho", Origin::Bollywood, None);

        assert_eq!(
            posters.resolve(&movie).await,
            "https://via.placeholder.com/500x750.png?text=Kal+Ho+Naa+Ho"
        );
    }

    #[tokio::test]
    async fn test_remote_lookup_is_cached() {
        let mut mock = MockPosterLookup::new();
        mock.expect_fetch_poster()
            .withf(|id| *id == 19995)
            .times(1)
            .returning(|_| Ok(Some("https://image.tmdb.org/t/p/w500/a.jpg".to_string())));
        mock.expect_name().return_const("mock");

        let posters = service(Some(Arc::new(mock) as Arc<dyn PosterLookup>));
        let avatar = record(19995, "Avatar", Origin::Hollywood, None);

        assert_eq!(posters.resolve(&avatar).await, "https://image.tmdb.org/t/p/w500/a.jpg");
        assert_eq!(posters.resolve(&avatar).await, "https://image.tmdb.org/t/p/w500/a.jpg");
    }

    #[tokio::test]
    async fn test_missing_poster_path_falls_back() {
        let mut mock = MockPosterLookup::new();
        mock.expect_fetch_poster().returning(|_| Ok(None));
        mock.expect_name().return_const("mock");

        let posters = service(Some(Arc::new(mock) as Arc<dyn PosterLookup>));
        let movie = record(7, "The Dark Knight", Origin::Hollywood, None);

        assert_eq!(
            posters.resolve(&movie).await,
            "https://via.placeholder.com/500x750.png?text=The+Dark+Knight"
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_falls_back_and_is_retried() {
        let mut mock = MockPosterLookup::new();
        mock.expect_fetch_poster()
            .times(2)
            .returning(|_| Err(AppError::RemoteLookup("boom".to_string())));
        mock.expect_name().return_const("mock");

        let posters = service(Some(Arc::new(mock) as Arc<dyn PosterLookup>));
        let movie = record(7, "Heat", Origin::Hollywood, None);

        let placeholder = "https://via.placeholder.com/500x750.png?text=Heat";
        assert_eq!(posters.resolve(&movie).await, placeholder);
        assert_eq!(posters.resolve(&movie).await, placeholder);
    }

    #[tokio::test]
    async fn test_timed_out_lookup_falls_back() {
        let posters = service(Some(Arc::new(SlowLookup) as Arc<dyn PosterLookup>));
        let movie = record(7, "Heat", Origin::Hollywood, None);

        assert_eq!(
            posters.resolve(&movie).await,
            "https://via.placeholder.com/500x750.png?text=Heat"
        );
    }

    #[tokio::test]
    async fn test_no_lookup_configured_falls_back() {
        let posters = service(None);
        let movie = record(7, "Heat", Origin::Hollywood, None);

        assert_eq!(
            posters.resolve(&movie).await,
            "https://via.placeholder.com/500x750.png?text=Heat"
        );
    }

    #[tokio::test]
    async fn test_resolve_batch_keeps_order() {
        let mut mock = MockPosterLookup::new();
        mock.expect_fetch_poster()
            .returning(|id| Ok(Some(format!("https://image.tmdb.org/t/p/w500/{}.jpg", id))));
        mock.expect_name().return_const("mock");

        let posters = service(Some(Arc::new(mock) as Arc<dyn PosterLookup>));
        let a = record(1, "A", Origin::Hollywood, None);
        let b = record(2, "B", Origin::Bollywood, Some("https://img.example/b.jpg"));
        let c = record(3, "C", Origin::Hollywood, None);

        let urls = posters.resolve_batch(&[&a, &b, &c]).await;
        assert_eq!(
            urls,
            vec![
                "https://image.tmdb.org/t/p/w500/1.jpg".to_string(),
                "https://img.example/b.jpg".to_string(),
                "https://image.tmdb.org/t/p/w500/3.jpg".to_string(),
            ]
        );
    }
}
