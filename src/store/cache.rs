use moka::future::Cache;
use std::time::Duration;

/// Bounded in-memory cache of resolved poster URLs keyed by movie id
///
/// Entries are evicted once `capacity` is reached or `ttl` has elapsed since insertion.
#[derive(Clone)]
pub struct PosterCache {
    inner: Cache<i64, String>,
}

impl PosterCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { inner }
    }

    pub async fn get(&self, movie_id: i64) -> Option<String> {
        self.inner.get(&movie_id).await
    }

    pub async fn insert(&self, movie_id: i64, url: String) {
        self.inner.insert(movie_id, url).await;
    }

    /// Approximate number of live entries
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
