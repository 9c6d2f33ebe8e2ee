use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Local path of the movie table artifact
    #[serde(default = "default_movie_list_path")]
    pub movie_list_path: String,

    /// Local path of the similarity matrix artifact
    #[serde(default = "default_similarity_path")]
    pub similarity_path: String,

    /// Download source for the movie table, used when the local file is missing
    #[serde(default)]
    pub movie_list_url: Option<String>,

    /// Download source for the similarity matrix, used when the local file is missing
    #[serde(default)]
    pub similarity_url: Option<String>,

    /// TMDb API key. Without it every remote poster falls back to the placeholder.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,

    /// Upper bound for a single remote poster lookup
    #[serde(default = "default_poster_timeout_ms")]
    pub poster_timeout_ms: u64,

    /// Maximum number of resolved poster URLs kept in memory
    #[serde(default = "default_poster_cache_capacity")]
    pub poster_cache_capacity: u64,

    /// Lifetime of a cached poster URL
    #[serde(default = "default_poster_cache_ttl_secs")]
    pub poster_cache_ttl_secs: u64,

    /// Number of neighbours considered per recommendation
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Default page size for genre browsing
    #[serde(default = "default_browse_limit")]
    pub browse_limit: usize,

    /// Length of the precomputed per-row ordering (0 disables it)
    #[serde(default)]
    pub ranking_depth: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_movie_list_path() -> String {
    "movie_list.json".to_string()
}

fn default_similarity_path() -> String {
    "similarity.json".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_poster_timeout_ms() -> u64 {
    3000
}

fn default_poster_cache_capacity() -> u64 {
    10_000
}

fn default_poster_cache_ttl_secs() -> u64 {
    86_400
}

fn default_recommendation_count() -> usize {
    5
}

fn default_browse_limit() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
