use serde::Deserialize;

pub mod movie;

pub use movie::{
    normalize_tag, placeholder_poster_url, title_case, MovieRecord, Origin, OriginFilter,
    PosterRef,
};

// ============================================================================
// TMDb API Types
// ============================================================================

/// Subset of the TMDb `GET /movie/{id}` response the poster lookup reads
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}
