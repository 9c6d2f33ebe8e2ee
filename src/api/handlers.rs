use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::OriginFilter,
    services::{title_search, RankedMovie, FEATURED_GENRES},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    #[serde(default)]
    pub origin: OriginFilter,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub origin: OriginFilter,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub origin: OriginFilter,
}

/// A movie as shown to clients
#[derive(Debug, Serialize)]
pub struct MovieCard {
    pub row: usize,
    pub movie_id: i64,
    pub title: String,
    pub origin: Option<String>,
    pub poster_url: String,
    pub description: String,
    pub cast: Vec<String>,
    pub directors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl MovieCard {
    fn new(movie: &RankedMovie<'_>, poster_url: String) -> Self {
        let record = movie.record;
        Self {
            row: movie.row,
            movie_id: record.movie_id,
            title: record.title.clone(),
            origin: record.origin.as_ref().map(|o| o.to_string()),
            poster_url,
            description: record.description(),
            cast: record.cast_display(),
            directors: record.directors_display(),
            score: movie.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub origin: OriginFilter,
    pub results: Vec<MovieCard>,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub genre: String,
    pub origin: OriginFilter,
    pub results: Vec<MovieCard>,
}

/// Attaches posters to ranked movies, resolving them in parallel
async fn movie_cards(state: &AppState, movies: &[RankedMovie<'_>]) -> Vec<MovieCard> {
    let records: Vec<_> = movies.iter().map(|m| m.record).collect();
    let posters = state.posters.resolve_batch(&records).await;

    movies
        .iter()
        .zip(posters)
        .map(|(movie, poster_url)| MovieCard::new(movie, poster_url))
        .collect()
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "movies": state.engine.catalog().len()
        })),
    )
}

/// Movies similar to a title
///
/// An unknown or blank title is not an error: the response simply has no results.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        title = %query.title,
        origin = %query.origin,
        "Processing recommendation request"
    );

    let movies = state.engine.recommend(&query.title, &query.origin);
    let results = movie_cards(&state, &movies).await;

    Ok(Json(RecommendationResponse {
        title: query.title,
        origin: query.origin,
        results,
    }))
}

/// Genres offered for browsing
pub async fn list_genres() -> Json<Vec<&'static str>> {
    Json(FEATURED_GENRES.to_vec())
}

/// Movies of one genre in catalog order
pub async fn browse_genre(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(genre): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<BrowseResponse>> {
    if genre.trim().is_empty() {
        return Err(AppError::InvalidInput("Genre cannot be empty".to_string()));
    }

    let limit = query.limit.unwrap_or(state.browse_limit);

    tracing::info!(
        request_id = %request_id,
        genre = %genre,
        origin = %query.origin,
        limit = limit,
        "Processing genre browse request"
    );

    let movies = state.engine.browse_by_genre(&genre, &query.origin, limit);
    let results = movie_cards(&state, &movies).await;

    Ok(Json(BrowseResponse {
        genre,
        origin: query.origin,
        results,
    }))
}

/// Titles matching a search box query
pub async fn search_titles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<String>> {
    let titles = title_search::search_titles(state.engine.catalog(), &query.q, &query.origin);

    tracing::debug!(
        query = %query.q,
        origin = %query.origin,
        results = titles.len(),
        "Title search completed"
    );

    Json(titles)
}

/// One movie by row index
pub async fn get_movie(
    State(state): State<AppState>,
    Path(row): Path<usize>,
) -> AppResult<Json<MovieCard>> {
    let movie = state.engine.movie(row).map_err(|e| match e {
        AppError::IndexOutOfRange { index, .. } => {
            AppError::NotFound(format!("No movie at row {}", index))
        }
        other => other,
    })?;

    let mut cards = movie_cards(&state, std::slice::from_ref(&movie)).await;
    cards
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal("Movie card was not built".to_string()))
}
