use crate::{
    error::{AppError, AppResult},
    models::{MovieRecord, OriginFilter},
    services::ranker::SimilarityRanker,
    store::CatalogStore,
};

/// Genres offered for browsing
pub const FEATURED_GENRES: [&str; 8] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Romance",
    "Thriller",
    "Crime",
    "Family",
];

/// A catalog row selected by a query
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMovie<'a> {
    pub row: usize,
    /// Similarity to the query movie, when the row came from a similarity ranking
    pub score: Option<f64>,
    pub record: &'a MovieRecord,
}

/// Catalog plus similarity ranking, built once at startup and shared read-only
pub struct RecommendationEngine {
    catalog: CatalogStore,
    ranker: SimilarityRanker,
    recommendation_count: usize,
}

impl RecommendationEngine {
    /// Joins the catalog and the ranker; both must describe the same rows
    pub fn new(
        catalog: CatalogStore,
        ranker: SimilarityRanker,
        recommendation_count: usize,
    ) -> AppResult<Self> {
        if catalog.len() != ranker.dimension() {
            return Err(AppError::DataLoad(format!(
                "Catalog has {} movies but the similarity matrix is {}x{}",
                catalog.len(),
                ranker.dimension(),
                ranker.dimension()
            )));
        }

        tracing::info!(
            movies = catalog.len(),
            recommendation_count = recommendation_count,
            "Recommendation engine ready"
        );

        Ok(Self {
            catalog,
            ranker,
            recommendation_count,
        })
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn ranker(&self) -> &SimilarityRanker {
        &self.ranker
    }

    pub fn recommendation_count(&self) -> usize {
        self.recommendation_count
    }

    /// Movies most similar to `title`, best first
    ///
    /// The nearest `recommendation_count` neighbours are taken first and the origin
    /// filter is applied to them afterwards, so a filter can shrink the result but
    /// never pulls in lower-ranked movies. An unknown title yields no results.
    pub fn recommend(&self, title: &str, origin_filter: &OriginFilter) -> Vec<RankedMovie<'_>> {
        let Some(row) = self.catalog.find_row_by_title(title) else {
            tracing::info!(title = %title, "No catalog entry for title");
            return Vec::new();
        };

        let neighbours =
            match self
                .ranker
                .top_k_similar(row, self.recommendation_count, true, None)
            {
                Ok(neighbours) => neighbours,
                Err(e) => {
                    tracing::error!(title = %title, row = row, error = %e, "Ranking failed");
                    return Vec::new();
                }
            };

        let results: Vec<RankedMovie<'_>> = neighbours
            .into_iter()
            .filter_map(|candidate| self.ranked(row, candidate))
            .filter(|movie| origin_filter.allows(movie.record.origin.as_ref()))
            .collect();

        tracing::info!(
            title = %title,
            row = row,
            origin = %origin_filter,
            results = results.len(),
            "Recommendations computed"
        );

        results
    }

    /// Catalog rows tagged with `genre`, in stored order, at most `limit`
    pub fn browse_by_genre(
        &self,
        genre: &str,
        origin_filter: &OriginFilter,
        limit: usize,
    ) -> Vec<RankedMovie<'_>> {
        let results: Vec<RankedMovie<'_>> = self
            .catalog
            .filter_by_tag(genre)
            .into_iter()
            .filter_map(|row| {
                let record = self.catalog.get_record(row).ok()?;
                origin_filter
                    .allows(record.origin.as_ref())
                    .then_some(RankedMovie {
                        row,
                        score: None,
                        record,
                    })
            })
            .take(limit)
            .collect();

        tracing::info!(
            genre = %genre,
            origin = %origin_filter,
            limit = limit,
            results = results.len(),
            "Genre browse computed"
        );

        results
    }

    /// One catalog row by index
    pub fn movie(&self, row: usize) -> AppResult<RankedMovie<'_>> {
        let record = self.catalog.get_record(row)?;
        Ok(RankedMovie {
            row,
            score: None,
            record,
        })
    }

    fn ranked(&self, query_row: usize, candidate: usize) -> Option<RankedMovie<'_>> {
        let lookup = self.catalog.get_record(candidate).and_then(|record| {
            let score = self.ranker.matrix().score(query_row, candidate)?;
            Ok((record, score))
        });

        match lookup {
            Ok((record, score)) => Some(RankedMovie {
                row: candidate,
                score: Some(score),
                record,
            }),
            Err(e) => {
                tracing::error!(row = candidate, error = %e, "Ranked row missing from catalog");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Origin;
    use crate::store::SimilarityMatrix;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(value: serde_json::Value) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn load_engine(
        movies: &NamedTempFile,
        similarity: &NamedTempFile,
    ) -> AppResult<RecommendationEngine> {
        let catalog = CatalogStore::load(movies.path())?;
        let matrix = SimilarityMatrix::load(similarity.path())?;
        RecommendationEngine::new(catalog, SimilarityRanker::new(matrix), 5)
    }

    fn movie(movie_id: i64, title: &str, origin: &str, tags: &[&str]) -> MovieRecord {
        MovieRecord {
            movie_id,
            title: title.to_string(),
            origin: Some(Origin::from(origin)),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            overview: vec![],
            cast: vec![],
            crew: vec![],
            poster_url: None,
        }
    }

    fn engine() -> RecommendationEngine {
        let catalog = CatalogStore::new(vec![
            movie(10, "Avatar", "Hollywood", &["action", "sciencefiction"]),
            movie(11, "Devdas", "Bollywood", &["drama", "romance"]),
            movie(12, "Spectre", "Hollywood", &["action", "crime"]),
            movie(13, "Lagaan", "Bollywood", &["drama", "sport"]),
            movie(14, "Inception", "Hollywood", &["action", "thriller"]),
            movie(15, "Sholay", "Bollywood", &["action", "adventure"]),
            movie(16, "Avatar", "Bollywood", &["family"]),
        ]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.9, 0.2, 0.5, 0.8, 0.1, 0.05],
            vec![0.9, 1.0, 0.3, 0.3, 0.3, 0.4, 0.0],
            vec![0.2, 0.3, 1.0, 0.6, 0.1, 0.0, 0.0],
            vec![0.5, 0.3, 0.6, 1.0, 0.2, 0.7, 0.0],
            vec![0.8, 0.3, 0.1, 0.2, 1.0, 0.5, 0.0],
            vec![0.1, 0.4, 0.0, 0.7, 0.5, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();

        RecommendationEngine::new(catalog, SimilarityRanker::new(matrix), 5).unwrap()
    }

    fn rows(results: &[RankedMovie<'_>]) -> Vec<usize> {
        results.iter().map(|m| m.row).collect()
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let catalog = CatalogStore::new(vec![movie(1, "A", "Hollywood", &[])]);
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        let result = RecommendationEngine::new(catalog, SimilarityRanker::new(matrix), 5);
        assert!(matches!(result, Err(AppError::DataLoad(_))));
    }

    #[test]
    fn test_loaded_artifacts_keep_rows_aligned() {
        let movies = json_file(serde_json::json!({
            "movie_id": {"0": 500, "1": 501, "2": 502, "3": 503},
            "title": {"0": "Avatar", "1": "Devdas", "2": "Spectre", "3": "Lagaan"},
            "origin": {"0": "Hollywood", "1": "Bollywood", "2": "Hollywood", "3": "Bollywood"},
            "tags": {"0": "action", "1": "drama", "2": "action", "3": "drama"}
        }));
        let similarity = json_file(serde_json::json!([
            [1.0, 0.2, 0.9, 0.4],
            [0.2, 1.0, 0.3, 0.8],
            [0.9, 0.3, 1.0, 0.1],
            [0.4, 0.8, 0.1, 1.0]
        ]));

        let engine = load_engine(&movies, &similarity).unwrap();

        let avatar = engine.recommend("Avatar", &OriginFilter::All);
        let titles: Vec<&str> = avatar.iter().map(|m| m.record.title.as_str()).collect();
        assert_eq!(titles, vec!["Spectre", "Lagaan", "Devdas"]);
        for ranked in &avatar {
            assert_eq!(ranked.record.movie_id, 500 + ranked.row as i64);
            let expected = engine.ranker().matrix().score(0, ranked.row).unwrap();
            assert_eq!(ranked.score, Some(expected));
        }

        let lagaan = engine.recommend("Lagaan", &OriginFilter::from("Bollywood"));
        assert_eq!(rows(&lagaan), vec![1]);
        assert_eq!(lagaan[0].record.title, "Devdas");
        assert_eq!(lagaan[0].score, Some(0.8));
    }

    #[test]
    fn test_loaded_artifacts_size_mismatch_is_rejected() {
        let movies = json_file(serde_json::json!({
            "movie_id": [1, 2, 3],
            "title": ["A", "B", "C"]
        }));
        let similarity = json_file(serde_json::json!([[1.0, 0.5], [0.5, 1.0]]));

        let result = load_engine(&movies, &similarity);
        assert!(matches!(result, Err(AppError::DataLoad(_))));
    }

    #[test]
    fn test_recommend_all_origins() {
        let engine = engine();
        let results = engine.recommend("Avatar", &OriginFilter::All);

        assert_eq!(rows(&results), vec![1, 4, 3, 2, 5]);
        assert_eq!(results[0].record.title, "Devdas");
        assert_eq!(results[0].score, Some(0.9));
    }

    #[test]
    fn test_recommend_filters_after_truncation() {
        let engine = engine();
        let results = engine.recommend("Avatar", &OriginFilter::from("Bollywood"));

        // Devdas, Lagaan and Sholay are in the top five; row 6 is not and stays out
        assert_eq!(rows(&results), vec![1, 3, 5]);
    }

    #[test]
    fn test_recommend_filter_shrinks_result() {
        let engine = engine();
        let results = engine.recommend("Spectre", &OriginFilter::from("bollywood"));

        // top five of Spectre: Lagaan, Devdas, Avatar, Inception, Sholay
        assert_eq!(rows(&results), vec![3, 1, 5]);

        let hollywood = engine.recommend("Spectre", &OriginFilter::from("HOLLYWOOD"));
        assert_eq!(rows(&hollywood), vec![0, 4]);
    }

    #[test]
    fn test_recommend_unknown_title_is_empty() {
        let engine = engine();
        assert!(engine
            .recommend("NonexistentMovie", &OriginFilter::All)
            .is_empty());
    }

    #[test]
    fn test_recommend_duplicate_title_uses_first_row() {
        let engine = engine();
        let first = engine.recommend("Avatar", &OriginFilter::All);
        let again = engine.recommend("Avatar", &OriginFilter::All);
        assert_eq!(first, again);
        assert!(!rows(&first).contains(&0));
    }

    #[test]
    fn test_browse_by_genre() {
        let engine = engine();

        let action = engine.browse_by_genre("Action", &OriginFilter::All, 10);
        assert_eq!(rows(&action), vec![0, 2, 4, 5]);
        assert!(action.iter().all(|m| m.score.is_none()));

        let limited = engine.browse_by_genre("action", &OriginFilter::All, 2);
        assert_eq!(rows(&limited), vec![0, 2]);

        let bollywood = engine.browse_by_genre("ACTION", &OriginFilter::from("Bollywood"), 10);
        assert_eq!(rows(&bollywood), vec![5]);
    }

    #[test]
    fn test_browse_by_genre_no_matches() {
        let engine = engine();
        assert!(engine
            .browse_by_genre("Western", &OriginFilter::All, 10)
            .is_empty());
    }

    #[test]
    fn test_movie_by_row() {
        let engine = engine();
        assert_eq!(engine.movie(1).unwrap().record.title, "Devdas");
        assert!(matches!(
            engine.movie(99),
            Err(AppError::IndexOutOfRange { index: 99, len: 7 })
        ));
    }
}
