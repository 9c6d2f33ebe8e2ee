pub mod posters;
pub mod ranker;
pub mod recommendations;
pub mod title_search;

pub use posters::{PosterLookup, PosterService, TmdbPosterProvider};
pub use ranker::SimilarityRanker;
pub use recommendations::{RankedMovie, RecommendationEngine, FEATURED_GENRES};
