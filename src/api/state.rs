use std::sync::Arc;

use crate::services::{PosterService, RecommendationEngine};

/// Shared application state
///
/// Everything behind the `Arc`s is immutable after startup, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub posters: Arc<PosterService>,
    /// Page size used by genre browsing when the request gives none
    pub browse_limit: usize,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, posters: PosterService, browse_limit: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            posters: Arc::new(posters),
            browse_limit,
        }
    }
}
