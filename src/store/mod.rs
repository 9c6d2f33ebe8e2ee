pub mod artifacts;
pub mod cache;
pub mod catalog;
pub mod similarity;

pub use artifacts::ensure_artifact;
pub use cache::PosterCache;
pub use catalog::{CatalogStore, Column};
pub use similarity::SimilarityMatrix;
