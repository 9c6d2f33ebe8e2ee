use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mojflix_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        PosterLookup, PosterService, RecommendationEngine, SimilarityRanker, TmdbPosterProvider,
    },
    store::{ensure_artifact, CatalogStore, PosterCache, SimilarityMatrix},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Artifacts must be on disk before anything is served
    let http_client = reqwest::Client::new();
    let movie_list_path = PathBuf::from(&config.movie_list_path);
    let similarity_path = PathBuf::from(&config.similarity_path);
    ensure_artifact(&http_client, config.movie_list_url.as_deref(), &movie_list_path).await?;
    ensure_artifact(&http_client, config.similarity_url.as_deref(), &similarity_path).await?;

    let ranking_depth = config.ranking_depth;
    let recommendation_count = config.recommendation_count;
    let engine = tokio::task::spawn_blocking(move || {
        let catalog = CatalogStore::load(&movie_list_path)?;
        let matrix = SimilarityMatrix::load(&similarity_path)?;
        let ranker = SimilarityRanker::new(matrix).with_ranking_depth(ranking_depth);
        RecommendationEngine::new(catalog, ranker, recommendation_count)
    })
    .await
    .context("Data loading task failed")??;

    let poster_timeout = Duration::from_millis(config.poster_timeout_ms);
    let lookup = match &config.tmdb_api_key {
        Some(api_key) => {
            let tmdb: Arc<dyn PosterLookup> = Arc::new(TmdbPosterProvider::new(
                api_key.clone(),
                config.tmdb_api_url.clone(),
                config.tmdb_image_base_url.clone(),
                poster_timeout,
            )?);
            Some(tmdb)
        }
        None => None,
    };
    let posters = PosterService::new(
        lookup,
        PosterCache::new(
            config.poster_cache_capacity,
            Duration::from_secs(config.poster_cache_ttl_secs),
        ),
        poster_timeout,
    );

    let state = AppState::new(engine, posters, config.browse_limit);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
