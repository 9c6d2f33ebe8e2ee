use reqwest::Client as HttpClient;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// Makes sure a data artifact exists on local disk
///
/// Existing files are left untouched. Otherwise the artifact is streamed from
/// `url` into a `.part` sibling and renamed into place once complete, so an
/// interrupted download never leaves a truncated artifact behind.
pub async fn ensure_artifact(
    http_client: &HttpClient,
    url: Option<&str>,
    destination: &Path,
) -> AppResult<()> {
    if tokio::fs::try_exists(destination).await.unwrap_or(false) {
        tracing::debug!(path = %destination.display(), "Artifact already present");
        return Ok(());
    }

    let url = url.ok_or_else(|| {
        AppError::DataLoad(format!(
            "Artifact {} is missing and no download URL is configured",
            destination.display()
        ))
    })?;

    tracing::info!(path = %destination.display(), "Downloading required artifact");

    let partial = partial_path(destination);
    match download(http_client, url, &partial).await {
        Ok(bytes) => {
            tokio::fs::rename(&partial, destination).await.map_err(|e| {
                AppError::DataLoad(format!(
                    "Cannot move downloaded artifact to {}: {}",
                    destination.display(),
                    e
                ))
            })?;

            tracing::info!(
                path = %destination.display(),
                bytes = bytes,
                "Artifact downloaded"
            );
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            tracing::error!(
                path = %destination.display(),
                error = %e,
                "Artifact download failed"
            );
            Err(e)
        }
    }
}

async fn download(http_client: &HttpClient, url: &str, target: &Path) -> AppResult<u64> {
    let mut response = http_client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::DataLoad(format!("Download request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(AppError::DataLoad(format!(
            "Download returned status {}",
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(target).await.map_err(|e| {
        AppError::DataLoad(format!("Cannot create {}: {}", target.display(), e))
    })?;

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| AppError::DataLoad(format!("Download interrupted: {}", e)))?
    {
        file.write_all(&chunk).await.map_err(|e| {
            AppError::DataLoad(format!("Cannot write {}: {}", target.display(), e))
        })?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| AppError::DataLoad(format!("Cannot flush {}: {}", target.display(), e)))?;

    Ok(written)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
