// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{info, instrument, warn};

pub mod dataset;

pub use dataset::download_dataset;

/// Where the raw records for this run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A previous run already cached the file.
    Cached(PathBuf),
    /// Fetched during this run and written to the cache path.
    Downloaded(PathBuf),
    /// No usable file; the caller substitutes synthetic records.
    Unavailable,
}

impl Source {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Cached(p) | Source::Downloaded(p) => Some(p),
            Source::Unavailable => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Source::Cached(_) => "cached",
            Source::Downloaded(_) => "downloaded",
            Source::Unavailable => "synthetic",
        }
    }
}

/// HTTP client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")
}

/// Resolve the raw dataset: reuse a non-empty cache at `dest`, otherwise try
/// a single download. Every download failure is logged and mapped to
/// [`Source::Unavailable`]; nothing is raised to the caller.
#[instrument(level = "info", skip(client, dest), fields(dest = %dest.display()))]
pub async fn acquire(client: &Client, url: &str, dest: &Path) -> Source {
    if is_cached(dest) {
        info!("raw dataset already cached; skipping download");
        return Source::Cached(dest.to_path_buf());
    }

    info!("downloading raw dataset");
    match download_dataset(client, url, dest).await {
        Ok(path) => {
            info!(path = %path.display(), "raw dataset downloaded");
            Source::Downloaded(path)
        }
        Err(err) => {
            warn!(error = %format!("{:#}", err), "download failed; using synthetic data");
            Source::Unavailable
        }
    }
}

fn is_cached(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
