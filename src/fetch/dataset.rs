use anyhow::{bail, Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// Download the raw dataset at `url_str` and save it to `dest`.
/// The body is written to a sibling temp file first, then renamed.
/// Returns the full path of the saved file.
pub async fn download_dataset(
    client: &Client,
    url_str: &str,
    dest: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest = dest.as_ref();
    let url = Url::parse(url_str).with_context(|| format!("parsing dataset URL {}", url_str))?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        bail!("{} returned an empty body", url);
    }

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    let tmp_path = dest.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp_path, &bytes)
        .await
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    fs::rename(&tmp_path, dest)
        .await
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), dest.display()))?;

    Ok(dest.to_path_buf())
}
