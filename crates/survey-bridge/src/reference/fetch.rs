//! Downloads the published reference files into the resources directory.

use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

pub const IMD_LOOKUP_URL: &str =
    "https://raw.githubusercontent.com/mysociety/composite_uk_imd/master/composite_lookups/imd_lsoa.json";
pub const LOCAL_AUTHORITY_URL: &str = "https://raw.githubusercontent.com/ajparsons/uk_local_authority_names_and_codes/master/uk_local_authorities.csv";
pub const META_CATEGORY_URL: &str =
    "https://raw.githubusercontent.com/mysociety/fms_meta_categories/master/full_table.csv";
pub const RURALITY_URL: &str =
    "https://raw.githubusercontent.com/mysociety/uk_ruc/master/output/composite_ruc.csv";

pub const RESOURCE_URLS: [&str; 4] = [
    IMD_LOOKUP_URL,
    LOCAL_AUTHORITY_URL,
    META_CATEGORY_URL,
    RURALITY_URL,
];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("resource URL {url} has no file name")]
    InvalidUrl { url: String },
    #[error("failed to download {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File name a resource is stored under: the last segment of its URL path.
pub fn resource_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}

/// Downloads the four published reference files into `dir`.
pub async fn fetch_resources(
    client: &reqwest::Client,
    dir: &Path,
) -> Result<Vec<PathBuf>, FetchError> {
    fetch_all(client, dir, &RESOURCE_URLS).await
}

/// Downloads each URL into `dir`, creating the directory when needed.
pub async fn fetch_all(
    client: &reqwest::Client,
    dir: &Path,
    urls: &[&str],
) -> Result<Vec<PathBuf>, FetchError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| FetchError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut written = Vec::with_capacity(urls.len());
    for &url in urls {
        let file_name = resource_file_name(url).ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        info!(%url, file = %file_name, "fetching reference resource");

        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let response = client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(request_error)?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, &body)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;
        written.push(path);
    }

    Ok(written)
}
