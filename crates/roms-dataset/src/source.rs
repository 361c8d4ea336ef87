//! Dataset source resolution and the download cache.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DatasetError, DatasetResult};

const USER_AGENT: &str = concat!("roms-dataset/", env!("CARGO_PKG_VERSION"));

/// Where a dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// Filesystem path.
    Local(PathBuf),
    /// HTTP(S) URL, including OPeNDAP endpoints.
    Remote(String),
}

impl SourceLocator {
    /// Classify a location string.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(location.to_string())
        } else {
            Self::Local(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// How to acquire a dataset before opening it.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub locator: SourceLocator,
    /// Materialise a local copy before reading.
    pub download: bool,
    /// Directory for downloaded copies.
    pub cache_dir: Option<PathBuf>,
}

impl SourceSpec {
    pub fn new(location: &str) -> Self {
        Self {
            locator: SourceLocator::parse(location),
            download: false,
            cache_dir: None,
        }
    }

    pub fn with_download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Directory downloaded copies are written to.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("bmi-roms"))
    }

    /// Resolve to something the store can open: a local path, or the URL
    /// itself when no local copy is requested.
    pub fn resolve(&self) -> DatasetResult<PathBuf> {
        match &self.locator {
            SourceLocator::Local(path) => {
                if !path.exists() {
                    return Err(DatasetError::source_unavailable(format!(
                        "file not found: {}",
                        path.display()
                    )));
                }
                Ok(path.clone())
            }
            SourceLocator::Remote(url) if self.download => {
                let dest = self.cache_dir().join(cached_file_name(url));
                if dest.exists() {
                    info!(path = %dest.display(), "Using cached dataset copy");
                    return Ok(dest);
                }
                download_to(url, &dest)?;
                Ok(dest)
            }
            SourceLocator::Remote(url) => Ok(PathBuf::from(url)),
        }
    }
}

/// File name used for a downloaded copy of `url`.
///
/// Uses the last path segment when it looks like a NetCDF file, otherwise a
/// name derived from a hash of the whole URL (OPeNDAP constraint
/// expressions make URLs unique but unusable as file names).
pub fn cached_file_name(url: &str) -> String {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("");

    let has_query = path.len() != url.len();
    if !has_query && (segment.ends_with(".nc") || segment.ends_with(".nc4")) {
        return segment.to_string();
    }

    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    format!("roms_{:016x}.nc", hasher.finish())
}

/// Download `url` into `dest`, writing through a `.partial` file first.
fn download_to(url: &str, dest: &Path) -> DatasetResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = dest.with_extension("partial");

    info!(url = %url, dest = %dest.display(), "Starting dataset download");

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DatasetError::download(url, e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| DatasetError::download(url, e.to_string()))?;

    let mut file = fs::File::create(&temp_path)?;
    let bytes = response
        .copy_to(&mut file)
        .map_err(|e| DatasetError::download(url, e.to_string()))?;
    drop(file);

    // rename fails across filesystems, fall back to copy+delete
    if let Err(e) = fs::rename(&temp_path, dest) {
        debug!(error = %e, "rename failed, copying instead");
        fs::copy(&temp_path, dest)?;
        remove_quietly(&temp_path);
    }

    info!(path = %dest.display(), bytes = bytes, "Download completed");
    Ok(())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "Failed to remove temp file");
        }
    }
}
