//! Locating the cascade classifier file, fetching it when absent.
//!
//! Resolution order:
//! 1. Candidate paths, first existing file wins
//! 2. Download into the default path, creating parent directories
//! 3. A copy bundled with the system OpenCV installation

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tracing::{info, warn};

pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_URL: &str = "https://raw.githubusercontent.com/opencv/opencv/master/data/haarcascades/haarcascade_frontalface_default.xml";
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Directories where OpenCV packages commonly install their cascades.
pub const SYSTEM_CASCADE_DIRS: [&str; 4] = [
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/opt/homebrew/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
];

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("failed to create directory {}: {}", path.display(), source)]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download from {url} returned an empty body")]
    EmptyBody { url: String },
    #[error("failed to write classifier to {}: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no local classifier, fetch failed ({cause}), and no bundled copy found")]
    Unavailable {
        #[source]
        cause: Box<ResourceError>,
    },
}

/// Where a resolved classifier file came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeSource {
    Local,
    Downloaded,
    Bundled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCascade {
    pub path: PathBuf,
    pub source: CascadeSource,
}

#[derive(Clone, Debug)]
pub struct CascadeResolver {
    candidates: Vec<PathBuf>,
    default_path: PathBuf,
    url: String,
    bundled_dirs: Vec<PathBuf>,
    timeout: Duration,
}

impl CascadeResolver {
    /// Resolver rooted at `models_dir`, also probing `../models` and
    /// `./models` the way a checkout-relative layout would.
    pub fn new(models_dir: impl AsRef<Path>) -> Self {
        let models_dir = models_dir.as_ref();
        let default_path = models_dir.join(CASCADE_FILE_NAME);
        let mut candidates = vec![default_path.clone()];
        for extra in [
            Path::new("..").join(DEFAULT_MODELS_DIR),
            Path::new(".").join(DEFAULT_MODELS_DIR),
        ] {
            let path = extra.join(CASCADE_FILE_NAME);
            if !candidates.contains(&path) {
                candidates.push(path);
            }
        }

        Self {
            candidates,
            default_path,
            url: CASCADE_URL.to_string(),
            bundled_dirs: SYSTEM_CASCADE_DIRS.iter().map(PathBuf::from).collect(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_bundled_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.bundled_dirs = dirs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn resolve(&self) -> Result<ResolvedCascade, ResourceError> {
        if let Some(path) = self.candidates.iter().find(|path| path.is_file()) {
            info!("Found cascade at {}", path.display());
            return Ok(ResolvedCascade {
                path: path.clone(),
                source: CascadeSource::Local,
            });
        }

        info!(
            "Downloading cascade classifier from {} to {}",
            self.url,
            self.default_path.display()
        );
        let fetched = self
            .ensure_parent_dir()
            .and_then(|()| download(&self.url, &self.default_path, self.timeout));

        match fetched {
            Ok(()) => {
                info!("Cascade classifier downloaded");
                Ok(ResolvedCascade {
                    path: self.default_path.clone(),
                    source: CascadeSource::Downloaded,
                })
            }
            Err(err) => {
                warn!("Cascade download failed ({err}); looking for a bundled copy");
                match self.bundled() {
                    Some(path) => {
                        info!("Using bundled cascade at {}", path.display());
                        Ok(ResolvedCascade {
                            path,
                            source: CascadeSource::Bundled,
                        })
                    }
                    None => Err(ResourceError::Unavailable {
                        cause: Box::new(err),
                    }),
                }
            }
        }
    }

    fn ensure_parent_dir(&self) -> Result<(), ResourceError> {
        match self.default_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                fs::create_dir_all(parent).map_err(|source| ResourceError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
                info!("Created directory {}", parent.display());
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn bundled(&self) -> Option<PathBuf> {
        self.bundled_dirs
            .iter()
            .map(|dir| dir.join(CASCADE_FILE_NAME))
            .find(|path| path.is_file())
    }
}

fn download(url: &str, dest: &Path, timeout: Duration) -> Result<(), ResourceError> {
    let download_err = |source| ResourceError::Download {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(download_err)?;
    let bytes = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(download_err)?;
    if bytes.is_empty() {
        return Err(ResourceError::EmptyBody {
            url: url.to_string(),
        });
    }

    // Temp file then rename, so an interrupted fetch never leaves a truncated
    // classifier at the lookup path.
    let temp_path = dest.with_extension("part");
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ResourceError::Write { path, source }
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    if let Err(err) = file.write_all(&bytes).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(&temp_path)(err));
    }
    drop(file);

    fs::rename(&temp_path, dest).map_err(write_err(dest))
}
