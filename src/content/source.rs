//! Where raw post content comes from

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::SiteConfig;

/// Failure to obtain a post's raw content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The content host answered with a non-success status
    #[error("Cannot load {source_ref} ({status})")]
    HttpStatus { source_ref: String, status: u16 },

    /// The request could not complete
    #[error("Cannot load {source_ref}: {message}")]
    Network { source_ref: String, message: String },
}

impl LoadError {
    /// Short machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            LoadError::HttpStatus { .. } => "http-status",
            LoadError::Network { .. } => "network",
        }
    }

    /// Status code or transport message
    pub fn detail(&self) -> String {
        match self {
            LoadError::HttpStatus { status, .. } => status.to_string(),
            LoadError::Network { message, .. } => message.clone(),
        }
    }

    fn network(source_ref: &str, message: impl ToString) -> Self {
        LoadError::Network {
            source_ref: source_ref.to_string(),
            message: message.to_string(),
        }
    }
}

/// Fetches the raw text of a post, always bypassing caches
pub trait ContentSource: Send + Sync {
    fn fetch(&self, source_ref: &str) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Reads posts from a local directory
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for FsSource {
    async fn fetch(&self, source_ref: &str) -> Result<String, LoadError> {
        let relative = source_ref.trim_start_matches('/');
        if Path::new(relative)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            // Nothing outside the content root is served
            return Err(LoadError::HttpStatus {
                source_ref: source_ref.to_string(),
                status: 403,
            });
        }

        let path = self.root.join(relative);
        tracing::debug!("Reading {:?}", path);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::HttpStatus {
                source_ref: source_ref.to_string(),
                status: 404,
            }),
            Err(e) => Err(LoadError::network(source_ref, e)),
        }
    }
}

/// Fetches posts over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: reqwest::Url::parse(&base)?,
        })
    }
}

impl ContentSource for HttpSource {
    async fn fetch(&self, source_ref: &str) -> Result<String, LoadError> {
        let url = self
            .base
            .join(source_ref)
            .map_err(|e| LoadError::network(source_ref, e))?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| LoadError::network(source_ref, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                source_ref: source_ref.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| LoadError::network(source_ref, e))
    }
}

/// The content source a site is configured with
#[derive(Debug, Clone)]
pub enum SiteSource {
    Fs(FsSource),
    Http(HttpSource),
}

impl SiteSource {
    /// Build from `content_root`, resolving local paths against `base_dir`
    pub fn from_config(config: &SiteConfig, base_dir: &Path) -> anyhow::Result<Self> {
        if config.is_remote() {
            let timeout = config.fetch_timeout_secs.map(Duration::from_secs);
            Ok(SiteSource::Http(HttpSource::new(&config.content_root, timeout)?))
        } else {
            Ok(SiteSource::Fs(FsSource::new(base_dir.join(&config.content_root))))
        }
    }

    /// Local directory the posts live in, if any
    pub fn local_root(&self) -> Option<&Path> {
        match self {
            SiteSource::Fs(fs) => Some(fs.root()),
            SiteSource::Http(_) => None,
        }
    }
}

impl ContentSource for SiteSource {
    async fn fetch(&self, source_ref: &str) -> Result<String, LoadError> {
        match self {
            SiteSource::Fs(fs) => fs.fetch(source_ref).await,
            SiteSource::Http(http) => http.fetch(source_ref).await,
        }
    }
}
