//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::catalog::PostDescriptor;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Content
    /// Directory (relative to the site root) or `http(s)://` base URL the
    /// post files are fetched from
    pub content_root: String,
    /// Prefix that asset references relative to a post are rewritten to
    pub asset_prefix: String,
    /// Where `new` puts fresh post files
    pub posts_dir: String,
    /// Output directory for `generate`
    pub public_dir: String,
    /// Optional timeout for remote fetches, in seconds
    pub fetch_timeout_secs: Option<u64>,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Catalog
    #[serde(default)]
    pub posts: Vec<PostDescriptor>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Log".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            content_root: ".".to_string(),
            asset_prefix: "log/".to_string(),
            posts_dir: "log/posts".to_string(),
            public_dir: "public".to_string(),
            fetch_timeout_secs: None,

            highlight: HighlightConfig::default(),

            posts: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write the configuration back to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), content)?;
        tracing::debug!("Saved config to {:?}", path.as_ref());
        Ok(())
    }

    /// Whether posts are fetched over HTTP rather than read from disk
    pub fn is_remote(&self) -> bool {
        self.content_root.starts_with("http://") || self.content_root.starts_with("https://")
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// Guess the language of code blocks without a recognized hint
    pub auto_detect: bool,
    /// syntect theme used for the generated stylesheet
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            auto_detect: true,
            theme: "InspiredGitHub".to_string(),
        }
    }
}
