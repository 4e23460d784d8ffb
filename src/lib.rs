//! logpage: a tiny personal log
//!
//! A site is one `_config.yml` holding the site metadata and a fixed,
//! ordered catalog of posts. Each post is a markdown file that is fetched on
//! demand, has its relative asset links rewritten, and is rendered to HTML
//! with highlighted code blocks. A searchable list and a detail pane are
//! driven by a [`session::Session`].

pub mod catalog;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod render;
pub mod search;
pub mod server;
pub mod session;

use anyhow::Result;
use std::path::{Path, PathBuf};

use catalog::Catalog;
use content::{Loader, PulldownMarkdown, SiteSource, SyntectHighlighter};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// A log site rooted at a directory
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Posts, as configured
    pub catalog: Catalog,
}

impl Site {
    /// Open a site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::warn!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::from_config(config, base_dir))
    }

    /// Build a site from an already loaded configuration
    pub fn from_config(config: config::SiteConfig, base_dir: PathBuf) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let catalog = Catalog::new(config.posts.clone());
        tracing::debug!("Catalog has {} posts", catalog.len());

        Self {
            config,
            base_dir,
            public_dir,
            catalog,
        }
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Build the post loader for this site's content source and settings
    pub fn loader(&self) -> Result<Loader<SiteSource>> {
        let source = SiteSource::from_config(&self.config, &self.base_dir)?;
        let highlight = &self.config.highlight;
        let loader = Loader::with_renderers(
            source,
            Box::new(PulldownMarkdown::new()),
            Box::new(SyntectHighlighter::with_options(
                highlight.enable,
                highlight.auto_detect,
            )),
        )
        .with_asset_prefix(&self.config.asset_prefix);
        Ok(loader)
    }

    /// Stylesheet for highlighted code
    pub fn stylesheet(&self) -> Result<String> {
        content::highlight_stylesheet(&self.config.highlight.theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_site_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(site.catalog.is_empty());
        assert_eq!(site.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_site_with_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "title: T\nposts:\n  - file: a.md\n    title: A\n    date: \"2026-01-01\"\n",
        )
        .unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.title, "T");
        assert_eq!(site.catalog.len(), 1);
        assert!(site.loader().unwrap().source().local_root().is_some());
    }
}
