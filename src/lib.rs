//! newbie-space: static site builder for a personal homepage, navigation
//! directory and markdown blog.
//!
//! Posts are read from markdown files with a small line-oriented front-matter
//! block, rendered with pulldown-cmark and embedded Tera templates, then
//! post-processed into a directory layout suitable for static hosting.

pub mod commands;
pub mod config;
pub mod content;
pub mod enhance;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod nav;
pub mod postprocess;
pub mod server;
pub mod templates;
pub mod timestamps;

pub use error::SiteError;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Name of the site configuration file at the site root
pub const CONFIG_FILE: &str = "site.yml";

/// The site being built
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts directory
    pub posts_dir: PathBuf,
    /// Files copied verbatim into the output
    pub static_dir: PathBuf,
    /// Output directory
    pub public_dir: PathBuf,
    /// Navigation data file
    pub nav_file: PathBuf,
    /// Generated git timestamp file
    pub timestamps_file: PathBuf,
}

impl Site {
    /// Load a site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a site from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        Self {
            posts_dir: base_dir.join(&config.posts_dir),
            static_dir: base_dir.join(&config.static_dir),
            public_dir: base_dir.join(&config.public_dir),
            nav_file: base_dir.join(&config.nav_file),
            timestamps_file: base_dir.join(&config.timestamps_file),
            config,
            base_dir,
        }
    }

    /// Override the deployment base path
    pub fn set_base(&mut self, base: &str) {
        self.config.base = config::normalize_base(base);
    }

    /// Render every route into the output directory
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Render and post-process the site
    pub fn build(&self, git_timestamps: bool) -> Result<()> {
        commands::build::run(self, git_timestamps)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
