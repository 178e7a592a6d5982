//! Site configuration (site.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    /// Author used for posts without an `author` field
    pub default_author: String,
    pub language: String,

    // URL
    pub url: String,
    /// Path prefix the site is deployed under, always ends with '/'
    pub base: String,

    // Directory
    pub posts_dir: String,
    pub static_dir: String,
    pub public_dir: String,
    pub nav_file: String,
    pub timestamps_file: String,

    // Writing
    pub excerpt_length: usize,
    pub recent_posts: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Home page
    #[serde(default)]
    pub projects: Vec<Project>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Newbie Space".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "Newbie Space".to_string(),
            default_author: "Newbie Space".to_string(),
            language: "zh-CN".to_string(),

            url: "http://localhost:4000".to_string(),
            base: "/".to_string(),

            posts_dir: "content/posts".to_string(),
            static_dir: "public".to_string(),
            public_dir: "dist".to_string(),
            nav_file: "nav/nav-data.json".to_string(),
            timestamps_file: "data/git-timestamps.json".to_string(),

            excerpt_length: 200,
            recent_posts: 5,
            highlight: HighlightConfig::default(),

            projects: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        config.base = normalize_base(&config.base);
        Ok(config)
    }

    /// Pick the deployment base: explicit flag, then `VITE_BASE_URL`, then
    /// `BASE_URL`, then the configured value
    pub fn resolve_base(&self, flag: Option<&str>) -> String {
        self.resolve_base_with(flag, |key| std::env::var(key).ok())
    }

    /// Same as [`resolve_base`](Self::resolve_base) with an injectable
    /// environment lookup
    pub fn resolve_base_with<F>(&self, flag: Option<&str>, env: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |b: &String| !b.trim().is_empty();
        let chosen = flag
            .map(str::to_string)
            .filter(non_empty)
            .or_else(|| env("VITE_BASE_URL").filter(non_empty))
            .or_else(|| env("BASE_URL").filter(non_empty))
            .unwrap_or_else(|| self.base.clone());
        normalize_base(&chosen)
    }

    /// Find a project by id
    pub fn project_by_id(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}

/// Force a base path into the `/segment/` form
pub fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_number: false,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// A showcased project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub stars: Stars,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub stack: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "demoUrl", alias = "demo_url")]
    pub demo_url: Option<String>,
}

/// Star count, or a label such as "New"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stars {
    Count(u64),
    Label(String),
}

impl Default for Stars {
    fn default() -> Self {
        Stars::Count(0)
    }
}

impl std::fmt::Display for Stars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stars::Count(n) => write!(f, "{}", n),
            Stars::Label(s) => f.write_str(s),
        }
    }
}
