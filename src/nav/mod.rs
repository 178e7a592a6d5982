//! Navigation directory data (`nav/nav-data.json`)

mod siteinfo;

pub use siteinfo::{
    builtin_icon, fetch_site_info, hostname_of, icon_file_name, parse_page, PageMeta, SiteInfo,
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::SiteError;

/// A single link card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    /// Built-in icon name or a `/icons/...` path
    pub icon: String,
    pub link: String,
    pub desc: String,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl NavLink {
    pub fn new(icon: impl Into<String>, link: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            link: link.into(),
            desc: desc.into(),
            extra: IndexMap::new(),
        }
    }

    /// Whether the icon refers to an image file rather than a built-in name
    pub fn has_image_icon(&self) -> bool {
        self.icon.starts_with('/') || self.icon.contains("://")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavCategory {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub links: Vec<NavLink>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Result of adding a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The category already holds a link with the same URL; nothing changed
    AlreadyExists,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavData {
    categories: Vec<NavCategory>,
}

impl NavData {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SiteError::MissingNavFile(path.to_path_buf()).into());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Like [`NavData::load`], but an absent file is an empty directory
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write back as two-space indented JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    pub fn categories(&self) -> &[NavCategory] {
        &self.categories
    }

    pub fn find(&self, name: &str) -> Option<&NavCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn link_count(&self) -> usize {
        self.categories.iter().map(|c| c.links.len()).sum()
    }

    /// Add a link under `category`, creating the category when absent
    ///
    /// `new_title` only applies to a newly created category and falls back
    /// to the category name.
    pub fn add_link(
        &mut self,
        category: &str,
        new_title: Option<&str>,
        link: NavLink,
    ) -> AddOutcome {
        let idx = match self.categories.iter().position(|c| c.name == category) {
            Some(idx) => idx,
            None => {
                let title = new_title
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or(category);
                self.categories.push(NavCategory {
                    name: category.to_string(),
                    title: title.to_string(),
                    links: Vec::new(),
                    extra: IndexMap::new(),
                });
                self.categories.len() - 1
            }
        };

        let cat = &mut self.categories[idx];
        if cat.links.iter().any(|l| l.link == link.link) {
            return AddOutcome::AlreadyExists;
        }
        cat.links.push(link);
        AddOutcome::Added
    }
}

/// Validate user input as an absolute URL, assuming `https://` when no
/// scheme is given. The link is returned as typed apart from the scheme
/// prefix, so duplicates are detected against what is stored.
pub fn normalize_url(input: &str) -> Result<String, SiteError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SiteError::InvalidUrl(input.to_string()));
    }

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&candidate).map_err(|_| SiteError::InvalidUrl(input.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SiteError::InvalidUrl(input.to_string()));
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
  {
    "name": "dev",
    "title": "开发",
    "links": [
      {
        "icon": "github",
        "link": "https://github.com",
        "desc": "Code hosting"
      }
    ]
  }
]"#;

    #[test]
    fn test_load_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav-data.json");
        fs::write(&path, SAMPLE).unwrap();

        let nav = NavData::load(&path).unwrap();
        assert_eq!(nav.categories().len(), 1);
        let dev = nav.find("dev").unwrap();
        assert_eq!(dev.title, "开发");
        assert_eq!(dev.links[0].icon, "github");
        assert!(nav.find("other").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = NavData::load(&dir.path().join("nav.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::MissingNavFile(_))
        ));
        assert!(NavData::load_or_default(&dir.path().join("nav.json"))
            .unwrap()
            .categories()
            .is_empty());
    }

    #[test]
    fn test_add_link_to_existing_category() {
        let mut nav: NavData = serde_json::from_str(SAMPLE).unwrap();
        let outcome = nav.add_link(
            "dev",
            Some("ignored"),
            NavLink::new("code", "https://dev.to", "Community"),
        );
        assert_eq!(outcome, AddOutcome::Added);
        let dev = nav.find("dev").unwrap();
        assert_eq!(dev.title, "开发");
        assert_eq!(dev.links.len(), 2);
    }

    #[test]
    fn test_add_duplicate_link() {
        let mut nav: NavData = serde_json::from_str(SAMPLE).unwrap();
        let before = nav.clone();
        let outcome = nav.add_link("dev", None, NavLink::new("x", "https://github.com", "dup"));
        assert_eq!(outcome, AddOutcome::AlreadyExists);
        assert_eq!(nav, before);
    }

    #[test]
    fn test_add_link_creates_category() {
        let mut nav = NavData::default();
        nav.add_link("tools", None, NavLink::new("code", "https://a.dev", "A"));
        nav.add_link("docs", Some("文档"), NavLink::new("book", "https://b.dev", "B"));
        assert_eq!(nav.find("tools").unwrap().title, "tools");
        assert_eq!(nav.find("docs").unwrap().title, "文档");
        assert_eq!(nav.link_count(), 2);
    }

    #[test]
    fn test_save_pretty_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav/nav-data.json");
        let mut nav: NavData = serde_json::from_str(
            r#"[{"name":"a","title":"A","links":[{"icon":"x","link":"https://x.io","desc":"d","hot":true}]}]"#,
        )
        .unwrap();
        nav.add_link("a", None, NavLink::new("y", "https://y.io", "e"));
        nav.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"name\": \"a\""));
        assert!(raw.contains("\"hot\": true"));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("github.com/rust-lang").unwrap(),
            "https://github.com/rust-lang"
        );
        assert_eq!(
            normalize_url(" http://example.com ").unwrap(),
            "http://example.com"
        );
        assert!(matches!(normalize_url(""), Err(SiteError::InvalidUrl(_))));
        assert!(matches!(
            normalize_url("https://"),
            Err(SiteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_image_icon() {
        assert!(NavLink::new("/icons/a.ico", "https://a", "").has_image_icon());
        assert!(!NavLink::new("github", "https://a", "").has_image_icon());
    }
}
