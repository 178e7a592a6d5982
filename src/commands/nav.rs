//! Maintain the navigation directory

use anyhow::Result;
use reqwest::Url;
use std::path::Path;

use crate::nav::{fetch_site_info, normalize_url, AddOutcome, NavData, NavLink, SiteInfo};
use crate::{Site, SiteError};

/// Options of `nav add`
#[derive(Debug, Clone)]
pub struct AddOptions<'a> {
    pub url: &'a str,
    pub category: &'a str,
    /// Title for a category that does not exist yet
    pub title: Option<&'a str>,
    pub desc: Option<&'a str>,
    /// Look up title, description and favicon over the network
    pub fetch: bool,
}

/// Add a link to the nav data file
///
/// Duplicate links (same URL in the same category) leave the file as is.
pub async fn add(site: &Site, opts: &AddOptions<'_>) -> Result<AddOutcome> {
    let link = normalize_url(opts.url)?;
    let url = Url::parse(&link).map_err(|_| SiteError::InvalidUrl(opts.url.to_string()))?;

    let info = if opts.fetch {
        tracing::info!("Fetching site info for {}", link);
        fetch_site_info(&url, &site.static_dir.join("icons")).await
    } else {
        SiteInfo::offline(&url)
    };

    let entry = link_from_info(&link, &info, opts.desc);
    let outcome = add_to_file(&site.nav_file, opts.category, opts.title, entry)?;

    match outcome {
        AddOutcome::Added => println!("Added {} to {}", link, opts.category),
        AddOutcome::AlreadyExists => {
            println!("{} already exists in {}, nothing changed", link, opts.category)
        }
    }
    Ok(outcome)
}

/// Build a link card; the description falls back to the page description,
/// then the page title
pub fn link_from_info(link: &str, info: &SiteInfo, desc: Option<&str>) -> NavLink {
    let desc = desc
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .or_else(|| Some(info.description.as_str()).filter(|d| !d.is_empty()))
        .unwrap_or(info.title.as_str());
    NavLink::new(info.icon.clone(), link, desc)
}

/// Add `link` to the nav file, creating the file when missing
pub fn add_to_file(
    path: &Path,
    category: &str,
    title: Option<&str>,
    link: NavLink,
) -> Result<AddOutcome> {
    let mut nav = NavData::load_or_default(path)?;
    let outcome = nav.add_link(category, title, link);
    if outcome == AddOutcome::Added {
        nav.save(path)?;
        tracing::debug!("Saved {:?}", path);
    }
    Ok(outcome)
}

/// Print every category and link
pub fn list(site: &Site) -> Result<()> {
    crate::commands::list::run(site, "nav")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_add_offline() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let opts = AddOptions {
            url: "github.com/rust-lang",
            category: "dev",
            title: Some("开发工具"),
            desc: None,
            fetch: false,
        };

        assert_eq!(add(&site, &opts).await.unwrap(), AddOutcome::Added);
        assert_eq!(add(&site, &opts).await.unwrap(), AddOutcome::AlreadyExists);

        let nav = NavData::load(&site.nav_file).unwrap();
        let cat = nav.find("dev").unwrap();
        assert_eq!(cat.title, "开发工具");
        assert_eq!(cat.links.len(), 1);
        assert_eq!(cat.links[0].link, "https://github.com/rust-lang");
        assert_eq!(cat.links[0].icon, "github");
        assert_eq!(cat.links[0].desc, "github.com");
    }

    #[tokio::test]
    async fn test_add_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let opts = AddOptions {
            url: "   ",
            category: "dev",
            title: None,
            desc: None,
            fetch: false,
        };
        let err = add(&site, &opts).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::InvalidUrl(_))
        ));
        assert!(!site.nav_file.exists());
    }

    #[test]
    fn test_link_from_info_desc_fallback() {
        let url = Url::parse("https://docs.rs").unwrap();
        let mut info = SiteInfo::offline(&url);
        info.title = "Docs.rs".to_string();

        assert_eq!(link_from_info("https://docs.rs", &info, Some("Crate docs")).desc, "Crate docs");
        assert_eq!(link_from_info("https://docs.rs", &info, None).desc, "Docs.rs");

        info.description = "Documentation host".to_string();
        assert_eq!(link_from_info("https://docs.rs", &info, Some(" ")).desc, "Documentation host");
    }

    #[test]
    fn test_add_to_file_keeps_other_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        fs::write(
            &path,
            r#"[{"name":"a","title":"A","links":[],"color":"red"}]"#,
        )
        .unwrap();

        let link = NavLink::new("code", "https://dev.to", "Dev");
        add_to_file(&path, "b", None, link).unwrap();

        let nav = NavData::load(&path).unwrap();
        assert_eq!(nav.categories().len(), 2);
        assert_eq!(nav.find("b").unwrap().title, "b");
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"color\": \"red\""));
    }
}
