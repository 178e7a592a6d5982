//! Website metadata lookup for new nav links

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, StatusCode, Url};
use std::fs;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const TITLE_MAX_CHARS: usize = 50;
const DESC_MAX_CHARS: usize = 100;
const FALLBACK_ICON_MAX_CHARS: usize = 10;

const FAVICON_RELS: [&str; 4] = [
    "icon",
    "shortcut icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
];
const FAVICON_PATHS: [&str; 3] = ["/favicon.ico", "/favicon.png", "/apple-touch-icon.png"];

const BUILTIN_ICONS: &[(&str, &str)] = &[
    ("github.com", "github"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("youtube.com", "youtube"),
    ("facebook.com", "facebook"),
    ("linkedin.com", "linkedin"),
    ("instagram.com", "instagram"),
    ("reddit.com", "reddit"),
    ("stackoverflow.com", "stack-overflow"),
    ("medium.com", "medium"),
    ("dev.to", "code"),
    ("codepen.io", "code"),
    ("jsfiddle.net", "code"),
    ("mdn.org", "code"),
    ("developer.mozilla.org", "code"),
    ("vitepress.dev", "book"),
    ("vuejs.org", "code"),
    ("react.dev", "code"),
    ("angular.io", "code"),
    ("nodejs.org", "code"),
    ("npmjs.com", "package"),
];

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref META_RE: Regex = Regex::new(r"(?is)<meta\b[^>]*>").unwrap();
    static ref LINK_TAG_RE: Regex = Regex::new(r"(?is)<link\b[^>]*>").unwrap();
    static ref ATTR_RE: Regex =
        Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .unwrap();
}

/// What a nav card needs to know about a website
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    pub url: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub hostname: String,
}

impl SiteInfo {
    /// Info derived from the URL alone
    pub fn offline(url: &Url) -> Self {
        let hostname = hostname_of(url);
        Self {
            url: url.to_string(),
            title: hostname.clone(),
            description: String::new(),
            icon: default_icon(&hostname),
            hostname,
        }
    }
}

/// Metadata scraped from a page's `<head>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon: Option<String>,
}

/// Host name without a leading `www.`
pub fn hostname_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

pub fn builtin_icon(hostname: &str) -> Option<&'static str> {
    BUILTIN_ICONS
        .iter()
        .find(|(host, _)| *host == hostname)
        .map(|(_, icon)| *icon)
}

/// Built-in icon for the host, else its first label
fn default_icon(hostname: &str) -> String {
    builtin_icon(hostname).map(str::to_string).unwrap_or_else(|| {
        hostname
            .split('.')
            .next()
            .unwrap_or_default()
            .chars()
            .take(FALLBACK_ICON_MAX_CHARS)
            .collect()
    })
}

/// Extract title, description and favicon link from an HTML page
pub fn parse_page(html: &str) -> PageMeta {
    let title = TITLE_RE
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .filter(|t| !t.is_empty());

    let metas: Vec<Vec<(String, String)>> =
        META_RE.find_iter(html).map(|m| attributes(m.as_str())).collect();
    let meta_content = |key: &str, value: &str| {
        metas.iter().find_map(|attrs| {
            let matches = attrs
                .iter()
                .any(|(k, v)| k == key && v.eq_ignore_ascii_case(value));
            if !matches {
                return None;
            }
            attrs
                .iter()
                .find(|(k, _)| k == "content")
                .map(|(_, v)| decode_entities(v))
        })
    };

    let title = title.or_else(|| meta_content("property", "og:title"));
    let description = meta_content("name", "description")
        .filter(|d| !d.is_empty())
        .or_else(|| meta_content("property", "og:description"));

    let links: Vec<Vec<(String, String)>> = LINK_TAG_RE
        .find_iter(html)
        .map(|m| attributes(m.as_str()))
        .collect();
    let favicon = FAVICON_RELS.iter().find_map(|rel| {
        links.iter().find_map(|attrs| {
            let is_rel = attrs
                .iter()
                .any(|(k, v)| k == "rel" && v.trim().eq_ignore_ascii_case(rel));
            if !is_rel {
                return None;
            }
            attrs
                .iter()
                .find(|(k, v)| k == "href" && !v.is_empty())
                .map(|(_, v)| decode_entities(v))
        })
    });

    PageMeta {
        title,
        description,
        favicon,
    }
}

/// Attributes of a single tag, names lowercased
fn attributes(tag: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(tag)
        .map(|c| {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// File name for a downloaded icon: host with non-alphanumerics replaced by
/// `_`, plus the icon's extension (`.ico` when it has none)
pub fn icon_file_name(hostname: &str, icon_url: &Url) -> String {
    let stem: String = hostname
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    let ext = Path::new(icon_url.path())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".ico".to_string());

    format!("{}{}", stem, ext)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Fetch a website's metadata and download its icon into `icons_dir`
///
/// Never fails: when the page cannot be fetched the result is derived from
/// the URL alone.
pub async fn fetch_site_info(url: &Url, icons_dir: &Path) -> SiteInfo {
    match try_fetch(url, icons_dir).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {:#}", url, e);
            SiteInfo::offline(url)
        }
    }
}

async fn try_fetch(url: &Url, icons_dir: &Path) -> Result<SiteInfo> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(PAGE_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    tracing::info!("Fetching {}", url);
    let html = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let hostname = hostname_of(url);
    let page = parse_page(&html);

    let favicon = match page.favicon {
        Some(href) => Some(href),
        None => probe_favicon(&client, url).await,
    };

    let mut icon = None;
    if let Some(icon_url) = favicon.and_then(|href| url.join(&href).ok()) {
        let file_name = icon_file_name(&hostname, &icon_url);
        match download_icon(&client, &icon_url, &icons_dir.join(&file_name)).await {
            Ok(()) => {
                tracing::info!("Saved icon /icons/{}", file_name);
                icon = Some(format!("/icons/{}", file_name));
            }
            Err(e) => tracing::warn!("Failed to download icon {}: {:#}", icon_url, e),
        }
    }

    Ok(SiteInfo {
        url: url.to_string(),
        title: truncate(page.title.as_deref().unwrap_or(&hostname), TITLE_MAX_CHARS),
        description: truncate(page.description.as_deref().unwrap_or_default(), DESC_MAX_CHARS),
        icon: icon.unwrap_or_else(|| default_icon(&hostname)),
        hostname,
    })
}

/// Try the usual favicon locations at the site root
async fn probe_favicon(client: &Client, url: &Url) -> Option<String> {
    for path in FAVICON_PATHS {
        let Ok(probe) = url.join(path) else {
            continue;
        };
        let found = client
            .head(probe)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map(|resp| resp.status() == StatusCode::OK)
            .unwrap_or(false);
        if found {
            return Some(path.to_string());
        }
    }
    None
}

async fn download_icon(client: &Client, icon_url: &Url, dest: &Path) -> Result<()> {
    let bytes = client
        .get(icon_url.clone())
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &bytes).with_context(|| format!("Failed to write {:?}", dest))?;
    Ok(())
}
