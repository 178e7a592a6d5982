//! Built-in site templates using the Tera template engine
//!
//! Every page template is embedded in the binary, so a site needs no theme
//! directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostMeta;
use crate::helpers::{self, url_for};
use crate::nav::{NavCategory, NavData};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a renderer whose `url_for` filter prefixes paths with `base`
    pub fn new(base: &str) -> Result<Self> {
        let mut tera = Tera::default();

        // Page content and TOC are already HTML; text fields go through
        // `escape_html` explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("nav.html", include_str!("site/nav.html")),
            ("posts.html", include_str!("site/posts.html")),
            ("post.html", include_str!("site/post.html")),
            ("projects.html", include_str!("site/projects.html")),
            ("atom.xml", include_str!("site/atom.xml")),
            (
                "partials/post_item.html",
                include_str!("site/partials/post_item.html"),
            ),
            (
                "partials/project_card.html",
                include_str!("site/partials/project_card.html"),
            ),
        ])?;

        let base = base.to_string();
        tera.register_filter(
            "url_for",
            move |value: &tera::Value, _: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url_for", "value", String, value);
                Ok(tera::Value::String(url_for(&base, &path)))
            },
        );
        tera.register_filter("escape_html", escape_html_filter);
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("post_date", post_date_filter);
        tera.register_filter("timestamp", timestamp_filter);
        tera.register_filter("xml_escape", xml_escape_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: HTML-escape text, numbers are printed as is
///
/// Unlike the built-in `escape`, slashes are left alone so URLs stay
/// readable in attributes.
fn escape_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = match value {
        tera::Value::String(s) => helpers::html_escape(s),
        other => helpers::html_escape(&other.to_string()),
    };
    Ok(tera::Value::String(s))
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };
    Ok(tera::Value::String(helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Tera filter: front-matter date in display form
fn post_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("post_date", "value", String, value);
    Ok(tera::Value::String(helpers::format_post_date(&s)))
}

/// Tera filter: git timestamp in display form
fn timestamp_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("timestamp", "value", String, value);
    Ok(tera::Value::String(helpers::format_timestamp(&s)))
}

fn xml_escape_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("xml_escape", "value", String, value);
    Ok(tera::Value::String(helpers::escape_xml(&s)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub base: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            base: config.base.clone(),
        }
    }
}

/// Top navigation entry
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
    pub active: bool,
}

/// Site sections, `current` marks the active one
pub fn menu(current: &str) -> Vec<MenuItem> {
    [("首页", "/"), ("导航", "/nav/"), ("博客", "/posts"), ("项目", "/projects")]
        .iter()
        .map(|(name, path)| MenuItem {
            name: name.to_string(),
            path: path.to_string(),
            active: *path == current,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    #[serde(flatten)]
    pub meta: PostMeta,
    pub path: String,
}

impl From<&PostMeta> for PostData {
    fn from(meta: &PostMeta) -> Self {
        Self {
            path: meta.route(),
            meta: meta.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

impl From<&PostMeta> for NavPost {
    fn from(meta: &PostMeta) -> Self {
        Self {
            title: meta.title.clone(),
            path: meta.route(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLinkData {
    pub link: String,
    pub desc: String,
    /// Built-in icon name, empty when `icon_src` is set
    pub icon: String,
    /// Downloaded icon image path
    pub icon_src: Option<String>,
    pub host: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavCategoryData {
    pub name: String,
    pub title: String,
    pub anchor: String,
    pub links: Vec<NavLinkData>,
}

impl From<&NavCategory> for NavCategoryData {
    fn from(cat: &NavCategory) -> Self {
        let links = cat
            .links
            .iter()
            .map(|l| {
                let host = reqwest::Url::parse(&l.link)
                    .ok()
                    .map(|u| crate::nav::hostname_of(&u))
                    .unwrap_or_else(|| l.link.clone());
                let (icon, icon_src) = if l.has_image_icon() {
                    (String::new(), Some(l.icon.clone()))
                } else {
                    (l.icon.clone(), None)
                };
                NavLinkData {
                    link: l.link.clone(),
                    desc: l.desc.clone(),
                    icon,
                    icon_src,
                    host,
                }
            })
            .collect();

        let anchor = match slug::slugify(&cat.name) {
            s if s.is_empty() => helpers::encode_url(&cat.name),
            s => s,
        };

        Self {
            name: cat.name.clone(),
            title: cat.title.clone(),
            anchor,
            links,
        }
    }
}

pub fn nav_categories(nav: &NavData) -> Vec<NavCategoryData> {
    nav.categories().iter().map(NavCategoryData::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub title: String,
    pub url: String,
    pub updated: String,
    pub published: String,
    pub summary: String,
}
