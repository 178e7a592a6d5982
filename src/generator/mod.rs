//! Generator module - renders every route to static HTML using built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Datelike;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::content::{PostIndex, PostLoader, PostMeta};
use crate::enhance::{SITE_SCRIPT, SITE_STYLE};
use crate::helpers::{
    full_url_for, post_date_rfc3339, rebase_root_urls, strip_invalid_xml_chars,
};
use crate::nav::NavData;
use crate::templates::{
    menu, nav_categories, ConfigData, FeedEntry, NavPost, PostData, TemplateRenderer,
};
use crate::timestamps::to_iso_utc;
use crate::Site;

/// Number of posts in the Atom feed
const FEED_LIMIT: usize = 20;

/// Routes to render, fixed pages first then posts in index order
pub fn static_routes(posts: &PostIndex) -> Vec<String> {
    let mut routes: Vec<String> = ["/", "/nav/", "/posts", "/projects"]
        .iter()
        .map(|r| r.to_string())
        .collect();
    routes.extend(posts.all().iter().map(|p| p.route()));
    routes
}

/// Flat output file for a route
///
/// `/` and routes ending in `/` become `index.html` files; anything else
/// becomes `<route>.html`, to be restructured into a directory later.
pub fn route_output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else if route.ends_with('/') {
        Path::new(trimmed).join("index.html")
    } else {
        PathBuf::from(format!("{}.html", trimmed))
    }
}

/// Static site generator using Tera templates
pub struct Generator<'a> {
    site: &'a Site,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(site: &'a Site) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config.base)?;
        Ok(Self { site, renderer })
    }

    /// Generate the entire site, returning the written files relative to
    /// the output directory
    pub fn generate(
        &self,
        loader: &PostLoader,
        posts: &PostIndex,
        nav: &NavData,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.site.public_dir)?;

        self.copy_static_files()?;
        self.write_builtin_assets()?;

        let mut written = Vec::new();
        for route in static_routes(posts) {
            let html = self.render_route(&route, loader, posts, nav)?;
            let rel = route_output_path(&route);
            self.write(&rel, &html)?;
            written.push(rel);
        }

        let feed = self.render_feed(posts)?;
        self.write(Path::new("atom.xml"), &feed)?;
        written.push(PathBuf::from("atom.xml"));

        tracing::info!("Generated {} routes", written.len() - 1);
        Ok(written)
    }

    fn render_route(
        &self,
        route: &str,
        loader: &PostLoader,
        posts: &PostIndex,
        nav: &NavData,
    ) -> Result<String> {
        match route {
            "/" => self.render_home(posts, nav),
            "/nav/" => self.render_nav(nav),
            "/posts" => self.render_posts(posts),
            "/projects" => self.render_projects(),
            _ => {
                let slug = route.trim_start_matches("/posts/");
                let meta = posts
                    .by_slug(slug)
                    .with_context(|| format!("No post for route {}", route))?;
                self.render_post(loader, posts, meta)
            }
        }
    }

    /// Context shared by every page
    fn create_base_context(&self, route: &str, page_kind: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&self.site.config));
        context.insert("menu", &menu(route));
        context.insert("page_kind", page_kind);
        context.insert("route", route);
        context.insert("year", &chrono::Local::now().year());
        context
    }

    fn render_home(&self, posts: &PostIndex, nav: &NavData) -> Result<String> {
        let mut context = self.create_base_context("/", "home");
        let recent: Vec<PostData> = posts
            .all()
            .iter()
            .take(self.site.config.recent_posts)
            .map(PostData::from)
            .collect();
        context.insert("recent_posts", &recent);
        context.insert("post_count", &posts.len());
        context.insert("link_count", &nav.link_count());
        context.insert("projects", &self.site.config.projects);
        self.renderer.render("home.html", &context)
    }

    fn render_nav(&self, nav: &NavData) -> Result<String> {
        let mut context = self.create_base_context("/nav/", "nav");
        context.insert("categories", &nav_categories(nav));
        self.renderer.render("nav.html", &context)
    }

    fn render_posts(&self, posts: &PostIndex) -> Result<String> {
        let mut context = self.create_base_context("/posts", "posts");
        let list: Vec<PostData> = posts.all().iter().map(PostData::from).collect();
        context.insert("posts", &list);
        context.insert("tags", &posts.tags());
        self.renderer.render("posts.html", &context)
    }

    fn render_projects(&self) -> Result<String> {
        let mut context = self.create_base_context("/projects", "projects");
        context.insert("projects", &self.site.config.projects);
        self.renderer.render("projects.html", &context)
    }

    fn render_post(
        &self,
        loader: &PostLoader,
        posts: &PostIndex,
        meta: &PostMeta,
    ) -> Result<String> {
        let post = loader.load_post(meta)?;
        let route = meta.route();

        // Posts belong to the blog section in the menu
        let mut context = self.create_base_context("/posts", "post");
        context.insert("route", &route);
        context.insert("post", &PostData::from(&post.meta));
        context.insert(
            "content",
            &rebase_root_urls(&post.content, &self.site.config.base),
        );
        context.insert("toc", &post.toc);
        context.insert("prev", &meta.prev(posts.all()).map(NavPost::from));
        context.insert("next", &meta.next(posts.all()).map(NavPost::from));
        self.renderer.render("post.html", &context)
    }

    /// Atom feed of the most recent posts
    fn render_feed(&self, posts: &PostIndex) -> Result<String> {
        let config = &self.site.config;
        let site_url = config.url.trim_end_matches('/');
        let now = to_iso_utc(chrono::Utc::now());

        let entries: Vec<FeedEntry> = posts
            .all()
            .iter()
            .take(FEED_LIMIT)
            .map(|p| {
                let published = post_date_rfc3339(&p.date)
                    .or_else(|| p.created.clone())
                    .unwrap_or_else(|| now.clone());
                let summary = p.excerpt.as_deref().unwrap_or_default();
                FeedEntry {
                    title: p.title.clone(),
                    url: full_url_for(site_url, &config.base, &p.route()),
                    updated: p.last_modified.clone().unwrap_or_else(|| published.clone()),
                    published,
                    summary: strip_invalid_xml_chars(summary),
                }
            })
            .collect();

        let mut context = Context::new();
        context.insert("config", &ConfigData::from(config));
        context.insert("entries", &entries);
        context.insert("updated", &now);
        context.insert("home_url", &full_url_for(site_url, &config.base, "/"));
        context.insert(
            "feed_url",
            &full_url_for(site_url, &config.base, "/atom.xml"),
        );
        self.renderer.render("atom.xml", &context)
    }

    fn write(&self, rel: &Path, content: &str) -> Result<()> {
        let path = self.site.public_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::debug!("Wrote {:?}", rel);
        Ok(())
    }

    /// Built-in stylesheet and script
    fn write_builtin_assets(&self) -> Result<()> {
        self.write(Path::new("assets/css/site.css"), SITE_STYLE)?;
        self.write(Path::new("assets/js/site.js"), SITE_SCRIPT)?;
        Ok(())
    }

    /// Copy files from the static directory verbatim
    fn copy_static_files(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        tracing::info!("Copied {} static files", copied);
        Ok(())
    }
}
