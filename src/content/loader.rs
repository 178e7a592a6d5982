//! Post loader - discovers markdown posts and derives their metadata

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::{calculate_read_time, extract_excerpt, extract_title, FrontMatter, MarkdownRenderer};
use super::{Post, PostMeta};
use crate::helpers::toc;
use crate::timestamps::GitTimestamps;
use crate::Site;

/// Why a markdown file was left out of the post index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    MissingDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingTitle => {
                f.write_str("missing a title (the markdown should contain a # heading)")
            }
            SkipReason::MissingDate => f.write_str("missing the required front-matter field (date)"),
        }
    }
}

/// Derive post metadata from a markdown source
pub fn build_meta(
    slug: &str,
    content: &str,
    default_author: &str,
    excerpt_length: usize,
    timestamps: &GitTimestamps,
) -> std::result::Result<PostMeta, SkipReason> {
    let (fm, _) = FrontMatter::parse(content);

    let title = extract_title(content).ok_or(SkipReason::MissingTitle)?;
    let date = fm.date().ok_or(SkipReason::MissingDate)?.to_string();
    let stamps = timestamps.get(slug);

    Ok(PostMeta {
        slug: slug.to_string(),
        title,
        date,
        author: fm.author().unwrap_or(default_author).to_string(),
        excerpt: extract_excerpt(content, excerpt_length),
        read_time: calculate_read_time(content),
        tags: fm.tags(),
        cover: fm.cover().map(str::to_string),
        last_modified: stamps.map(|t| t.last_modified.clone()),
        created: stamps.map(|t| t.created.clone()),
    })
}

/// Sort posts newest first; dates compare as plain strings
pub fn sort_posts(posts: &mut [PostMeta]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}

/// Loads posts from the configured posts directory
pub struct PostLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
    timestamps: GitTimestamps,
}

impl<'a> PostLoader<'a> {
    /// Create a new loader, reading the git timestamp file if present
    pub fn new(site: &'a Site) -> Result<Self> {
        let renderer = MarkdownRenderer::with_options(
            &site.config.highlight.theme,
            site.config.highlight.line_number,
        );
        let timestamps = GitTimestamps::load(&site.timestamps_file)?;
        Ok(Self {
            site,
            renderer,
            timestamps,
        })
    }

    /// Markdown files directly under the posts directory
    pub fn post_files(&self) -> Result<Vec<PathBuf>> {
        if !self.site.posts_dir.exists() {
            tracing::warn!("Posts directory {:?} does not exist", self.site.posts_dir);
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*.md",
            glob::Pattern::escape(&self.site.posts_dir.to_string_lossy())
        );
        let mut files: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Unreadable entry in posts directory: {}", e);
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Load metadata of every valid post, newest first
    pub fn load_posts(&self) -> Result<PostIndex> {
        let mut posts = Vec::new();

        for path in self.post_files()? {
            let Some(slug) = slug_of(&path) else {
                continue;
            };

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("[posts] failed to read {:?}: {}", path, e);
                    continue;
                }
            };

            match build_meta(
                &slug,
                &content,
                &self.site.config.default_author,
                self.site.config.excerpt_length,
                &self.timestamps,
            ) {
                Ok(meta) => posts.push(meta),
                Err(reason) => tracing::warn!("[posts] skipping {}: {}", slug, reason),
            }
        }

        sort_posts(&mut posts);
        Ok(PostIndex::new(posts))
    }

    /// Render the full post for a metadata entry
    pub fn load_post(&self, meta: &PostMeta) -> Result<Post> {
        let path = self.site.posts_dir.join(format!("{}.md", meta.slug));
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let (_, body) = FrontMatter::parse(&content);

        let html = self.renderer.render_post(body)?;
        let toc_html = toc(&html, 3);

        Ok(Post {
            meta: meta.clone(),
            content: html,
            toc: toc_html,
        })
    }
}

fn slug_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Post metadata in index order (newest first)
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    posts: Vec<PostMeta>,
}

impl PostIndex {
    pub fn new(posts: Vec<PostMeta>) -> Self {
        Self { posts }
    }

    pub fn all(&self) -> &[PostMeta] {
        &self.posts
    }

    pub fn by_slug(&self, slug: &str) -> Option<&PostMeta> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Tag usage counts, most used first
    pub fn tags(&self) -> IndexMap<String, usize> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for post in &self.posts {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        counts.sort_by(|ka, a, kb, b| b.cmp(a).then_with(|| ka.cmp(kb)));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::timestamps::FileTimestamps;

    fn site_in(dir: &Path) -> Site {
        Site::with_config(dir.to_path_buf(), SiteConfig::default())
    }

    fn write_post(site: &Site, name: &str, content: &str) {
        fs::create_dir_all(&site.posts_dir).unwrap();
        fs::write(site.posts_dir.join(name), content).unwrap();
    }

    #[test]
    fn test_build_meta() {
        let mut stamps = GitTimestamps::default();
        stamps.insert(
            "hello",
            FileTimestamps {
                last_modified: "2024-02-01T00:00:00.000Z".to_string(),
                created: "2024-01-01T00:00:00.000Z".to_string(),
            },
        );
        let content = "---\ndate: 2024-01-15\ntags:\n  - x\ncover: null\n---\n# Hello\n\nBody text.\n";
        let meta = build_meta("hello", content, "Newbie Space", 200, &stamps).unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.date, "2024-01-15");
        assert_eq!(meta.author, "Newbie Space");
        assert_eq!(meta.tags, vec!["x"]);
        assert_eq!(meta.cover, None);
        assert_eq!(meta.excerpt.as_deref(), Some("Body text."));
        assert_eq!(meta.read_time, 1);
        assert_eq!(meta.created.as_deref(), Some("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_build_meta_skip_reasons() {
        let stamps = GitTimestamps::default();
        assert_eq!(
            build_meta("a", "---\ndate: 2024\n---\nno title\n", "x", 200, &stamps),
            Err(SkipReason::MissingTitle)
        );
        assert_eq!(
            build_meta("a", "---\nauthor: me\n---\n# Title\n", "x", 200, &stamps),
            Err(SkipReason::MissingDate)
        );
    }

    #[test]
    fn test_sort_posts_by_date_string() {
        let stamps = GitTimestamps::default();
        let mut posts: Vec<PostMeta> = [("a", "2023-12-01"), ("b", "2024-01"), ("c", "2024-01-05")]
            .iter()
            .map(|(slug, date)| {
                let content = format!("---\ndate: {}\n---\n# {}\n", date, slug);
                build_meta(slug, &content, "x", 200, &stamps).unwrap()
            })
            .collect();
        sort_posts(&mut posts);
        let order: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_load_posts_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_in(dir.path());
        write_post(&site, "first.md", "---\ndate: 2024-01-01\nauthor: Jo\n---\n# First\n\nHi\n");
        write_post(&site, "second.md", "---\ndate: 2024-03-01\n---\n# Second\n");
        write_post(&site, "no-date.md", "# Dateless\n");
        write_post(&site, "notes.txt", "---\ndate: 2024-01-01\n---\n# Not markdown\n");
        fs::create_dir_all(site.posts_dir.join("nested")).unwrap();
        fs::write(
            site.posts_dir.join("nested/deep.md"),
            "---\ndate: 2025-01-01\n---\n# Deep\n",
        )
        .unwrap();

        let loader = PostLoader::new(&site).unwrap();
        let index = loader.load_posts().unwrap();
        let slugs: Vec<_> = index.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first"]);
        assert_eq!(index.by_slug("first").unwrap().author, "Jo");
        assert!(index.by_slug("no-date").is_none());
    }

    #[test]
    fn test_load_posts_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_in(dir.path());
        let loader = PostLoader::new(&site).unwrap();
        assert!(loader.load_posts().unwrap().is_empty());
    }

    #[test]
    fn test_load_post_renders_body() {
        let dir = tempfile::tempdir().unwrap();
        let site = site_in(dir.path());
        write_post(
            &site,
            "post.md",
            "---\ndate: 2024-01-01\n---\n# Post\n\n## Part One\n\nSee [docs](https://docs.rs).\n",
        );

        let loader = PostLoader::new(&site).unwrap();
        let index = loader.load_posts().unwrap();
        let post = loader.load_post(index.by_slug("post").unwrap()).unwrap();
        assert!(!post.content.contains("date:"));
        assert!(post.content.contains(r#"<h2 id="part-one">Part One</h2>"#));
        assert!(post.content.contains(r#"target="_blank""#));
        assert!(post.toc.contains(r##"href="#part-one""##));
    }

    #[test]
    fn test_tag_counts() {
        let stamps = GitTimestamps::default();
        let posts = vec![
            build_meta("a", "---\ndate: 1\ntags: [rust, web]\n---\n# A\n", "x", 200, &stamps).unwrap(),
            build_meta("b", "---\ndate: 2\ntags: [rust]\n---\n# B\n", "x", 200, &stamps).unwrap(),
        ];
        let tags = PostIndex::new(posts).tags();
        let ordered: Vec<_> = tags.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(ordered, vec![("rust", 2), ("web", 1)]);
    }
}
