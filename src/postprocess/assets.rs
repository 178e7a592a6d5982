//! Prefix root-relative asset references with the deployment base

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ensure_output_dir;
use crate::config::normalize_base;

lazy_static! {
    static ref SCRIPT_SRC_RE: Regex = Regex::new(r#"<script([^>]*)\ssrc="([^"]+)""#).unwrap();
    static ref LINK_HREF_RE: Regex = Regex::new(r#"<link([^>]*)\shref="([^"]+)""#).unwrap();
    static ref CSS_URL_RE: Regex = Regex::new(r#"url\((['"]?)(/[^'")]+)(['"]?)\)"#).unwrap();
}

/// Work out the base path the output was built for
///
/// An `index.html` already referencing `<configured>assets/` or
/// `href="<configured>` wins; otherwise `BASE_URL` or `VITE_BASE_URL` from
/// the environment, else the configured base.
pub fn detect_base(dist: &Path, configured: &str) -> String {
    detect_base_with(dist, configured, |key| std::env::var(key).ok())
}

pub fn detect_base_with<F>(dist: &Path, configured: &str, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let configured = normalize_base(configured);

    if configured != "/" {
        if let Ok(index) = fs::read_to_string(dist.join("index.html")) {
            let assets = format!("{}assets/", configured);
            let href = format!("href=\"{}", configured);
            if index.contains(&assets) || index.contains(&href) {
                return configured;
            }
        }
    }

    ["BASE_URL", "VITE_BASE_URL"]
        .iter()
        .filter_map(|key| env(key))
        .find(|v| !v.trim().is_empty())
        .map(|v| normalize_base(&v))
        .unwrap_or(configured)
}

/// Prefix root-relative asset URLs in HTML and CSS files with `base`
///
/// Nothing happens for a base of `/`. Returns the files that changed.
pub fn fix_asset_paths(dist: &Path, base: &str) -> Result<Vec<PathBuf>> {
    ensure_output_dir(dist)?;

    let base = normalize_base(base);
    if base == "/" {
        tracing::info!("Base is /, asset paths left unchanged");
        return Ok(Vec::new());
    }

    let mut changed = Vec::new();
    let mut files: Vec<PathBuf> = WalkDir::new(dist)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();

    for path in files {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let content = match ext.as_str() {
            "html" | "css" => fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?,
            _ => continue,
        };

        let fixed = if ext == "html" {
            fix_html(&content, &base)
        } else {
            fix_css(&content, &base)
        };

        if fixed != content {
            fs::write(&path, fixed).with_context(|| format!("Failed to write {:?}", path))?;
            let rel = path.strip_prefix(dist).unwrap_or(&path).to_path_buf();
            tracing::info!("Fixed asset paths in {:?}", rel);
            changed.push(rel);
        }
    }

    Ok(changed)
}

/// Whether a URL needs the base prefix
fn needs_base(url: &str, base: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with(base)
}

fn prefixed(url: &str, base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), url)
}

fn fix_html(html: &str, base: &str) -> String {
    let html = SCRIPT_SRC_RE.replace_all(html, |caps: &Captures| {
        if needs_base(&caps[2], base) {
            format!(r#"<script{} src="{}""#, &caps[1], prefixed(&caps[2], base))
        } else {
            caps[0].to_string()
        }
    });
    let html = LINK_HREF_RE.replace_all(&html, |caps: &Captures| {
        if needs_base(&caps[2], base) {
            format!(r#"<link{} href="{}""#, &caps[1], prefixed(&caps[2], base))
        } else {
            caps[0].to_string()
        }
    });
    fix_css(&html, base)
}

fn fix_css(css: &str, base: &str) -> String {
    CSS_URL_RE
        .replace_all(css, |caps: &Captures| {
            if caps[1] != caps[3] || !needs_base(&caps[2], base) {
                return caps[0].to_string();
            }
            format!("url({}{}{})", &caps[1], prefixed(&caps[2], base), &caps[1])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/newbie-space/";

    #[test]
    fn test_fix_html() {
        let html = concat!(
            r#"<script type="module" src="/assets/app.js"></script>"#,
            r#"<script src="/newbie-space/assets/ok.js"></script>"#,
            r#"<script src="https://cdn.example.com/x.js"></script>"#,
            r#"<link rel="stylesheet" href="/assets/site.css">"#,
            r#"<link rel="preconnect" href="//fonts.example.com">"#,
            r#"<div style="background: url('/img/bg.png')"></div>"#,
            r#"<a href="/posts/">posts</a>"#,
        );
        let out = fix_html(html, BASE);
        assert!(out.contains(r#"<script type="module" src="/newbie-space/assets/app.js">"#));
        assert!(out.contains(r#"<script src="/newbie-space/assets/ok.js">"#));
        assert!(out.contains(r#"src="https://cdn.example.com/x.js""#));
        assert!(out.contains(r#"<link rel="stylesheet" href="/newbie-space/assets/site.css">"#));
        assert!(out.contains(r#"href="//fonts.example.com""#));
        assert!(out.contains("url('/newbie-space/img/bg.png')"));
        assert!(out.contains(r#"<a href="/posts/">"#));
    }

    #[test]
    fn test_fix_css() {
        let css = r#"@font-face { src: url(/fonts/a.woff2), url("/fonts/a.woff"); } .x { background: url("/newbie-space/ok.png") } .y { background: url("/bad.png') }"#;
        let out = fix_css(css, BASE);
        assert!(out.contains("url(/newbie-space/fonts/a.woff2)"));
        assert!(out.contains(r#"url("/newbie-space/fonts/a.woff")"#));
        assert!(out.contains(r#"url("/newbie-space/ok.png")"#));
        assert!(out.contains(r#"url("/bad.png')"#));
    }

    #[test]
    fn test_fix_asset_paths_reports_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path();
        fs::create_dir_all(dist.join("assets")).unwrap();
        fs::write(
            dist.join("index.html"),
            r#"<link rel="stylesheet" href="/assets/site.css">"#,
        )
        .unwrap();
        fs::write(dist.join("assets/site.css"), "body { color: red }").unwrap();
        fs::write(dist.join("assets/font.css"), "a { src: url(/f.woff) }").unwrap();
        fs::write(dist.join("data.json"), r#"{"src":"/x"}"#).unwrap();

        let changed = fix_asset_paths(dist, BASE).unwrap();
        assert_eq!(
            changed,
            vec![PathBuf::from("assets/font.css"), PathBuf::from("index.html")]
        );
        assert_eq!(
            fs::read_to_string(dist.join("data.json")).unwrap(),
            r#"{"src":"/x"}"#
        );
        assert!(fix_asset_paths(dist, BASE).unwrap().is_empty());
    }

    #[test]
    fn test_root_base_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), r#"<script src="/a.js">"#).unwrap();
        assert!(fix_asset_paths(dir.path(), "/").unwrap().is_empty());
    }

    #[test]
    fn test_detect_base() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path();
        let no_env = |_: &str| None;

        fs::write(
            dist.join("index.html"),
            r#"<link href="/newbie-space/assets/site.css">"#,
        )
        .unwrap();
        let env = |k: &str| (k == "BASE_URL").then(|| "/other".to_string());
        assert_eq!(detect_base_with(dist, BASE, env), BASE);

        fs::write(dist.join("index.html"), "<html></html>").unwrap();
        assert_eq!(detect_base_with(dist, BASE, env), "/other/");
        let vite = |k: &str| (k == "VITE_BASE_URL").then(|| "/vite/".to_string());
        assert_eq!(detect_base_with(dist, "/", vite), "/vite/");
        assert_eq!(detect_base_with(dist, BASE, no_env), BASE);
        assert_eq!(detect_base_with(dist, "/", no_env), "/");
    }
}
