//! URL helper functions

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ROOT_ATTR_RE: Regex =
        Regex::new(r#"(\s(?:src|href)=)("|')(/[^"']*)("|')"#).unwrap();
}

/// Prefix a site path with the deployment base
///
/// # Examples
/// ```ignore
/// url_for("/newbie-space/", "/posts/hello") // -> "/newbie-space/posts/hello"
/// ```
pub fn url_for(base: &str, path: &str) -> String {
    if is_external(path) || path.starts_with('#') {
        return path.to_string();
    }

    let root = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for("https://example.com", "/blog/", "/posts/a") // -> "https://example.com/blog/posts/a"
/// ```
pub fn full_url_for(site_url: &str, base: &str, path: &str) -> String {
    let path = url_for(base, path);
    if is_external(&path) {
        return path;
    }
    format!("{}{}", site_url.trim_end_matches('/'), path)
}

/// Absolute `http(s)` or protocol-relative URL
pub fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

/// Prefix root-relative `src`/`href` attributes in rendered HTML with the
/// deployment base
pub fn rebase_root_urls(html: &str, base: &str) -> String {
    let root = base.trim_end_matches('/');
    if root.is_empty() {
        return html.to_string();
    }

    let prefix = format!("{}/", root);
    ROOT_ATTR_RE
        .replace_all(html, |caps: &Captures| {
            let url = &caps[3];
            if caps[2] != caps[4] || url.starts_with("//") || url.starts_with(&prefix) {
                return caps[0].to_string();
            }
            format!("{}{}{}{}{}", &caps[1], &caps[2], root, url, &caps[4])
        })
        .into_owned()
}

/// Encode a URL path segment
pub fn encode_url(path: &str) -> String {
    percent_encoding::utf8_percent_encode(path, percent_encoding::NON_ALPHANUMERIC).to_string()
}
