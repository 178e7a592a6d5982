//! Table of contents built from rendered headings

use lazy_static::lazy_static;
use regex::Regex;

use super::strip_html;

lazy_static! {
    static ref HEADING_RE: Regex =
        Regex::new(r#"(?s)<h([1-6])((?:\s[^>]*)?)>(.*?)</h[1-6]>"#).unwrap();
    static ref ID_RE: Regex = Regex::new(r#"\sid="([^"]*)""#).unwrap();
}

/// Nested `<ol class="toc">` of the `h2`..`h{max_depth}` headings
///
/// The `h1` is the post title and stays out. Headings without an `id` fall
/// back to a slug of their text. Returns an empty string when there is
/// nothing to list.
pub fn toc(content: &str, max_depth: usize) -> String {
    let mut html = r#"<ol class="toc">"#.to_string();
    let mut current_level = 2;
    let mut items = 0;

    for caps in HEADING_RE.captures_iter(content) {
        let level: usize = caps[1].parse().unwrap_or(1);
        if level < 2 || level > max_depth {
            continue;
        }

        let text = strip_html(&caps[3]).trim().to_string();
        let id = ID_RE
            .captures(&caps[2])
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| slug::slugify(&text));

        while current_level < level {
            html.push_str("<ol>");
            current_level += 1;
        }
        while current_level > level {
            html.push_str("</ol>");
            current_level -= 1;
        }

        html.push_str(&format!(
            "<li class=\"toc-item toc-level-{}\"><a class=\"toc-link\" href=\"#{}\"><span class=\"toc-text\">{}</span></a></li>",
            level, id, text
        ));
        items += 1;
    }

    if items == 0 {
        return String::new();
    }

    while current_level > 2 {
        html.push_str("</ol>");
        current_level -= 1;
    }

    html.push_str("</ol>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toc() {
        let html = concat!(
            r#"<h1 id="title">Title</h1>"#,
            r#"<h2 id="intro">Intro</h2><p>x</p>"#,
            r#"<h3 id="detail-a">Detail <code>a</code></h3>"#,
            r#"<h4 id="deep">Deep</h4>"#,
            r#"<h2>No Id</h2>"#,
        );
        let out = toc(html, 3);
        assert!(out.starts_with(r#"<ol class="toc"><li class="toc-item toc-level-2">"#));
        assert!(out.contains(r##"href="#intro""##));
        assert!(out.contains(r##"<ol><li class="toc-item toc-level-3"><a class="toc-link" href="#detail-a"><span class="toc-text">Detail a</span>"##));
        assert!(out.contains(r##"href="#no-id""##));
        assert!(!out.contains("#title"));
        assert!(!out.contains("#deep"));
        assert_eq!(out.matches("<ol").count(), out.matches("</ol>").count());
    }

    #[test]
    fn test_toc_empty() {
        assert_eq!(toc("<h1>Only</h1><p>text</p>", 3), "");
    }
}
