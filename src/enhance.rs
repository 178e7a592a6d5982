//! Build-time enhancements of rendered post HTML
//!
//! These used to run in the browser after every page load. Doing them once
//! at build time keeps the shipped script down to the parts that really are
//! interactive: the image viewer and nav-card click-through, both in
//! [`SITE_SCRIPT`].

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::ops::Range;

use crate::helpers::strip_html;

/// Image viewer and card click-through, written to `assets/js/site.js`
pub const SITE_SCRIPT: &str = include_str!("templates/assets/site.js");

/// Minimal stylesheet, written to `assets/css/site.css`
pub const SITE_STYLE: &str = include_str!("templates/assets/site.css");

lazy_static! {
    static ref GALLERY_OPEN_RE: Regex =
        Regex::new(r#"<div class="image-gallery-wrapper">"#).unwrap();
    static ref DIV_TAG_RE: Regex = Regex::new(r"(?i)<div\b|</div\s*>").unwrap();
    static ref PARAGRAPH_RE: Regex = Regex::new(r"(?s)<p>(.*?)</p>").unwrap();
    static ref IMG_RE: Regex = Regex::new(r"<img\b[^>]*>").unwrap();
    static ref FOOTNOTE_DEF_OPEN_RE: Regex =
        Regex::new(r#"<div class="footnote-definition" id="([^"]+)">"#).unwrap();
    static ref FOOTNOTE_LABEL_RE: Regex =
        Regex::new(r#"(?s)<sup class="footnote-definition-label">.*?</sup>"#).unwrap();
    static ref FOOTNOTE_BACKREF_RE: Regex =
        Regex::new(r#"(?s)<a [^>]*class="footnote-backref"[^>]*>.*?</a>"#).unwrap();
    static ref FOOTNOTE_REF_RE: Regex =
        Regex::new(r##"<sup class="footnote-reference"([^>]*)><a href="#([^"]+)">"##).unwrap();
    static ref ANCHOR_RE: Regex = Regex::new(r#"<a\s[^>]*>"#).unwrap();
    static ref EXTERNAL_HREF_RE: Regex = Regex::new(r#"\shref="https?://"#).unwrap();
}

/// Apply every enhancement in order
pub fn enhance_all(html: &str) -> String {
    let html = arrange_galleries(html);
    let html = attach_footnote_tooltips(&html);
    open_external_links(&html)
}

/// A `<div>` found by its opening tag, with its closing tag matched by
/// nesting depth
struct DivBlock<'h> {
    open: Captures<'h>,
    inner: &'h str,
    /// Whole element, opening to closing tag
    range: Range<usize>,
}

/// Every non-overlapping div whose opening tag matches `open_re`
///
/// Unclosed divs are skipped.
fn div_blocks<'h>(html: &'h str, open_re: &Regex) -> Vec<DivBlock<'h>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(open) = open_re.captures_at(html, pos) {
        let (start, body_start) = match open.get(0) {
            Some(m) => (m.start(), m.end()),
            None => break,
        };

        let mut depth = 1usize;
        let mut close = None;
        for tag in DIV_TAG_RE.find_iter(&html[body_start..]) {
            if tag.as_str().starts_with("</") {
                depth -= 1;
                if depth == 0 {
                    close = Some((body_start + tag.start(), body_start + tag.end()));
                    break;
                }
            } else {
                depth += 1;
            }
        }

        let Some((body_end, end)) = close else {
            pos = body_start;
            continue;
        };
        blocks.push(DivBlock {
            open,
            inner: &html[body_start..body_end],
            range: start..end,
        });
        pos = end;
    }

    blocks
}

/// Lift gallery images out of their paragraphs and tag the gallery with
/// its image count
pub fn arrange_galleries(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for block in div_blocks(html, &GALLERY_OPEN_RE) {
        out.push_str(&html[last..block.range.start]);
        match arrange_gallery(block.inner) {
            Some(gallery) => out.push_str(&gallery),
            None => out.push_str(&html[block.range.clone()]),
        }
        last = block.range.end;
    }

    out.push_str(&html[last..]);
    out
}

/// The rewritten gallery, `None` when it holds no image
fn arrange_gallery(inner: &str) -> Option<String> {
    let lifted = PARAGRAPH_RE.replace_all(inner, |p: &Captures| {
        let body = &p[1];
        let images: Vec<&str> = IMG_RE.find_iter(body).map(|m| m.as_str()).collect();
        if images.is_empty() {
            return p[0].to_string();
        }

        let rest = IMG_RE.replace_all(body, "");
        let mut out = images.join("\n");
        if !strip_html(&rest).trim().is_empty() {
            out.push('\n');
            out.push_str(&format!("<p>{}</p>", rest.trim()));
        }
        out
    });

    let count = IMG_RE.find_iter(&lifted).count();
    if count == 0 {
        return None;
    }

    let tagged = IMG_RE.replace_all(&lifted, |m: &Captures| add_class(&m[0], "gallery-image"));
    Some(format!(
        r#"<div class="image-gallery-wrapper image-gallery gallery-{}">{}</div>"#,
        count, tagged
    ))
}

/// Copy each footnote's text onto its reference as `data-footnote`
pub fn attach_footnote_tooltips(html: &str) -> String {
    let definitions: HashMap<String, String> = div_blocks(html, &FOOTNOTE_DEF_OPEN_RE)
        .into_iter()
        .map(|block| {
            let body = FOOTNOTE_LABEL_RE.replace_all(block.inner, "");
            let body = FOOTNOTE_BACKREF_RE.replace_all(&body, "");
            let text = strip_html(&body)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .replace('"', "&quot;");
            (block.open[1].to_string(), text)
        })
        .collect();

    FOOTNOTE_REF_RE
        .replace_all(html, |caps: &Captures| {
            let attrs = &caps[1];
            if attrs.contains("data-footnote") {
                return caps[0].to_string();
            }
            match definitions.get(&caps[2]) {
                Some(text) if !text.is_empty() => format!(
                    r##"<sup class="footnote-reference"{} data-footnote="{}"><a href="#{}">"##,
                    attrs, text, &caps[2]
                ),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Open absolute http(s) links in a new tab
pub fn open_external_links(html: &str) -> String {
    ANCHOR_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[0];
            if !EXTERNAL_HREF_RE.is_match(tag) || tag.contains(" target=") {
                return tag.to_string();
            }
            let head = tag.trim_end_matches('>');
            if tag.contains(" rel=") {
                format!(r#"{} target="_blank">"#, head)
            } else {
                format!(r#"{} target="_blank" rel="noopener noreferrer">"#, head)
            }
        })
        .into_owned()
}

/// Add a class to a single opening tag
fn add_class(tag: &str, class: &str) -> String {
    if let Some(pos) = tag.find("class=\"") {
        let insert_at = pos + "class=\"".len();
        format!("{}{} {}", &tag[..insert_at], class, &tag[insert_at..])
    } else if let Some(rest) = tag.strip_prefix("<img") {
        format!(r#"<img class="{}"{}"#, class, rest)
    } else {
        tag.to_string()
    }
}
