//! Metadata derived from a post's markdown: title, excerpt and read time

use lazy_static::lazy_static;
use regex::Regex;

use super::FrontMatter;

/// Characters per minute for CJK text
const CJK_PER_MINUTE: f64 = 300.0;
/// Words per minute for latin text
const WORDS_PER_MINUTE: f64 = 200.0;

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"^ {0,3}#[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap();
    static ref HEADING_MARK_RE: Regex = Regex::new(r"^ {0,3}#{1,6}[ \t]+").unwrap();
    static ref LIST_MARK_RE: Regex = Regex::new(r"^\s*(?:[-*+]|\d+[.)])[ \t]+").unwrap();
    static ref QUOTE_MARK_RE: Regex = Regex::new(r"^\s*(?:>\s?)+").unwrap();
    static ref RULE_RE: Regex = Regex::new(r"^\s*(?:[-*_][ \t]*){3,}$").unwrap();
    static ref IMAGE_RE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref FOOTNOTE_REF_RE: Regex = Regex::new(r"\[\^[^\]]+\]:?").unwrap();
    static ref HTML_TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref EMPHASIS_RE: Regex = Regex::new(r"\*\*|__|~~|[*`]").unwrap();
}

/// Text of the first level-one heading, ignoring fenced code
pub fn extract_title(markdown: &str) -> Option<String> {
    let (_, body) = FrontMatter::parse(markdown);
    let mut fence: Option<&str> = None;

    for line in body.lines() {
        if let Some(marker) = fence_marker(line) {
            fence = match fence {
                Some(open) if marker.starts_with(open) => None,
                Some(open) => Some(open),
                None => Some(marker),
            };
            continue;
        }
        if fence.is_some() {
            continue;
        }

        if let Some(caps) = TITLE_RE.captures(line) {
            let title = caps[1].trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }

    None
}

/// Plain-text summary of the post body, cut at `max_chars` characters
pub fn extract_excerpt(markdown: &str, max_chars: usize) -> Option<String> {
    let text = plain_text(markdown);
    if text.is_empty() {
        return None;
    }

    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        Some(format!("{}...", cut.trim_end()))
    } else {
        Some(text)
    }
}

/// Estimated reading time in whole minutes, at least one
pub fn calculate_read_time(markdown: &str) -> u32 {
    let text = plain_text(markdown);
    let (cjk, words) = count_text(&text);
    let minutes = (cjk as f64 / CJK_PER_MINUTE + words as f64 / WORDS_PER_MINUTE).ceil();
    (minutes as u32).max(1)
}

/// Count CJK ideographs and latin words
pub fn count_text(text: &str) -> (usize, usize) {
    let mut cjk = 0;
    let mut words = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            cjk += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                words += 1;
            }
        } else if c != '\'' && c != '-' {
            in_word = false;
        }
    }

    (cjk, words)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}

/// Strip front matter, the title and markdown syntax, collapsing whitespace
pub fn plain_text(markdown: &str) -> String {
    let (_, body) = FrontMatter::parse(markdown);
    let mut kept = Vec::new();
    let mut fence: Option<&str> = None;
    let mut title_seen = false;

    for line in body.lines() {
        if let Some(marker) = fence_marker(line) {
            fence = match fence {
                Some(open) if marker.starts_with(open) => None,
                Some(open) => Some(open),
                None => Some(marker),
            };
            continue;
        }
        if fence.is_some() {
            continue;
        }

        let trimmed = line.trim();
        if trimmed.starts_with(":::") || RULE_RE.is_match(line) {
            continue;
        }
        if !title_seen && TITLE_RE.is_match(line) {
            title_seen = true;
            continue;
        }

        let line = HEADING_MARK_RE.replace(line, "");
        let line = QUOTE_MARK_RE.replace(&line, "");
        let line = LIST_MARK_RE.replace(&line, "");
        kept.push(line.into_owned());
    }

    let text = kept.join("\n");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = FOOTNOTE_REF_RE.replace_all(&text, "");
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = EMPHASIS_RE.replace_all(&text, "");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Opening/closing marker of a fenced code block (``` or ~~~)
fn fence_marker(line: &str) -> Option<&str> {
    let t = line.trim_start();
    for marker in ["```", "~~~"] {
        if t.starts_with(marker) {
            let ch = marker.as_bytes()[0] as char;
            let len = t.chars().take_while(|&c| c == ch).count();
            return Some(&t[..len]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"---
date: 2024-01-15
---

# 你好, World

Intro paragraph with a [link](https://example.com) and **bold** text.

![cover](/images/a.png)

```rust
# not a title
fn main() {}
```

## Section

- item one
- item two
"#;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(POST), Some("你好, World".to_string()));
    }

    #[test]
    fn test_title_skips_code_and_subheadings() {
        let md = "## Sub\n\n```\n# fake\n```\n\n# Real #\n";
        assert_eq!(extract_title(md), Some("Real".to_string()));
    }

    #[test]
    fn test_title_keeps_hash_inside_text() {
        assert_eq!(extract_title("# C# tips\n"), Some("C# tips".to_string()));
    }

    #[test]
    fn test_missing_title() {
        assert_eq!(extract_title("---\ndate: 2024\n---\nno heading here\n"), None);
        assert_eq!(extract_title("#hashtag is not a heading\n"), None);
    }

    #[test]
    fn test_plain_text_strips_syntax() {
        let text = plain_text(POST);
        assert_eq!(
            text,
            "Intro paragraph with a link and bold text. Section item one item two"
        );
    }

    #[test]
    fn test_excerpt_truncates() {
        let excerpt = extract_excerpt(POST, 10).unwrap();
        assert_eq!(excerpt, "Intro para...");
        assert!(extract_excerpt(POST, 1000).unwrap().ends_with("item two"));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let md = "# T\n\n一二三四五六七八九十\n";
        assert_eq!(extract_excerpt(md, 5).unwrap(), "一二三四五...");
    }

    #[test]
    fn test_empty_excerpt() {
        assert_eq!(extract_excerpt("---\ndate: 2024\n---\n# Only title\n", 200), None);
    }

    #[test]
    fn test_containers_dropped_from_excerpt() {
        let md = "# T\n\n::: details More\nhidden body\n:::\n";
        assert_eq!(plain_text(md), "hidden body");
    }

    #[test]
    fn test_read_time() {
        assert_eq!(calculate_read_time("# T\n\nshort"), 1);

        let english = "word ".repeat(401);
        assert_eq!(calculate_read_time(&english), 3);

        let chinese = "字".repeat(600);
        assert_eq!(calculate_read_time(&chinese), 2);

        let mixed = format!("{} {}", "字".repeat(150), "word ".repeat(100));
        assert_eq!(calculate_read_time(&mixed), 1);
    }

    #[test]
    fn test_count_text() {
        assert_eq!(count_text("Hello, world! 你好"), (2, 2));
        assert_eq!(count_text("don't stop-motion"), (0, 2));
    }
}
