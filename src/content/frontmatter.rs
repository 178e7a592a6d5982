//! Front-matter parsing
//!
//! Posts carry a small YAML-like header:
//!
//! ```text
//! ---
//! date: 2024-05-01
//! author: Newbie Space
//! tags:
//!   - rust
//!   - blog
//! cover: null
//! ---
//! ```
//!
//! The header is scanned line by line. Only `key: value` pairs, inline
//! `[a, b]` lists and `key:` followed by `- item` lines are understood;
//! anything else is ignored rather than rejected.

use indexmap::IndexMap;
use serde::Serialize;

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    List(Vec<String>),
}

/// Parsed front-matter fields, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrontMatter {
    fields: IndexMap<String, FieldValue>,
}

impl FrontMatter {
    /// Split `content` into its front matter and the remaining body.
    ///
    /// Content without a well-formed leading `---` block yields empty front
    /// matter and the whole content as body.
    pub fn parse(content: &str) -> (Self, &str) {
        match split_block(content) {
            Some((block, body)) => (Self::parse_block(block), body),
            None => (Self::default(), content),
        }
    }

    /// Parse the inside of a front-matter block (without the `---` fences)
    pub fn parse_block(block: &str) -> Self {
        let lines: Vec<&str> = block.lines().collect();
        let mut fields = IndexMap::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            i += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let colon = match line.find(':') {
                Some(pos) if pos > 0 => pos,
                _ => continue,
            };

            let key = line[..colon].trim();
            // Stray list items and blank keys are malformed here
            if key.is_empty() || key.starts_with('-') {
                continue;
            }

            let raw = line[colon + 1..].trim();
            let value = if raw.is_empty() {
                let mut items = Vec::new();
                while let Some(item) = lines.get(i).and_then(|l| list_item(l)) {
                    if !item.is_empty() {
                        items.push(unquote(item).to_string());
                    }
                    i += 1;
                }
                if items.is_empty() {
                    FieldValue::Text(String::new())
                } else {
                    FieldValue::List(items)
                }
            } else {
                parse_scalar(raw)
            };

            fields.insert(key.to_string(), value);
        }

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text value of a field; `None` for lists, nulls and missing keys
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// List value of a field, a scalar counting as a one-element list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.fields.get(key), Some(FieldValue::Null))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Publication date, verbatim (`YYYY-MM` or `YYYY-MM-DD`)
    pub fn date(&self) -> Option<&str> {
        non_empty(self.get_str("date"))
    }

    pub fn author(&self) -> Option<&str> {
        non_empty(self.get_str("author"))
    }

    pub fn tags(&self) -> Vec<String> {
        self.get_list("tags")
    }

    /// Cover image path; `null`, `~` and empty values mean no cover
    pub fn cover(&self) -> Option<&str> {
        non_empty(self.get_str("cover"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Locate the `---` fenced block at the very start of `content`.
/// Returns the block text and the body that follows the closing fence.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    let mut lines = content.split_inclusive('\n');

    let first = lines.next()?;
    if first.trim_end() != "---" || !first.ends_with('\n') {
        return None;
    }
    offset += first.len();
    let block_start = offset;

    for line in lines {
        if line.trim_end() == "---" {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }

    None
}

/// `- item` / `-` lines under a key with an empty value
fn list_item(line: &str) -> Option<&str> {
    let t = line.trim();
    if t == "-" {
        return Some("");
    }
    t.strip_prefix("- ").map(str::trim)
}

fn parse_scalar(raw: &str) -> FieldValue {
    if raw == "null" || raw == "~" {
        return FieldValue::Null;
    }

    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()).to_string())
            .filter(|item| !item.is_empty())
            .collect();
        return FieldValue::List(items);
    }

    FieldValue::Text(unquote(raw).to_string())
}

/// Remove one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
date: 2024-01-15
author: "Jane"
tags:
  - rust
  - blog
cover: /images/cover.png
---

# Hello World

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.date(), Some("2024-01-15"));
        assert_eq!(fm.author(), Some("Jane"));
        assert_eq!(fm.tags(), vec!["rust", "blog"]);
        assert_eq!(fm.cover(), Some("/images/cover.png"));
        assert!(body.starts_with("\n# Hello World"));
        assert!(!body.contains("date:"));
    }

    #[test]
    fn test_indented_list_items() {
        let (fm, _) = FrontMatter::parse("---\ntags:\n  - x\n---\nbody\n");
        assert_eq!(fm.get("tags"), Some(&FieldValue::List(vec!["x".to_string()])));
    }

    #[test]
    fn test_unindented_and_quoted_list_items() {
        let (fm, _) = FrontMatter::parse("---\ntags:\n- 'a b'\n- \"c\"\ndate: 2024-02\n---\n");
        assert_eq!(fm.tags(), vec!["a b", "c"]);
        assert_eq!(fm.date(), Some("2024-02"));
    }

    #[test]
    fn test_inline_list() {
        let (fm, _) = FrontMatter::parse("---\ntags: [rust, 'web dev', ]\n---\n");
        assert_eq!(fm.tags(), vec!["rust", "web dev"]);
    }

    #[test]
    fn test_scalar_tag_promoted_to_list() {
        let (fm, _) = FrontMatter::parse("---\ntags: notes\n---\n");
        assert_eq!(fm.get_str("tags"), Some("notes"));
        assert_eq!(fm.tags(), vec!["notes"]);
    }

    #[test]
    fn test_null_cover() {
        let (fm, _) = FrontMatter::parse("---\ncover: null\nbanner: ~\n---\n");
        assert!(fm.is_null("cover"));
        assert!(fm.is_null("banner"));
        assert_eq!(fm.cover(), None);
    }

    #[test]
    fn test_empty_value_without_items() {
        let (fm, _) = FrontMatter::parse("---\ntags:\ndate: 2024-01\n---\n");
        assert_eq!(fm.get_str("tags"), Some(""));
        assert!(fm.tags().is_empty());
        assert_eq!(fm.date(), Some("2024-01"));
    }

    #[test]
    fn test_value_with_colons() {
        let (fm, _) = FrontMatter::parse("---\ncover: https://example.com/a.png\n---\n");
        assert_eq!(fm.cover(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let content = "---\njust some words\n: no key\n# a comment\n- stray\ndate: 2024-03-01\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.date(), Some("2024-03-01"));
    }

    #[test]
    fn test_duplicate_key_overwrites() {
        let (fm, _) = FrontMatter::parse("---\nauthor: a\ndate: 2024\nauthor: b\n---\n");
        assert_eq!(fm.author(), Some("b"));
        let keys: Vec<_> = fm.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["author", "date"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ndate: 2024-05-06\r\ntags:\r\n  - a\r\n---\r\n# Title\r\n";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.date(), Some("2024-05-06"));
        assert_eq!(fm.tags(), vec!["a"]);
        assert_eq!(body, "# Title\r\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just markdown\n\n---\n\ntext";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_frontmatter() {
        let content = "---\ndate: 2024-01-01\n\nno closing fence";
        let (fm, body) = FrontMatter::parse(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_leading_whitespace_is_not_frontmatter() {
        let content = "\n---\ndate: 2024-01-01\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert!(fm.is_empty());
    }

    #[test]
    fn test_closing_fence_at_end_of_input() {
        let (fm, body) = FrontMatter::parse("---\ndate: 2024-01-01\n---");
        assert_eq!(fm.date(), Some("2024-01-01"));
        assert_eq!(body, "");
    }
}
