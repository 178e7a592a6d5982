//! Post models

use serde::Serialize;

/// Metadata of a blog post, derived from its markdown file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    /// File stem of the markdown file
    pub slug: String,

    /// Text of the first `#` heading
    pub title: String,

    /// Publication date as written (`YYYY-MM` or `YYYY-MM-DD`)
    pub date: String,

    pub author: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Estimated minutes to read
    pub read_time: u32,

    pub tags: Vec<String>,

    /// Cover image, `None` for posts without one
    pub cover: Option<String>,

    /// Last git commit touching the file (ISO-8601, UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// First git commit adding the file (ISO-8601, UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl PostMeta {
    /// Route of the post page
    pub fn route(&self) -> String {
        format!("/posts/{}", self.slug)
    }

    /// Get the previous (older) post in a date-descending list
    pub fn prev<'a>(&self, posts: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        posts.get(pos + 1)
    }

    /// Get the next (newer) post in a date-descending list
    pub fn next<'a>(&self, posts: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            posts.get(pos - 1)
        } else {
            None
        }
    }
}

/// A fully rendered post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub meta: PostMeta,

    /// Rendered and enhanced HTML body
    pub content: String,

    /// Table of contents built from the body headings
    pub toc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(slug: &str) -> PostMeta {
        PostMeta {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            date: "2024-01".to_string(),
            author: "Newbie Space".to_string(),
            excerpt: None,
            read_time: 1,
            tags: Vec::new(),
            cover: None,
            last_modified: None,
            created: None,
        }
    }

    #[test]
    fn test_prev_next() {
        let posts = vec![meta("newest"), meta("middle"), meta("oldest")];
        assert_eq!(posts[1].prev(&posts).unwrap().slug, "oldest");
        assert_eq!(posts[1].next(&posts).unwrap().slug, "newest");
        assert!(posts[0].next(&posts).is_none());
        assert!(posts[2].prev(&posts).is_none());
    }

    #[test]
    fn test_serialize_camel_case() {
        let mut m = meta("a");
        m.last_modified = Some("2024-01-01T00:00:00.000Z".to_string());
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["readTime"], 1);
        assert_eq!(json["lastModified"], "2024-01-01T00:00:00.000Z");
        assert!(json.get("excerpt").is_none());
        assert!(json["cover"].is_null());
    }
}
