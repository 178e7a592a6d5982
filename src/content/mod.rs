//! Content module - front matter, metadata extraction and markdown rendering

mod extract;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use extract::{calculate_read_time, count_text, extract_excerpt, extract_title, plain_text};
pub use frontmatter::{FieldValue, FrontMatter};
pub use loader::{PostIndex, PostLoader, SkipReason};
pub use markdown::{expand_containers, MarkdownRenderer};
pub use post::{Post, PostMeta};
