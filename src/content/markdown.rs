//! Markdown rendering with syntax highlighting and custom containers

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashSet;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::enhance;
use crate::helpers::html_escape;

/// Title used by `::: details` without one
const DEFAULT_DETAILS_TITLE: &str = "详情";

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r#"https?://[^\s<>"']+"#).unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let source = expand_containers(markdown);

        // Front matter is handled separately in FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(&source, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();
        let mut link_depth = 0usize;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Text(text) if link_depth == 0 && URL_RE.is_match(&text) => {
                    events.extend(linkify(&text));
                }
                Event::SoftBreak => events.push(Event::HardBreak),
                _ => events.push(event),
            }
        }

        assign_heading_ids(&mut events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Render a post body and apply the gallery, footnote and external
    /// link enhancements
    pub fn render_post(&self, markdown: &str) -> Result<String> {
        let rendered = self.render(markdown)?;
        Ok(enhance::enhance_all(&rendered))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<div class="highlight language-{}">{}</div>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");
        let code_lines = lines.join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite `::: name` containers into HTML blocks so their contents are
/// still parsed as markdown
pub fn expand_containers(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut open = 0usize;
    let mut fence: Option<String> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            let marker: String = trimmed
                .chars()
                .take_while(|&c| c == '`' || c == '~')
                .collect();
            fence = match fence {
                Some(f) if marker.starts_with(&f) => None,
                Some(f) => Some(f),
                None => Some(marker),
            };
        }

        if fence.is_none() {
            if trimmed == ":::" && open > 0 {
                open -= 1;
                out.push_str("\n</div>\n\n");
                continue;
            }
            if let Some(params) = trimmed.strip_prefix(":::") {
                if let Some(opening) = container_open_tag(params.trim()) {
                    open += 1;
                    out.push('\n');
                    out.push_str(&opening);
                    out.push_str("\n\n");
                    continue;
                }
            }
        }

        out.push_str(line);
        out.push('\n');
    }

    for _ in 0..open {
        out.push_str("\n</div>\n");
    }

    out
}

fn container_open_tag(params: &str) -> Option<String> {
    let name = params.split_whitespace().next()?;
    match name {
        "images" => Some(r#"<div class="image-gallery-wrapper">"#.to_string()),
        "timeline" => Some(r#"<div class="timeline-wrapper">"#.to_string()),
        "details" => {
            let title = params["details".len()..].trim();
            let title = if title.is_empty() {
                DEFAULT_DETAILS_TITLE
            } else {
                title
            };
            Some(format!(
                r#"<div class="details-wrapper" data-title="{}">"#,
                html_escape(title)
            ))
        }
        _ => None,
    }
}

/// Turn bare URLs in a text event into links
fn linkify<'a>(text: &str) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut last = 0;

    for m in URL_RE.find_iter(text) {
        let url = m
            .as_str()
            .trim_end_matches(|c: char| ".,;:!?)）。，".contains(c));
        let end = m.start() + url.len();

        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        let escaped = html_escape(url);
        events.push(Event::Html(CowStr::from(format!(
            r#"<a href="{}">{}</a>"#,
            escaped, escaped
        ))));
        last = end;
    }

    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }

    events
}

/// Give every heading without an explicit `{#id}` a slug id, suffixed
/// with `-1`, `-2`, ... when the slug is already taken
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|e| match e {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    let mut i = 0;
    while i < events.len() {
        let needs_id = matches!(&events[i], Event::Start(Tag::Heading { id: None, .. }));
        if needs_id {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() {
                match &events[j] {
                    Event::End(TagEnd::Heading(_)) => break,
                    Event::Text(t) | Event::Code(t) => text.push_str(t),
                    _ => {}
                }
                j += 1;
            }

            let slug = slug::slugify(&text);
            if !slug.is_empty() {
                let mut unique = slug.clone();
                let mut n = 1;
                while used.contains(&unique) {
                    unique = format!("{}-{}", slug, n);
                    n += 1;
                }
                used.insert(unique.clone());
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                    *id = Some(CowStr::from(unique));
                }
            }
            i = j;
        }
        i += 1;
    }
}
