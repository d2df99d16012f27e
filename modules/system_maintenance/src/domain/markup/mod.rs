//! Markup rendering for free-text fields
//!
//! Rendering never fails: malformed input degrades to best-effort HTML and
//! an unknown or empty markup type passes the raw text through unchanged.

mod rest;

use crate::contract::MarkupType;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

#[allow(clippy::unwrap_used)]
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:https?://|www\.)[^\s<>"']+"#).unwrap());

/// Characters stripped from the end of a detected URL
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', ')', ']'];

/// Render `raw` according to `markup_type`
pub fn render(raw: &str, markup_type: Option<MarkupType>) -> String {
    match markup_type {
        Some(MarkupType::Markdown) => render_code_friendly_markdown(raw),
        Some(MarkupType::MarkdownBasic) => render_markdown(raw, Options::empty()),
        Some(MarkupType::PlainText) => render_plain_text(raw),
        Some(MarkupType::ReStructuredText) => rest::render(raw),
        None => raw.to_string(),
    }
}

/// Render using a stored markup type label
pub fn render_labeled(raw: &str, label: &str) -> String {
    render(raw, MarkupType::from_label(label))
}

fn extended_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

fn render_markdown(raw: &str, options: Options) -> String {
    let parser = Parser::new_ext(raw, options);
    let mut out = String::with_capacity(raw.len() + raw.len() / 2);
    html::push_html(&mut out, parser);
    out
}

/// Extended dialect where `_` and `__` never mean emphasis, so identifiers
/// like `snake_case_name` survive in prose. `*` and `**` still do.
fn render_code_friendly_markdown(raw: &str) -> String {
    let mut underscored = Vec::new();
    let events = Parser::new_ext(raw, extended_options())
        .into_offset_iter()
        .map(|(event, range)| match event {
            Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong) => {
                let literal = raw[range].starts_with('_');
                underscored.push(literal);
                if literal {
                    Event::Text(CowStr::Borrowed(delimiter(&event)))
                } else {
                    event
                }
            }
            Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => {
                if underscored.pop().unwrap_or(false) {
                    Event::Text(CowStr::Borrowed(delimiter(&event)))
                } else {
                    event
                }
            }
            other => other,
        });

    let mut out = String::with_capacity(raw.len() + raw.len() / 2);
    html::push_html(&mut out, events);
    out
}

fn delimiter(event: &Event<'_>) -> &'static str {
    match event {
        Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => "__",
        _ => "_",
    }
}

/// Escape, link bare URLs, then split into paragraphs and line breaks
fn render_plain_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    if normalized.trim().is_empty() {
        return String::new();
    }
    linebreaks(&urlize(&normalized))
}

/// Escape text and wrap URLs in links. Input is raw text, output is HTML.
fn urlize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for found in URL_PATTERN.find_iter(raw) {
        out.push_str(&escape_html(&raw[last..found.start()]));

        let candidate = found.as_str();
        let url = candidate.trim_end_matches(URL_TRAILING_PUNCTUATION);
        let trailing = &candidate[url.len()..];
        if url.is_empty() || url == "www." {
            out.push_str(&escape_html(candidate));
        } else {
            let href = if url.starts_with("www.") {
                format!("http://{}", url)
            } else {
                url.to_string()
            };
            out.push_str(&format!(
                "<a href=\"{}\" rel=\"nofollow\">{}</a>",
                escape_html(&href),
                escape_html(url)
            ));
            out.push_str(&escape_html(trailing));
        }
        last = found.end();
    }
    out.push_str(&escape_html(&raw[last..]));
    out
}

/// Runs of two or more newlines split paragraphs; remaining newlines become `<br>`
fn linebreaks(text: &str) -> String {
    PARAGRAPH_BREAK
        .split(text)
        .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_bold() {
        let html = render("**bold**", Some(MarkupType::Markdown));
        assert!(html.contains("<strong>bold</strong>"), "{}", html);
    }

    #[test]
    fn test_markdown_tables_only_in_extended_dialect() {
        let source = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let extended = render(source, Some(MarkupType::Markdown));
        assert!(extended.contains("<table>"), "{}", extended);

        let basic = render(source, Some(MarkupType::MarkdownBasic));
        assert!(!basic.contains("<table>"), "{}", basic);
    }

    #[test]
    fn test_markdown_fenced_code() {
        let html = render("```\nlet x = 1;\n```\n", Some(MarkupType::Markdown));
        assert!(html.contains("<pre><code>let x = 1;"), "{}", html);
    }

    #[test]
    fn test_plain_text_escapes_script() {
        let html = render(
            "<script>alert('x')</script>",
            Some(MarkupType::PlainText),
        );
        assert!(!html.contains("<script>"), "{}", html);
        assert!(html.contains("&lt;script&gt;"), "{}", html);
    }

    #[test]
    fn test_plain_text_linebreaks() {
        let html = render("one\ntwo\n\nthree", Some(MarkupType::PlainText));
        assert_eq!(html, "<p>one<br>two</p>\n\n<p>three</p>");
    }

    #[test]
    fn test_plain_text_keeps_edge_newlines() {
        assert_eq!(render("a\n", Some(MarkupType::PlainText)), "<p>a<br></p>");
        assert_eq!(
            render("a\n\n\n\nb", Some(MarkupType::PlainText)),
            "<p>a</p>\n\n<p>b</p>"
        );
        assert_eq!(
            render("a\n\n", Some(MarkupType::PlainText)),
            "<p>a</p>\n\n<p></p>"
        );
    }

    #[test]
    fn test_markdown_underscores_are_literal() {
        let html = render(
            "Restart my_service_name and __init__, then *check* __logs__",
            Some(MarkupType::Markdown),
        );
        assert!(html.contains("my_service_name"), "{}", html);
        assert!(html.contains("__init__"), "{}", html);
        assert!(html.contains("__logs__"), "{}", html);
        assert!(html.contains("<em>check</em>"), "{}", html);
        assert!(!html.contains("<strong>"), "{}", html);

        let basic = render("_word_", Some(MarkupType::MarkdownBasic));
        assert!(basic.contains("<em>word</em>"), "{}", basic);
    }

    #[test]
    fn test_markdown_list_after_paragraph() {
        let html = render("Steps:\n- backup\n- upgrade", Some(MarkupType::Markdown));
        assert!(html.contains("<p>Steps:</p>"), "{}", html);
        assert!(html.contains("<li>backup</li>"), "{}", html);
    }

    #[test]
    fn test_plain_text_urlize() {
        let html = render(
            "See https://example.com/a?b=1&c=2. Or www.example.org",
            Some(MarkupType::PlainText),
        );
        assert!(
            html.contains(
                "<a href=\"https://example.com/a?b=1&amp;c=2\" rel=\"nofollow\">https://example.com/a?b=1&amp;c=2</a>."
            ),
            "{}",
            html
        );
        assert!(
            html.contains("<a href=\"http://www.example.org\" rel=\"nofollow\">www.example.org</a>"),
            "{}",
            html
        );
    }

    #[test]
    fn test_plain_text_empty() {
        assert_eq!(render("  \n", Some(MarkupType::PlainText)), "");
    }

    #[test]
    fn test_unknown_type_passes_through() {
        assert_eq!(render_labeled("**raw** <b>", ""), "**raw** <b>");
        assert_eq!(render_labeled("**raw**", "Textile"), "**raw**");
    }

    #[test]
    fn test_render_labeled_uses_label() {
        let html = render_labeled("*hi*", "Markdown Basic");
        assert!(html.contains("<em>hi</em>"), "{}", html);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }
}
