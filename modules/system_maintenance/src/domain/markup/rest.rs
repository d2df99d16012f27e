//! reStructuredText subset rendered to an HTML body fragment
//!
//! Supported: section titles (underline with optional overline), transitions,
//! paragraphs, bullet and enumerated lists, block quotes, `::` literal blocks,
//! and the inline roles ``literal``, **strong**, *emphasis*, `text <url>`_
//! and bare URLs. Anything else is rendered as paragraph text.

use super::escape_html;
use regex::{Captures, Regex};
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static INLINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"``(?P<literal>[^`]+)``",
        r"|`(?P<link_text>[^`<]+?)\s*<(?P<link_url>[^>`]+)>`__?",
        r"|\*\*(?P<strong>[^*]+)\*\*",
        r"|\*(?P<emphasis>[^*\s][^*]*)\*",
        r#"|(?P<url>https?://[^\s<>"']+)"#,
    ))
    .unwrap()
});

const ADORNMENT_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!', '?', ')'];

pub(super) fn render(raw: &str) -> String {
    let normalized = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', "        ");
    let lines: Vec<&str> = normalized.lines().collect();
    let mut renderer = Renderer::new(&lines);
    renderer.run();
    renderer.finish()
}

/// Title adornment style: (character, has overline)
type TitleStyle = (char, bool);

struct Renderer<'a> {
    lines: &'a [&'a str],
    pos: usize,
    out: String,
    title_styles: Vec<TitleStyle>,
    open_sections: Vec<usize>,
}

impl<'a> Renderer<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            pos: 0,
            out: String::new(),
            title_styles: Vec::new(),
            open_sections: Vec::new(),
        }
    }

    fn finish(mut self) -> String {
        while self.open_sections.pop().is_some() {
            self.out.push_str("</div>\n");
        }
        self.out
    }

    fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    fn run(&mut self) {
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                self.pos += 1;
            } else if indent(line) > 0 {
                self.block_quote();
            } else if self.overlined_title() || self.underlined_title() {
                continue;
            } else if is_adornment(line) && line.trim_end().chars().count() >= 4 {
                self.out.push_str("<hr class=\"docutils\" />\n");
                self.pos += 1;
            } else if bullet_marker(line).is_some() {
                self.list(bullet_marker, "<ul class=\"simple\">", "</ul>");
            } else if enumerated_marker(line).is_some() {
                self.list(enumerated_marker, "<ol class=\"arabic simple\">", "</ol>");
            } else {
                self.paragraph();
            }
        }
    }

    fn overlined_title(&mut self) -> bool {
        let (Some(over), Some(text), Some(under)) = (
            self.line(self.pos),
            self.line(self.pos + 1),
            self.line(self.pos + 2),
        ) else {
            return false;
        };
        if !is_adornment(over) || is_blank(text) || !is_adornment(under) {
            return false;
        }
        let c = adornment_char(over);
        if c != adornment_char(under) {
            return false;
        }
        self.pos += 3;
        self.section(text.trim(), (c, true));
        true
    }

    fn underlined_title(&mut self) -> bool {
        let (Some(text), Some(under)) = (self.line(self.pos), self.line(self.pos + 1)) else {
            return false;
        };
        if is_adornment(text) || !is_adornment(under) {
            return false;
        }
        if under.trim_end().chars().count() < text.trim_end().chars().count().min(4) {
            return false;
        }
        self.pos += 2;
        self.section(text.trim(), (adornment_char(under), false));
        true
    }

    fn section(&mut self, title: &str, style: TitleStyle) {
        let level = match self.title_styles.iter().position(|s| *s == style) {
            Some(index) => index + 1,
            None => {
                self.title_styles.push(style);
                self.title_styles.len()
            }
        };
        while self.open_sections.last().is_some_and(|open| *open >= level) {
            self.open_sections.pop();
            self.out.push_str("</div>\n");
        }
        self.open_sections.push(level);

        let heading = level.min(6);
        self.out.push_str(&format!(
            "<div class=\"section\" id=\"{}\">\n<h{}>{}</h{}>\n",
            slugify(title),
            heading,
            inline(title),
            heading
        ));
    }

    fn paragraph(&mut self) {
        let mut text: Vec<&str> = Vec::new();
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                break;
            }
            text.push(line.trim());
            self.pos += 1;
        }
        let mut joined = text.join("\n");

        let literal_follows = if joined == "::" {
            joined.clear();
            true
        } else if let Some(stripped) = joined.strip_suffix(" ::") {
            joined = stripped.trim_end().to_string();
            true
        } else if joined.ends_with("::") {
            joined.pop();
            true
        } else {
            false
        };

        if !joined.is_empty() {
            self.out.push_str(&format!("<p>{}</p>\n", inline(&joined)));
        }
        if literal_follows {
            self.literal_block();
        }
    }

    fn literal_block(&mut self) {
        let block = self.indented_block();
        if block.is_empty() {
            return;
        }
        self.out.push_str(&format!(
            "<pre class=\"literal-block\">\n{}\n</pre>\n",
            escape_html(&block.join("\n"))
        ));
    }

    fn block_quote(&mut self) {
        let block = self.indented_block();
        let source = block.join("\n");
        self.out.push_str("<blockquote>\n");
        self.out.push_str(&render(&source));
        self.out.push_str("</blockquote>\n");
    }

    /// Consume the following indented lines, dedented, without trailing blanks
    fn indented_block(&mut self) -> Vec<String> {
        while self.line(self.pos).is_some_and(is_blank) {
            self.pos += 1;
        }
        let start = self.pos;
        while let Some(line) = self.line(self.pos) {
            if !is_blank(line) && indent(line) == 0 {
                break;
            }
            self.pos += 1;
        }
        let mut block: Vec<&str> = self.lines[start..self.pos].to_vec();
        while block.last().is_some_and(|line| is_blank(line)) {
            block.pop();
        }
        let min_indent = block
            .iter()
            .filter(|line| !is_blank(line))
            .map(|line| indent(line))
            .min()
            .unwrap_or(0);
        block
            .into_iter()
            .map(|line| line.get(min_indent..).unwrap_or("").to_string())
            .collect()
    }

    fn list(&mut self, marker: fn(&str) -> Option<usize>, open: &str, close: &str) {
        let mut items: Vec<Vec<String>> = Vec::new();
        let mut offset = 0;
        while let Some(line) = self.line(self.pos) {
            if is_blank(line) {
                let next = self.lines[self.pos..]
                    .iter()
                    .find(|candidate| !is_blank(candidate));
                match next {
                    Some(next) if marker(next).is_some() || indent(next) > 0 => {
                        if let Some(item) = items.last_mut() {
                            item.push(String::new());
                        }
                        self.pos += 1;
                    }
                    _ => break,
                }
            } else if let Some(content_offset) = marker(line) {
                offset = content_offset;
                items.push(vec![line[content_offset..].to_string()]);
                self.pos += 1;
            } else if indent(line) > 0 {
                let cut = indent(line).min(offset);
                if let Some(item) = items.last_mut() {
                    item.push(line[cut..].to_string());
                }
                self.pos += 1;
            } else {
                break;
            }
        }

        self.out.push_str(open);
        self.out.push('\n');
        for mut item in items {
            while item.last().is_some_and(|line| line.is_empty()) {
                item.pop();
            }
            let body = if item.iter().any(|line| line.is_empty()) {
                render(&item.join("\n"))
            } else {
                let joined = item
                    .iter()
                    .map(|line| line.trim())
                    .collect::<Vec<_>>()
                    .join("\n");
                inline(&joined)
            };
            self.out.push_str(&format!("<li>{}</li>\n", body));
        }
        self.out.push_str(close);
        self.out.push('\n');
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_adornment(line: &str) -> bool {
    let trimmed = line.trim_end();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    trimmed.chars().count() >= 2 && ADORNMENT_CHARS.contains(first) && chars.all(|c| c == first)
}

fn adornment_char(line: &str) -> char {
    line.chars().next().unwrap_or('=')
}

fn bullet_marker(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    match bytes {
        [b'-' | b'*' | b'+', b' ', ..] => Some(2),
        _ => None,
    }
}

fn enumerated_marker(line: &str) -> Option<usize> {
    if line.starts_with("#. ") {
        return Some(3);
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        Some(digits + 2)
    } else {
        None
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Inline markup over raw text; returns escaped HTML
fn inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in INLINE_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&escape_html(&text[last..whole.start()]));
        out.push_str(&inline_element(&caps));
        last = whole.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

fn inline_element(caps: &Captures<'_>) -> String {
    if let Some(literal) = caps.name("literal") {
        format!(
            "<tt class=\"docutils literal\">{}</tt>",
            escape_html(literal.as_str())
        )
    } else if let (Some(label), Some(url)) = (caps.name("link_text"), caps.name("link_url")) {
        format!(
            "<a class=\"reference external\" href=\"{}\">{}</a>",
            escape_html(url.as_str().trim()),
            escape_html(label.as_str())
        )
    } else if let Some(strong) = caps.name("strong") {
        format!("<strong>{}</strong>", escape_html(strong.as_str()))
    } else if let Some(emphasis) = caps.name("emphasis") {
        format!("<em>{}</em>", escape_html(emphasis.as_str()))
    } else if let Some(url) = caps.name("url") {
        let candidate = url.as_str();
        let trimmed = candidate.trim_end_matches(URL_TRAILING_PUNCTUATION);
        format!(
            "<a class=\"reference external\" href=\"{}\">{}</a>{}",
            escape_html(trimmed),
            escape_html(trimmed),
            escape_html(&candidate[trimmed.len()..])
        )
    } else {
        escape_html(caps.get(0).map_or("", |m| m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_and_inline() {
        let html = render("Title\n=====\n\nSome *text* and **bold**.\n");
        assert!(html.contains("<h1>Title</h1>"), "{}", html);
        assert!(html.contains("<div class=\"section\" id=\"title\">"), "{}", html);
        assert!(html.contains("<em>text</em>"), "{}", html);
        assert!(html.contains("<strong>bold</strong>"), "{}", html);
        assert!(html.trim_end().ends_with("</div>"), "{}", html);
    }

    #[test]
    fn test_nested_section_levels() {
        let html = render("Top\n===\n\nSub\n---\n\ntext\n\nNext\n====\n");
        assert!(html.contains("<h1>Top</h1>"), "{}", html);
        assert!(html.contains("<h2>Sub</h2>"), "{}", html);
        assert!(html.contains("<h1>Next</h1>"), "{}", html);
        assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
    }

    #[test]
    fn test_literal_block() {
        let html = render("Example::\n\n    code <here>\n    more\n\nAfter.\n");
        assert!(html.contains("<p>Example:</p>"), "{}", html);
        assert!(
            html.contains("<pre class=\"literal-block\">\ncode &lt;here&gt;\nmore\n</pre>"),
            "{}",
            html
        );
        assert!(html.contains("<p>After.</p>"), "{}", html);
    }

    #[test]
    fn test_lists() {
        let html = render("- one\n- two\n\n1. first\n2. second\n");
        assert!(html.contains("<ul class=\"simple\">\n<li>one</li>\n<li>two</li>\n</ul>"), "{}", html);
        assert!(html.contains("<ol class=\"arabic simple\">"), "{}", html);
        assert!(html.contains("<li>second</li>"), "{}", html);
    }

    #[test]
    fn test_links_and_literals() {
        let html = render("Use ``ls -l`` and see `docs <https://example.com>`_.");
        assert!(html.contains("<tt class=\"docutils literal\">ls -l</tt>"), "{}", html);
        assert!(
            html.contains("<a class=\"reference external\" href=\"https://example.com\">docs</a>."),
            "{}",
            html
        );
    }

    #[test]
    fn test_escapes_raw_html() {
        let html = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"), "{}", html);
    }

    #[test]
    fn test_malformed_input_degrades() {
        let html = render("**unclosed and `odd\n===\n");
        assert!(!html.is_empty());
    }
}
