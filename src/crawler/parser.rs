//! HTML to plain text conversion
//!
//! Comment bodies arrive as a small HTML subset (`<p>`, `<br>`, `<a>`,
//! `<i>`, `<pre>`, lists). This module turns them into plain text with
//! paragraph and bullet structure preserved, and extracts readable text
//! from full article pages.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

/// Input beyond this many characters is ignored
const MAX_INPUT_CHARS: usize = 20_000;

/// Placeholder for a paragraph boundary; private-use so it cannot collide
/// with real text and is never taken for markup by the HTML parser.
const PARA_MARK: char = '\u{E000}';

const PARAGRAPH_BREAK: &str = "\n\n";

/// Elements whose text content is never rendered
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "textarea"];

lazy_static! {
    static ref BR: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref PARA_BOUNDARY: Regex = Regex::new(r"(?i)</p>\s*<p(\s[^>]*)?>").unwrap();
    static ref PARA_OPEN: Regex = Regex::new(r"(?i)<p(\s[^>]*)?>").unwrap();
    static ref PARA_CLOSE: Regex = Regex::new(r"(?i)</p\s*>").unwrap();
    static ref LI_OPEN: Regex = Regex::new(r"(?i)<li(\s[^>]*)?>").unwrap();
    static ref LI_CLOSE: Regex = Regex::new(r"(?i)</li\s*>").unwrap();
    static ref LIST_BOUNDARY: Regex = Regex::new(r"(?i)</[uo]l>\s*<[uo]l(\s[^>]*)?>").unwrap();
    static ref LIST_OPEN: Regex = Regex::new(r"(?i)<[uo]l(\s[^>]*)?>").unwrap();
    static ref LIST_CLOSE: Regex = Regex::new(r"(?i)</[uo]l\s*>").unwrap();
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref BLANK_LINE_SPACES: Regex = Regex::new(r"\n[ \t]+\n").unwrap();
}

/// Converts an HTML fragment to plain text
///
/// Paragraphs become blank-line separated blocks, list items become
/// `"• "` bullet lines, every other tag is dropped and entities are decoded.
///
/// # Example
///
/// ```
/// use hn_distill::crawler::html_to_plain;
///
/// let text = html_to_plain("<p>Hello &amp; welcome</p><ul><li>One</li><li>Two</li></ul>");
/// assert_eq!(text, "Hello & welcome\n\n• One\n• Two");
/// ```
pub fn html_to_plain(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let limited = clamp(input, MAX_INPUT_CHARS);
    let para = PARA_MARK.to_string();
    let bullet = "\n• ";

    let h = BR.replace_all(&limited, "\n");
    let h = PARA_BOUNDARY.replace_all(&h, para.as_str());
    let h = PARA_OPEN.replace_all(&h, para.as_str());
    let h = PARA_CLOSE.replace_all(&h, "");
    let h = LI_OPEN.replace_all(&h, bullet);
    let h = LI_CLOSE.replace_all(&h, "");
    let h = LIST_BOUNDARY.replace_all(&h, para.as_str());
    let h = LIST_OPEN.replace_all(&h, para.as_str());
    let h = LIST_CLOSE.replace_all(&h, "");

    let fragment = Html::parse_fragment(&h);
    let mut text = String::with_capacity(h.len());
    collect_text(fragment.root_element(), &mut text);

    let text = text.replace(PARA_MARK, PARAGRAPH_BREAK);
    let text = BLANK_LINE_SPACES.replace_all(&text, "\n\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Appends the rendered text of `element` to `out`, skipping non-text elements
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Truncates `s` to at most `n` characters
///
/// # Example
///
/// ```
/// use hn_distill::crawler::clamp;
///
/// assert_eq!(clamp("abc", 2), "ab");
/// assert_eq!(clamp("abc", 3), "abc");
/// ```
pub fn clamp(s: &str, n: usize) -> String {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Extracts readable text from a full article page
///
/// Headings, paragraphs, list items and preformatted blocks are kept in
/// document order (headings as `#` lines), separated by blank lines, and the
/// result is clamped to `limit` characters. Pages without such blocks fall
/// back to the whole body text.
pub fn article_text(html: &str, limit: usize) -> String {
    let document = Html::parse_document(html);

    let mut blocks: Vec<String> = Vec::new();
    if let Ok(selector) = Selector::parse("h1, h2, h3, p, li, pre, blockquote") {
        for element in document.select(&selector) {
            // Nested matches (a <p> inside a <li>) are rendered by their ancestor
            if has_block_ancestor(element) {
                continue;
            }

            let mut text = String::new();
            collect_text(element, &mut text);
            let text = collapse_whitespace(&text);
            if text.is_empty() {
                continue;
            }

            let block = match element.value().name() {
                "h1" => format!("# {}", text),
                "h2" => format!("## {}", text),
                "h3" => format!("### {}", text),
                "li" => format!("- {}", text),
                _ => text,
            };
            blocks.push(block);
        }
    }

    if blocks.is_empty() {
        if let Ok(body) = Selector::parse("body") {
            if let Some(body) = document.select(&body).next() {
                let mut text = String::new();
                collect_text(body, &mut text);
                let text = collapse_whitespace(&text);
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
        }
    }

    clamp(&blocks.join("\n\n"), limit)
}

fn has_block_ancestor(element: ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|a| {
        matches!(
            a.value().name(),
            "p" | "li" | "pre" | "blockquote" | "h1" | "h2" | "h3"
        )
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
