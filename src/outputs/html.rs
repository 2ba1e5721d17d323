//! Markdown rendering for the result view.
//!
//! The digest is rendered with CommonMark plus tables and strikethrough. Raw
//! HTML inside the model's output is shown as text rather than injected into
//! the page, and link or image destinations with a scheme other than
//! `http`, `https` or `mailto` are replaced with `#`.

use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::Start(Tag::Link(kind, dest, title)) => {
            Event::Start(Tag::Link(kind, safe_destination(dest), title))
        }
        Event::Start(Tag::Image(kind, dest, title)) => {
            Event::Start(Tag::Image(kind, safe_destination(dest), title))
        }
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    if has_allowed_scheme(&dest) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

/// Relative destinations carry no scheme and are allowed. Browsers ignore
/// whitespace and control characters inside a scheme, so those are dropped
/// before the comparison.
fn has_allowed_scheme(dest: &str) -> bool {
    let cleaned: String = dest
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match cleaned.find([':', '/', '?', '#']) {
        Some(i) if cleaned[i..].starts_with(':') => ALLOWED_SCHEMES
            .iter()
            .any(|scheme| cleaned[..i].eq_ignore_ascii_case(scheme)),
        _ => true,
    }
}

/// Escape text for use in HTML element content or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}
