//! HTML helpers for replies.
//!
//! Replies marked as HTML are injected into the page as-is, so every piece of
//! user-controlled text goes through [`escape_html`] before it lands in one.
//! [`render_markdown`] is what `cat` and the welcome banner use for `.md`
//! content. Files can be written from the editor, so it treats the markdown
//! as untrusted.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::Regex;

// constant pattern, forced by test_to_plain_text
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br\s*/?>|<[^>]+>").expect("valid tag regex"));

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Drops the markup from an HTML reply for places that can't render it.
/// `<br>` becomes a newline, the common entities are decoded.
pub fn to_plain_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, |caps: &regex::Captures| {
        if caps[0].starts_with("<br") {
            "\n".to_string()
        } else {
            String::new()
        }
    });
    stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// `inner` must already be safe HTML
pub fn paragraph(inner: &str) -> String {
    format!("<p>{}</p>", inner)
}

pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

/// `color` is trusted, the customization store only accepts hex codes and
/// plain colour names
pub fn colored_span(text: &str, color: &str) -> String {
    format!("<span style=\"color: {};\">{}</span>", color, escape_html(text))
}

pub fn command_not_found(line: &str) -> String {
    paragraph(&format!(
        "{}&nbsp;Command not found! Type <code>help</code> to know all options.",
        code(line)
    ))
}

// only these schemes survive in link and image targets, relative urls always do
const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(pos) if url[pos..].starts_with(':') => {
            let scheme = url[..pos].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

fn neutralise(dest_url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest_url) {
        dest_url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Markdown to HTML. Raw HTML in the source is shown as text, never
/// injected, and links or images pointing at other schemes (`javascript:`
/// and friends) are pointed at `#` instead.
pub fn render_markdown(src: &str) -> String {
    let events = Parser::new_ext(src, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralise(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(src.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}
