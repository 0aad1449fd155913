//! Markdown rendering for user-authored community text.
//!
//! Raw HTML in the source is dropped and links with script-capable schemes
//! are neutralized, so the output is safe for `dangerous_inner_html`.

use dioxus::prelude::*;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};

fn parser_options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts
}

fn is_safe_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    match lower.split_once(':') {
        // No scheme, or the colon is part of a path/query
        None => true,
        Some((scheme, _)) if scheme.contains(['/', '?', '#']) => true,
        Some((scheme, _)) => matches!(scheme, "http" | "https" | "mailto"),
    }
}

fn sanitize(event: Event<'_>) -> Option<Event<'_>> {
    match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Some(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        })),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Some(Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        })),
        other => Some(other),
    }
}

/// Render `source` to sanitized HTML.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, parser_options()).filter_map(sanitize);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

#[component]
pub fn Markdown(source: String, #[props(default)] class: String) -> Element {
    let html = render_markdown(&source);

    rsx! {
        div {
            class: "markdown {class}",
            dangerous_inner_html: "{html}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_formatting() {
        let html = render_markdown("# Rules\n\n- Be **kind**\n- No spam");
        assert!(html.contains("<h1>Rules</h1>"));
        assert!(html.contains("<strong>kind</strong>"));
        assert!(html.contains("<li>No spam</li>"));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let html = render_markdown("Hello <script>alert(1)</script>\n\n<div onclick=\"x()\">hi</div>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn test_script_links_are_neutralized() {
        let html = render_markdown("[click](javascript:alert(1)) [ok](https://example.com)");
        assert!(!html.contains("javascript:"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn test_url_schemes() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("/community/1/about"));
        assert!(is_safe_url("mailto:hi@example.com"));
        assert!(is_safe_url("page?x=a:b"));
        assert!(!is_safe_url(" JavaScript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,xx"));
    }
}
