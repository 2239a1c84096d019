//! Input sanitisation applied before validation.

use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

/// Remove anything that looks like a markup tag, then trim.
pub fn strip_html_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").trim().to_string()
}

/// Trim, then escape the five HTML-significant characters.
pub fn sanitize_string(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            c => out.push(c),
        }
    }
    out
}

pub fn sanitize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Free text: tags stripped, then escaped.
pub fn sanitize_text(input: &str) -> String {
    sanitize_string(&strip_html_tags(input))
}
