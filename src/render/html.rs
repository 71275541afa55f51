//! Raw HTML sanitizing.
//!
//! Embedded markup is neither trusted nor rendered verbatim. Tags whose
//! contents are meaningless as plain text (scripts, styles, form controls)
//! are stripped together with everything inside them; for the rest the tags
//! go and the inner text stays, with entities decoded and `<br>` variants
//! turned into line breaks. Malformed markup degrades to stripped literal
//! text, never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::render::inline::replace_newlines;

/// Tag pairs that are removed together with their contents.
const NO_RENDER_TAGS: [&str; 8] = [
    "fieldset", "form", "iframe", "script", "style", "canvas", "dialog", "progress",
];

// fairly tolerant of weird attribute syntax
static NO_RENDER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NO_RENDER_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(
                concat!(
                    r#"(?is)<[\n\f ]*{tag}"#,
                    r#"([\n\f ]+[^\n\f />"'=]+[\n\f ]*(=[\n\f ]*([a-zA-Z1-9\-]+|"[^\n\f"]+"|'[^\n\f']+'))?)*"#,
                    r#"[\n\f ]*>.*?<[\n\f ]*/[\n\f ]*{tag}[\n\f ]*>"#,
                ),
                tag = tag
            ))
            .unwrap()
        })
        .collect()
});

static HARD_BREAK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"< *br */? *>").unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)</?[^>]*>").unwrap());

/// Whether an inline HTML fragment is some spelling of `<br>`.
pub(crate) fn is_hard_break(text: &str) -> bool {
    HARD_BREAK_TAG.is_match(text)
}

/// Reduce an HTML block to its plain text: denylisted tag pairs vanish with
/// their contents, newlines collapse to spaces, `<br>` becomes a real line
/// break, remaining tags are dropped and entities decoded.
pub(crate) fn strip_block(literal: &str) -> String {
    let mut stripped = literal.to_string();
    for pattern in NO_RENDER.iter() {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }
    if stripped.is_empty() {
        return String::new();
    }
    let collapsed = replace_newlines(&stripped, " ");
    let with_breaks = HARD_BREAK_TAG.replace_all(&collapsed, "\n");
    let text = ANY_TAG.replace_all(&with_breaks, "");
    html_escape::decode_html_entities(&text).trim().to_string()
}
