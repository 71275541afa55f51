//! Render Markdown to Gemtext (`text/gemini`) from pulldown-cmark events.
//!
//! Gemtext is strictly line-oriented: links, headings, quotes, list items
//! and preformatted fences each claim a whole line, and there is no inline
//! markup at all. This crate parses Markdown with [`pulldown_cmark`], builds
//! a small document tree, and renders it line by line. Every inline link and
//! image is hoisted out of running text into a trailing block of `=> ` link
//! lines, nested containers keep their quote and list prefixes on every
//! physical line, tables become preformatted ASCII grids, and embedded HTML
//! is stripped down to the text worth keeping.
//!
//! ```
//! use pulldown_cmark_gemtext::{render_markdown, RenderOptions};
//!
//! let gemtext = render_markdown(
//!     "# Hi\n\nSee [the docs](https://example.com/docs) for more.\n",
//!     &RenderOptions::default(),
//! )?;
//! assert_eq!(
//!     gemtext,
//!     "# Hi\n\nSee the docs for more.\n\n=> https://example.com/docs the docs\n"
//! );
//! # Ok::<(), pulldown_cmark_gemtext::Error>(())
//! ```
//!
//! [`render_post`] additionally understands Hugo-style front matter (YAML,
//! TOML, JSON or org-mode) and synthesizes a `# title` header with the post
//! date above the rendered body.

pub mod ast;
pub mod error;
pub mod meta;
pub mod render;
pub mod text;

pub use ast::Document;
pub use error::Error;
pub use meta::{parse_front_matter, Metadata};
pub use render::{render_document, RenderOptions};

use tracing::debug;

/// Parse Markdown source and render it to Gemtext. Front matter, if any,
/// is left in place; use [`render_post`] for content files that carry it.
pub fn render_markdown(source: &str, options: &RenderOptions) -> Result<String, Error> {
    let document = Document::parse(source)?;
    debug!(blocks = document.blocks.len(), "rendering parsed document");
    render::render_document(&document, options)
}

/// Render a content file: front matter is split off and, when it carries a
/// title, a `# title` header (plus the date, when one parses) is emitted
/// above the rendered body.
pub fn render_post(source: &str, options: &RenderOptions) -> Result<String, Error> {
    let (body, metadata) = meta::parse_front_matter(source);
    let mut out = String::new();
    if !metadata.title.is_empty() {
        out.push_str("# ");
        out.push_str(&metadata.title);
        out.push_str("\n\n");
        if let Some(date) = metadata.date() {
            out.push_str(&date.format("%Y-%m-%d %H:%M").to_string());
            out.push_str("\n\n");
        }
    }
    out.push_str(&render_markdown(body, options)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn post_header_carries_title_and_date() {
        let source = "---\ntitle: Hello\ndate: 2021-05-01T10:30:00+03:00\n---\nBody text.\n";
        let out = render_post(source, &RenderOptions::default()).expect("render");
        assert_eq!(out, "# Hello\n\n2021-05-01 10:30\n\nBody text.\n");
    }

    #[test]
    fn post_without_front_matter_is_just_the_body() {
        let out = render_post("Plain.\n", &RenderOptions::default()).expect("render");
        assert_eq!(out, "Plain.\n");
    }

    #[test]
    fn post_without_a_date_omits_the_date_line() {
        let source = "+++\ntitle = \"Hello\"\n+++\nBody text.\n";
        let out = render_post(source, &RenderOptions::default()).expect("render");
        assert_eq!(out, "# Hello\n\nBody text.\n");
    }
}
