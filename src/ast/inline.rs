use std::sync::Arc;

use crate::ast::block::Block;

/// Inline level nodes. Span wrappers own their children; leaves own text.
#[derive(Clone, Debug)]
pub enum Inline {
    Text(String),
    Code(String),
    /// A raw inline HTML tag. Tags are stripped on output; `<br>` variants
    /// turn into hard breaks.
    Html(String),
    SoftBreak,
    HardBreak,
    Emph(Vec<Inline>),
    Strong(Vec<Inline>),
    Del(Vec<Inline>),
    Subscript(Vec<Inline>),
    Superscript(Vec<Inline>),
    Link {
        dest: String,
        title: String,
        children: Vec<Inline>,
        /// Present when this link is a footnote reference; the visible
        /// payload is then the synthetic marker `[^n]`.
        footnote: Option<Arc<Footnote>>,
    },
    Image {
        dest: String,
        title: String,
        children: Vec<Inline>,
    },
    /// A footnote reference whose definition was never found; rendered as the
    /// literal marker.
    FootnoteReference(String),
}

/// A resolved footnote definition, shared by every reference to it.
#[derive(Clone, Debug)]
pub struct Footnote {
    /// 1-based marker number, assigned in order of first reference.
    pub ordinal: usize,
    pub blocks: Vec<Block>,
}

impl Inline {
    /// Whether this node counts as incidental whitespace when deciding if a
    /// paragraph consists of links only.
    pub fn is_blank(&self) -> bool {
        match self {
            Inline::Text(t) => t.chars().all(char::is_whitespace),
            Inline::SoftBreak | Inline::HardBreak => true,
            _ => false,
        }
    }
}
