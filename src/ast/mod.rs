//! The document tree the renderer consumes, plus the bridge that builds it
//! from pulldown-cmark events.

pub mod block;
pub mod inline;
pub mod parse;

pub use block::{Block, List, ListItem, Table, TableCell};
pub use inline::{Footnote, Inline};

use crate::error::Error;

/// A parsed, read-only Markdown document.
///
/// Built once per input, consumed by any number of render calls; the renderer
/// never mutates it, so sharing a document across threads is safe.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse Markdown source with the extensions the Gemtext renderer
    /// understands (tables, footnotes, strikethrough, sub/superscript,
    /// definition lists, task lists).
    pub fn parse(source: &str) -> Result<Self, Error> {
        let events: Vec<_> =
            pulldown_cmark::Parser::new_ext(source, parse::gemtext_options()).collect();
        Self::from_events(&events)
    }

    /// Build a document from an already-collected event slice.
    pub fn from_events(events: &[pulldown_cmark::Event<'_>]) -> Result<Self, Error> {
        Ok(Document {
            blocks: parse::events_to_blocks(events)?,
        })
    }
}
