//! The list renderer.
//!
//! The Gemini spec says nothing about lists nested deeper than one level,
//! so nesting is rendered Markdown-style: one tab of indentation per level,
//! `N. ` markers for ordered lists, `* ` for unordered ones, and no marker
//! for definition-list terms.

use std::fmt::Write as _;

use crate::ast::{Block, List};
use crate::error::Error;
use crate::render::{inline, links, Budget, ITEM_PREFIX};
use crate::text::{Fragment, Line};

/// A list whose items are all links-only paragraphs is a link menu: it gets
/// no bullets at all, only the hoisted `=> ` lines.
pub(crate) fn is_links_only_list(list: &List) -> bool {
    list.items.iter().all(|item| {
        item.blocks.iter().all(|block| match block {
            Block::Paragraph(inlines) => links::is_links_only(inlines),
            _ => false,
        })
    })
}

pub(crate) fn render(
    out: &mut String,
    list: &List,
    level: usize,
    budget: Budget,
) -> Result<(), Error> {
    for (number, item) in list.items.iter().enumerate() {
        if item.blocks.is_empty() {
            continue;
        }
        // blank line between a definition and the next term
        if item.term && number > 0 {
            out.push('\n');
        }
        let mut line = Line::new();
        if level > 0 {
            line.push(Fragment::tabs(level));
        }
        if list.ordered {
            let mut marker = String::new();
            let _ = write!(marker, "{}. ", number + 1);
            line.push(marker);
        } else if !item.term {
            line.push(ITEM_PREFIX);
        }
        let mut text = String::new();
        for block in &item.blocks {
            if !matches!(block, Block::List(_)) {
                inline::block_text(&mut text, block, inline::Breaks::FLAT, budget)?;
            }
        }
        line.push(text);
        out.push_str(&line.apply());
        out.push('\n');
        if let Some(Block::List(nested)) = item.blocks.get(1) {
            render(out, nested, level + 1, budget.descend()?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Document;
    use crate::render::{render_document, RenderOptions};

    fn render_source(source: &str) -> String {
        let document = Document::parse(source).expect("parse");
        render_document(&document, &RenderOptions::default()).expect("render")
    }

    #[test]
    fn nested_list_indents_one_tab_per_level() {
        let out = render_source("* outer\n    1. first\n    2. second\n* next");
        assert_eq!(out, "* outer\n\t1. first\n\t2. second\n* next\n");
    }

    #[test]
    fn ordered_numbering_restarts_per_nested_list() {
        let out = render_source("1. a\n    1. x\n    2. y\n2. b");
        assert_eq!(out, "1. a\n\t1. x\n\t2. y\n2. b\n");
    }

    #[test]
    fn ordered_numbering_ignores_the_start_offset() {
        let out = render_source("4. a\n5. b");
        assert_eq!(out, "1. a\n2. b\n");
    }

    #[test]
    fn definition_terms_carry_no_marker() {
        let out = render_source("Term one\n: first\n\nTerm two\n: second\n");
        assert_eq!(out, "Term one\n* first\n\nTerm two\n* second\n");
    }

    #[test]
    fn link_menu_list_renders_without_bullets() {
        let out = render_source("* [a](gemini://a/)\n* [b](gemini://b/)");
        assert_eq!(out, "=> gemini://a/ a\n=> gemini://b/ b\n");
    }

    #[test]
    fn mixed_list_keeps_bullets_and_hoists_links() {
        let out = render_source("* plain text\n* [a](gemini://a/)");
        assert_eq!(out, "* plain text\n* a\n\n=> gemini://a/ a\n");
    }
}
