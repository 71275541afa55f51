//! The inline composer.
//!
//! Gemtext has no inline styling, so span markers are preserved as a
//! plain-text convention: `` `code` ``, `*emph*`, `**strong**`,
//! `~~strikethrough~~`, and the ASCII math conventions `_{sub}` and
//! `^(sup)`. Newlines inside literal text are replaced per context so a
//! wrapped paragraph soft-wraps and quoted text stays quoted.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Block, Inline};
use crate::error::Error;
use crate::render::{html, Budget};

const CODE_DELIMITER: &str = "`";
const EMPH_DELIMITER: &str = "*";
const STRONG_DELIMITER: &str = "**";
const DEL_DELIMITER: &str = "~~";
const SUB_OPEN: &str = "_{";
const SUB_CLOSE: &str = "}";
const SUP_OPEN: &str = "^(";
const SUP_CLOSE: &str = ")";

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n\r]+").unwrap());

/// What soft and hard breaks turn into for the current context.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Breaks {
    pub soft: &'static str,
    pub hard: &'static str,
}

impl Breaks {
    /// Running prose: soft wrap per the Gemini spec, hard breaks kept.
    pub const PARAGRAPH: Breaks = Breaks {
        soft: " ",
        hard: "\n",
    };
    /// One-line extraction for headings, list items, table cells and link
    /// labels.
    pub const FLAT: Breaks = Breaks { soft: " ", hard: " " };
    /// Quoted text; the quote renderer re-prefixes every produced line.
    pub const QUOTE: Breaks = Breaks {
        soft: "\n",
        hard: "\n",
    };
}

/// Collapse every newline run in `text` to `replacement`.
pub(crate) fn replace_newlines(text: &str, replacement: &str) -> String {
    LINE_BREAKS.replace_all(text, replacement).into_owned()
}

pub(crate) fn push_inlines(
    out: &mut String,
    inlines: &[Inline],
    breaks: Breaks,
    budget: Budget,
) -> Result<(), Error> {
    for inline in inlines {
        push_inline(out, inline, breaks, budget)?;
    }
    Ok(())
}

pub(crate) fn push_inline(
    out: &mut String,
    inline: &Inline,
    breaks: Breaks,
    budget: Budget,
) -> Result<(), Error> {
    match inline {
        Inline::Text(text) => out.push_str(&replace_newlines(text, breaks.soft)),
        Inline::Code(text) => {
            out.push_str(CODE_DELIMITER);
            out.push_str(&replace_newlines(text, breaks.soft));
            out.push_str(CODE_DELIMITER);
        }
        Inline::Html(html) => {
            // inline tags are dropped; a lone <br> still breaks the line
            if html::is_hard_break(html) {
                out.push_str(breaks.hard);
            }
        }
        Inline::SoftBreak => out.push_str(breaks.soft),
        Inline::HardBreak => out.push_str(breaks.hard),
        Inline::Emph(children) => wrap(out, EMPH_DELIMITER, children, breaks, budget)?,
        Inline::Strong(children) => wrap(out, STRONG_DELIMITER, children, breaks, budget)?,
        Inline::Del(children) => wrap(out, DEL_DELIMITER, children, breaks, budget)?,
        Inline::Subscript(children) => {
            out.push_str(SUB_OPEN);
            push_inlines(out, children, Breaks::FLAT, budget.descend()?)?;
            out.push_str(SUB_CLOSE);
        }
        Inline::Superscript(children) => {
            out.push_str(SUP_OPEN);
            push_inlines(out, children, Breaks::FLAT, budget.descend()?)?;
            out.push_str(SUP_CLOSE);
        }
        Inline::Link {
            footnote: Some(footnote),
            ..
        } => {
            // the definition itself is emitted by the link hoister
            out.push_str(&format!("[^{}]", footnote.ordinal));
        }
        Inline::Link { children, .. } | Inline::Image { children, .. } => {
            push_inlines(out, children, breaks, budget.descend()?)?;
        }
        Inline::FootnoteReference(label) => {
            out.push_str("[^");
            out.push_str(label);
            out.push(']');
        }
    }
    Ok(())
}

fn wrap(
    out: &mut String,
    delimiter: &str,
    children: &[Inline],
    breaks: Breaks,
    budget: Budget,
) -> Result<(), Error> {
    out.push_str(delimiter);
    push_inlines(out, children, breaks, budget.descend()?)?;
    out.push_str(delimiter);
    Ok(())
}

/// One-line text of an inline run, for labels and cells.
pub(crate) fn flat_inlines(inlines: &[Inline], budget: Budget) -> Result<String, Error> {
    let mut out = String::new();
    push_inlines(&mut out, inlines, Breaks::FLAT, budget)?;
    Ok(out)
}

/// One-line text of a whole block subtree, for footnote definition labels.
pub(crate) fn flat_blocks(blocks: &[Block], budget: Budget) -> Result<String, Error> {
    let mut out = String::new();
    for block in blocks {
        block_text(&mut out, block, Breaks::FLAT, budget)?;
    }
    Ok(out)
}

/// Append the text of a block subtree, composing inlines with `breaks`.
/// Nested lists are skipped; the list renderer walks them itself.
pub(crate) fn block_text(
    out: &mut String,
    block: &Block,
    breaks: Breaks,
    budget: Budget,
) -> Result<(), Error> {
    match block {
        Block::Paragraph(inlines)
        | Block::Heading {
            children: inlines, ..
        } => push_inlines(out, inlines, breaks, budget)?,
        Block::BlockQuote(children) => {
            let budget = budget.descend()?;
            for child in children {
                block_text(out, child, breaks, budget)?;
            }
        }
        Block::List(list) => {
            let budget = budget.descend()?;
            for item in &list.items {
                for child in &item.blocks {
                    if !matches!(child, Block::List(_)) {
                        block_text(out, child, breaks, budget)?;
                    }
                }
            }
        }
        Block::Table(table) => {
            let budget = budget.descend()?;
            for cell in &table.header {
                push_inlines(out, cell, breaks, budget)?;
            }
            for row in &table.rows {
                for cell in row {
                    push_inlines(out, cell, breaks, budget)?;
                }
            }
        }
        Block::CodeBlock { literal, .. } | Block::HtmlBlock(literal) => {
            out.push_str(&replace_newlines(literal, breaks.soft));
        }
        Block::Rule => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Document;
    use crate::render::{render_document, RenderOptions};

    fn render(source: &str) -> String {
        let document = Document::parse(source).expect("parse");
        render_document(&document, &RenderOptions::default()).expect("render")
    }

    #[test]
    fn span_delimiters_are_preserved_as_convention() {
        assert_eq!(
            render("*a* **b** ~~c~~ `d`"),
            "*a* **b** ~~c~~ `d`\n"
        );
    }

    #[test]
    fn subscript_and_superscript_use_ascii_math() {
        assert_eq!(render("H~2~O and x^2^"), "H_{2}O and x^(2)\n");
    }

    #[test]
    fn soft_breaks_become_spaces_in_prose() {
        assert_eq!(render("one\ntwo"), "one two\n");
    }

    #[test]
    fn hard_breaks_survive_in_prose() {
        assert_eq!(render("one  \ntwo"), "one\ntwo\n");
    }

    #[test]
    fn inline_br_tag_breaks_the_line() {
        assert_eq!(render("one<br>two"), "one\ntwo\n");
    }

    #[test]
    fn other_inline_tags_are_dropped() {
        assert_eq!(render("a <span>b</span> c"), "a b c\n");
    }
}
