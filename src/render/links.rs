//! The link hoister.
//!
//! Gemtext forbids inline links, so every link or image found inside a
//! finished block is re-emitted below it as its own `=> ` line. Collection
//! is depth-first with children before the link itself, and a footnote's
//! definition subtree is walked right after the link referencing it, so
//! nested links keep source order.

use std::fmt::Write as _;

use crate::ast::{Block, Inline, List, Table, TableCell};
use crate::error::Error;
use crate::render::{inline, Budget, LINK_PREFIX};

/// Whether a paragraph consists of links and images only (incidental
/// whitespace allowed), making it a pure link block.
pub(crate) fn is_links_only(inlines: &[Inline]) -> bool {
    inlines.iter().all(|inline| {
        matches!(inline, Inline::Link { .. } | Inline::Image { .. }) || inline.is_blank()
    })
}

pub(crate) fn collect_inlines<'a>(
    inlines: &'a [Inline],
    budget: Budget,
) -> Result<Vec<&'a Inline>, Error> {
    let mut found = Vec::new();
    for inline in inlines {
        collect_inline(inline, &mut found, budget)?;
    }
    Ok(found)
}

pub(crate) fn collect_blocks<'a>(
    blocks: &'a [Block],
    budget: Budget,
) -> Result<Vec<&'a Inline>, Error> {
    let mut found = Vec::new();
    for block in blocks {
        collect_block(block, &mut found, budget)?;
    }
    Ok(found)
}

pub(crate) fn collect_list<'a>(list: &'a List, budget: Budget) -> Result<Vec<&'a Inline>, Error> {
    let mut found = Vec::new();
    collect_in_list(list, &mut found, budget)?;
    Ok(found)
}

pub(crate) fn collect_table<'a>(
    table: &'a Table,
    budget: Budget,
) -> Result<Vec<&'a Inline>, Error> {
    let mut found = Vec::new();
    collect_in_table(table, &mut found, budget)?;
    Ok(found)
}

fn collect_block<'a>(
    block: &'a Block,
    found: &mut Vec<&'a Inline>,
    budget: Budget,
) -> Result<(), Error> {
    match block {
        Block::Paragraph(inlines)
        | Block::Heading {
            children: inlines, ..
        } => {
            for inline in inlines {
                collect_inline(inline, found, budget)?;
            }
        }
        Block::BlockQuote(children) => {
            let budget = budget.descend()?;
            for child in children {
                collect_block(child, found, budget)?;
            }
        }
        Block::List(list) => collect_in_list(list, found, budget.descend()?)?,
        Block::Table(table) => collect_in_table(table, found, budget.descend()?)?,
        Block::CodeBlock { .. } | Block::HtmlBlock(_) | Block::Rule => {}
    }
    Ok(())
}

fn collect_in_list<'a>(
    list: &'a List,
    found: &mut Vec<&'a Inline>,
    budget: Budget,
) -> Result<(), Error> {
    for item in &list.items {
        for block in &item.blocks {
            collect_block(block, found, budget)?;
        }
    }
    Ok(())
}

fn collect_in_table<'a>(
    table: &'a Table,
    found: &mut Vec<&'a Inline>,
    budget: Budget,
) -> Result<(), Error> {
    collect_cells(&table.header, found, budget)?;
    for row in &table.rows {
        collect_cells(row, found, budget)?;
    }
    Ok(())
}

fn collect_cells<'a>(
    cells: &'a [TableCell],
    found: &mut Vec<&'a Inline>,
    budget: Budget,
) -> Result<(), Error> {
    for cell in cells {
        for inline in cell {
            collect_inline(inline, found, budget)?;
        }
    }
    Ok(())
}

fn collect_inline<'a>(
    inline: &'a Inline,
    found: &mut Vec<&'a Inline>,
    budget: Budget,
) -> Result<(), Error> {
    match inline {
        Inline::Emph(children)
        | Inline::Strong(children)
        | Inline::Del(children)
        | Inline::Subscript(children)
        | Inline::Superscript(children) => {
            let budget = budget.descend()?;
            for child in children {
                collect_inline(child, found, budget)?;
            }
        }
        Inline::Link {
            children, footnote, ..
        } => {
            let inner = budget.descend()?;
            for child in children {
                collect_inline(child, found, inner)?;
            }
            found.push(inline);
            if let Some(footnote) = footnote {
                for block in &footnote.blocks {
                    collect_block(block, found, inner)?;
                }
            }
        }
        Inline::Image { children, .. } => {
            let inner = budget.descend()?;
            for child in children {
                collect_inline(child, found, inner)?;
            }
            found.push(inline);
        }
        _ => {}
    }
    Ok(())
}

type Pass = fn(&mut String, &[&Inline], Budget) -> Result<usize, Error>;

/// Emit the hoisted link block: footnote definitions first, then images,
/// then plain links, each category in source order with a blank line after
/// every non-empty category.
pub(crate) fn links_list(out: &mut String, links: &[&Inline], budget: Budget) -> Result<(), Error> {
    let passes: [Pass; 3] = [footnote_definitions, images, plain_links];
    for pass in passes {
        if pass(out, links, budget)? > 0 {
            out.push('\n');
        }
    }
    Ok(())
}

fn footnote_definitions(
    out: &mut String,
    links: &[&Inline],
    budget: Budget,
) -> Result<usize, Error> {
    let mut count = 0;
    for link in links {
        if let Inline::Link {
            footnote: Some(footnote),
            ..
        } = link
        {
            let text = inline::flat_blocks(&footnote.blocks, budget)?;
            let _ = write!(out, "[^{}]: {}", footnote.ordinal, text);
            out.push('\n');
            count += 1;
        }
    }
    Ok(count)
}

fn images(out: &mut String, links: &[&Inline], budget: Budget) -> Result<usize, Error> {
    let mut count = 0;
    for link in links {
        if let Inline::Image { dest, children, .. } = link {
            link_line(out, dest, children, budget)?;
            count += 1;
        }
    }
    Ok(count)
}

fn plain_links(out: &mut String, links: &[&Inline], budget: Budget) -> Result<usize, Error> {
    let mut count = 0;
    for link in links {
        if let Inline::Link {
            dest,
            children,
            footnote: None,
            ..
        } = link
        {
            link_line(out, dest, children, budget)?;
            count += 1;
        }
    }
    Ok(count)
}

fn link_line(
    out: &mut String,
    dest: &str,
    children: &[Inline],
    budget: Budget,
) -> Result<(), Error> {
    out.push_str(LINK_PREFIX);
    out.push_str(dest);
    out.push(' ');
    out.push_str(&inline::flat_inlines(children, budget)?);
    out.push('\n');
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
    fn categories_are_ordered_footnotes_images_links() {
        let source = "\
A line[^1] with ![a diagram](pic.png) and [a link](https://example.com/).

[^1]: Note text.
";
        assert_eq!(
            render(source),
            "\
A line[^1] with a diagram and a link.

[^1]: Note text.

=> pic.png a diagram

=> https://example.com/ a link
"
        );
    }

    #[test]
    fn duplicate_destinations_are_not_deduplicated() {
        let out = render("[one](https://example.com/) and [two](https://example.com/).");
        assert_eq!(
            out,
            "\
one and two.

=> https://example.com/ one
=> https://example.com/ two
"
        );
    }

    #[test]
    fn empty_label_keeps_the_destination_line() {
        let out = render("[](gemini://example.com/)");
        assert_eq!(out, "=> gemini://example.com/ \n");
    }

    #[test]
    fn whitespace_between_links_is_still_links_only() {
        let out = render("[a](gemini://a/)\n[b](gemini://b/)\n");
        assert_eq!(out, "=> gemini://a/ a\n=> gemini://b/ b\n");
    }
}
