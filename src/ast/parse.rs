//! Bridge from pulldown-cmark events to the document tree.
//!
//! A stack of open containers mirrors the Start/End structure of the event
//! stream. Footnote definitions are lifted out of the block stream and
//! attached to the links that reference them, the way the renderer wants to
//! see them.

use std::collections::HashMap;
use std::sync::Arc;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Tag};
use tracing::debug;

use crate::ast::block::{Block, List, ListItem, TableCell};
use crate::ast::inline::{Footnote, Inline};
use crate::ast::Table;
use crate::error::Error;

/// Hard cap on open containers while building the tree. The renderer applies
/// its own, configurable budget; this one keeps pathological input from
/// producing a tree whose resolution pass and drop glue recurse deeper than
/// the thread stack allows.
const MAX_NESTING: usize = 1024;

/// Parser extensions the Gemtext renderer knows how to lower.
pub fn gemtext_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SUPERSCRIPT
        | Options::ENABLE_SUBSCRIPT
        | Options::ENABLE_DEFINITION_LIST
}

struct Frame<'a> {
    tag: Tag<'a>,
    inlines: Vec<Inline>,
    blocks: Vec<Block>,
    items: Vec<ListItem>,
    cells: Vec<TableCell>,
    header: Vec<TableCell>,
    rows: Vec<Vec<TableCell>>,
    literal: String,
    collects_inlines: bool,
}

impl<'a> Frame<'a> {
    fn new(tag: Tag<'a>) -> Self {
        let collects_inlines = matches!(
            tag,
            Tag::Paragraph
                | Tag::Heading { .. }
                | Tag::Emphasis
                | Tag::Strong
                | Tag::Strikethrough
                | Tag::Subscript
                | Tag::Superscript
                | Tag::Link { .. }
                | Tag::Image { .. }
                | Tag::TableCell
                | Tag::DefinitionListTitle
        );
        Frame {
            tag,
            inlines: Vec::new(),
            blocks: Vec::new(),
            items: Vec::new(),
            cells: Vec::new(),
            header: Vec::new(),
            rows: Vec::new(),
            literal: String::new(),
            collects_inlines,
        }
    }

    /// Code, HTML and metadata blocks collect raw text instead of inlines.
    fn collects_literal(&self) -> bool {
        matches!(
            self.tag,
            Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::MetadataBlock(_)
        )
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn top_collects_literal(stack: &[Frame<'_>]) -> bool {
    stack.last().is_some_and(Frame::collects_literal)
}

fn push_literal_str(stack: &mut [Frame<'_>], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.literal.push_str(text);
    }
}

fn attach_block(stack: &mut [Frame<'_>], out: &mut Vec<Block>, block: Block) {
    match stack.last_mut() {
        Some(top) => top.blocks.push(block),
        None => out.push(block),
    }
}

fn attach_item(stack: &mut [Frame<'_>], out: &mut Vec<Block>, item: ListItem) {
    match stack.last_mut() {
        Some(top) => top.items.push(item),
        None => out.push(Block::List(List {
            ordered: false,
            items: vec![item],
        })),
    }
}

/// Inline spans inside a block-collecting frame get merged into its trailing
/// paragraph, so runs of text in tight list items stay together.
fn push_inline_to_blocks(blocks: &mut Vec<Block>, inline: Inline) {
    if let Some(Block::Paragraph(inlines)) = blocks.last_mut() {
        inlines.push(inline);
    } else {
        blocks.push(Block::Paragraph(vec![inline]));
    }
}

fn attach_inline(stack: &mut [Frame<'_>], out: &mut Vec<Block>, inline: Inline) {
    match stack.last_mut() {
        Some(top) if top.collects_inlines => top.inlines.push(inline),
        Some(top) => push_inline_to_blocks(&mut top.blocks, inline),
        None => out.push(Block::Paragraph(vec![inline])),
    }
}

/// Convert an event slice into block nodes.
///
/// Unbalanced streams surface [`Error::MalformedDocument`] instead of being
/// silently patched up: the caller is expected to regenerate the parse.
pub fn events_to_blocks(events: &[Event<'_>]) -> Result<Vec<Block>, Error> {
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut out: Vec<Block> = Vec::new();
    let mut defs: HashMap<String, Vec<Block>> = HashMap::new();

    for event in events {
        match event {
            Event::Start(tag) => {
                if stack.len() >= MAX_NESTING {
                    return Err(Error::NestingTooDeep { limit: MAX_NESTING });
                }
                stack.push(Frame::new(tag.clone()));
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| Error::MalformedDocument {
                    context: "close event without a matching open".to_string(),
                })?;
                close_frame(frame, &mut stack, &mut out, &mut defs);
            }
            Event::Text(text) => {
                if top_collects_literal(&stack) {
                    push_literal_str(&mut stack, text);
                } else {
                    attach_inline(&mut stack, &mut out, Inline::Text(text.to_string()));
                }
            }
            Event::Code(text) => {
                attach_inline(&mut stack, &mut out, Inline::Code(text.to_string()));
            }
            Event::InlineHtml(html) => {
                attach_inline(&mut stack, &mut out, Inline::Html(html.to_string()));
            }
            Event::Html(html) => {
                if top_collects_literal(&stack) {
                    push_literal_str(&mut stack, html);
                } else if let Some(top) = stack.last_mut() {
                    if top.collects_inlines {
                        top.inlines.push(Inline::Html(html.to_string()));
                    } else {
                        top.blocks.push(Block::HtmlBlock(html.to_string()));
                    }
                } else {
                    out.push(Block::HtmlBlock(html.to_string()));
                }
            }
            Event::SoftBreak => {
                if top_collects_literal(&stack) {
                    push_literal_str(&mut stack, "\n");
                } else {
                    attach_inline(&mut stack, &mut out, Inline::SoftBreak);
                }
            }
            Event::HardBreak => {
                if top_collects_literal(&stack) {
                    push_literal_str(&mut stack, "\n");
                } else {
                    attach_inline(&mut stack, &mut out, Inline::HardBreak);
                }
            }
            Event::Rule => attach_block(&mut stack, &mut out, Block::Rule),
            Event::FootnoteReference(label) => {
                attach_inline(
                    &mut stack,
                    &mut out,
                    Inline::FootnoteReference(label.to_string()),
                );
            }
            Event::TaskListMarker(checked) => {
                let marker = if *checked { "[x] " } else { "[ ] " };
                attach_inline(&mut stack, &mut out, Inline::Text(marker.to_string()));
            }
            Event::InlineMath(math) => {
                attach_inline(&mut stack, &mut out, Inline::Text(format!("${math}$")));
            }
            Event::DisplayMath(math) => {
                attach_inline(&mut stack, &mut out, Inline::Text(format!("$${math}$$")));
            }
        }
    }

    if !stack.is_empty() {
        return Err(Error::MalformedDocument {
            context: format!("{} unclosed container(s) at end of input", stack.len()),
        });
    }

    resolve_footnotes(&mut out, &mut defs);
    Ok(out)
}

fn close_frame(
    frame: Frame<'_>,
    stack: &mut Vec<Frame<'_>>,
    out: &mut Vec<Block>,
    defs: &mut HashMap<String, Vec<Block>>,
) {
    match frame.tag {
        Tag::Paragraph => attach_block(stack, out, Block::Paragraph(frame.inlines)),
        Tag::Heading { level, .. } => attach_block(
            stack,
            out,
            Block::Heading {
                level: heading_depth(level),
                children: frame.inlines,
            },
        ),
        Tag::BlockQuote(_) => attach_block(stack, out, Block::BlockQuote(frame.blocks)),
        Tag::CodeBlock(kind) => {
            let (fenced, info) = match kind {
                CodeBlockKind::Fenced(info) => (true, info.to_string()),
                CodeBlockKind::Indented => (false, String::new()),
            };
            let mut literal = frame.literal;
            if !literal.is_empty() && !literal.ends_with('\n') {
                literal.push('\n');
            }
            attach_block(
                stack,
                out,
                Block::CodeBlock {
                    fenced,
                    info,
                    literal,
                },
            );
        }
        Tag::HtmlBlock => attach_block(stack, out, Block::HtmlBlock(frame.literal)),
        Tag::List(start) => attach_block(
            stack,
            out,
            Block::List(List {
                ordered: start.is_some(),
                items: frame.items,
            }),
        ),
        Tag::Item => attach_item(
            stack,
            out,
            ListItem {
                term: false,
                blocks: frame.blocks,
            },
        ),
        Tag::DefinitionList => attach_block(
            stack,
            out,
            Block::List(List {
                ordered: false,
                items: frame.items,
            }),
        ),
        Tag::DefinitionListTitle => attach_item(
            stack,
            out,
            ListItem {
                term: true,
                blocks: vec![Block::Paragraph(frame.inlines)],
            },
        ),
        Tag::DefinitionListDefinition => attach_item(
            stack,
            out,
            ListItem {
                term: false,
                blocks: frame.blocks,
            },
        ),
        Tag::FootnoteDefinition(label) => {
            defs.insert(label.to_string(), frame.blocks);
        }
        Tag::Table(_) => attach_block(
            stack,
            out,
            Block::Table(Table {
                header: frame.header,
                rows: frame.rows,
            }),
        ),
        Tag::TableHead => {
            if let Some(top) = stack.last_mut() {
                top.header = frame.cells;
            }
        }
        Tag::TableRow => {
            if let Some(top) = stack.last_mut() {
                top.rows.push(frame.cells);
            }
        }
        Tag::TableCell => {
            if let Some(top) = stack.last_mut() {
                top.cells.push(frame.inlines);
            }
        }
        Tag::Emphasis => attach_inline(stack, out, Inline::Emph(frame.inlines)),
        Tag::Strong => attach_inline(stack, out, Inline::Strong(frame.inlines)),
        Tag::Strikethrough => attach_inline(stack, out, Inline::Del(frame.inlines)),
        Tag::Subscript => attach_inline(stack, out, Inline::Subscript(frame.inlines)),
        Tag::Superscript => attach_inline(stack, out, Inline::Superscript(frame.inlines)),
        Tag::Link {
            dest_url, title, ..
        } => attach_inline(
            stack,
            out,
            Inline::Link {
                dest: dest_url.to_string(),
                title: title.to_string(),
                children: frame.inlines,
                footnote: None,
            },
        ),
        Tag::Image {
            dest_url, title, ..
        } => attach_inline(
            stack,
            out,
            Inline::Image {
                dest: dest_url.to_string(),
                title: title.to_string(),
                children: frame.inlines,
            },
        ),
        // front matter handled elsewhere; an embedded metadata block is noise
        Tag::MetadataBlock(_) => {}
    }
}

/// Replace footnote references with links carrying their definition subtree.
/// Ordinals are assigned in order of first reference, which is also the
/// order the link hoister will print the definitions in.
fn resolve_footnotes(blocks: &mut [Block], defs: &mut HashMap<String, Vec<Block>>) {
    let mut resolved: HashMap<String, Arc<Footnote>> = HashMap::new();
    let mut next_ordinal = 1usize;
    resolve_in_blocks(blocks, defs, &mut resolved, &mut next_ordinal);
    if !defs.is_empty() {
        debug!(
            count = defs.len(),
            "dropping unreferenced footnote definitions"
        );
    }
}

fn resolve_in_blocks(
    blocks: &mut [Block],
    defs: &mut HashMap<String, Vec<Block>>,
    resolved: &mut HashMap<String, Arc<Footnote>>,
    next_ordinal: &mut usize,
) {
    for block in blocks {
        match block {
            Block::Paragraph(inlines) | Block::Heading {
                children: inlines, ..
            } => resolve_in_inlines(inlines, defs, resolved, next_ordinal),
            Block::BlockQuote(children) => {
                resolve_in_blocks(children, defs, resolved, next_ordinal);
            }
            Block::List(list) => {
                for item in &mut list.items {
                    resolve_in_blocks(&mut item.blocks, defs, resolved, next_ordinal);
                }
            }
            Block::Table(table) => {
                for cell in &mut table.header {
                    resolve_in_inlines(cell, defs, resolved, next_ordinal);
                }
                for row in &mut table.rows {
                    for cell in row {
                        resolve_in_inlines(cell, defs, resolved, next_ordinal);
                    }
                }
            }
            Block::CodeBlock { .. } | Block::HtmlBlock(_) | Block::Rule => {}
        }
    }
}

fn resolve_in_inlines(
    inlines: &mut [Inline],
    defs: &mut HashMap<String, Vec<Block>>,
    resolved: &mut HashMap<String, Arc<Footnote>>,
    next_ordinal: &mut usize,
) {
    for inline in inlines {
        if let Inline::FootnoteReference(label) = inline {
            let label = label.clone();
            let footnote = if let Some(footnote) = resolved.get(&label) {
                Some(footnote.clone())
            } else if let Some(blocks) = defs.remove(&label) {
                // definition bodies are taken as-is; a footnote referencing
                // another footnote keeps the literal marker
                let footnote = Arc::new(Footnote {
                    ordinal: *next_ordinal,
                    blocks,
                });
                *next_ordinal += 1;
                resolved.insert(label, footnote.clone());
                Some(footnote)
            } else {
                debug!(%label, "footnote reference without a definition");
                None
            };
            if let Some(footnote) = footnote {
                *inline = Inline::Link {
                    dest: String::new(),
                    title: String::new(),
                    children: Vec::new(),
                    footnote: Some(footnote),
                };
            }
            continue;
        }
        match inline {
            Inline::Emph(children)
            | Inline::Strong(children)
            | Inline::Del(children)
            | Inline::Subscript(children)
            | Inline::Superscript(children)
            | Inline::Link { children, .. }
            | Inline::Image { children, .. } => {
                resolve_in_inlines(children, defs, resolved, next_ordinal);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::{Event, TagEnd};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Document;

    fn parse(source: &str) -> Vec<Block> {
        Document::parse(source).expect("parse").blocks
    }

    #[test]
    fn footnote_ordinals_follow_first_reference() {
        let blocks = parse("b[^b] then a[^a].\n\n[^a]: A text.\n[^b]: B text.\n");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph, got {blocks:?}");
        };
        let ordinals: Vec<usize> = inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Link {
                    footnote: Some(footnote),
                    ..
                } => Some(footnote.ordinal),
                _ => None,
            })
            .collect();
        assert_eq!(ordinals, vec![1, 2]);
        assert_eq!(blocks.len(), 1, "definitions are lifted out of the stream");
    }

    #[test]
    fn repeated_references_share_a_definition() {
        let blocks = parse("one[^n] two[^n].\n\n[^n]: Text.\n");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let footnotes: Vec<_> = inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Link {
                    footnote: Some(footnote),
                    ..
                } => Some(Arc::clone(footnote)),
                _ => None,
            })
            .collect();
        assert_eq!(footnotes.len(), 2);
        assert!(Arc::ptr_eq(&footnotes[0], &footnotes[1]));
    }

    #[test]
    fn definition_lists_become_term_items() {
        let blocks = parse("Term\n: definition\n");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list, got {blocks:?}");
        };
        assert!(!list.ordered);
        assert!(list.items[0].term);
        assert!(!list.items[1].term);
    }

    #[test]
    fn tight_list_text_is_wrapped_in_paragraphs() {
        let blocks = parse("* alpha\n* beta\n");
        let Block::List(list) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items.len(), 2);
        assert!(matches!(list.items[0].blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn pathological_nesting_is_rejected_while_parsing() {
        // deep enough that building (and dropping) the tree would blow the
        // thread stack if the cap ever regressed
        let source = "> ".repeat(50_000) + "quote";
        let err = Document::parse(&source).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { limit: MAX_NESTING }));
    }

    #[test]
    fn unbalanced_events_are_rejected() {
        let events = vec![Event::End(TagEnd::Paragraph)];
        let err = events_to_blocks(&events).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }
}
