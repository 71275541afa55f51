//! The Gemtext writer.
//!
//! Gemtext is line-oriented while the document tree is nesting-oriented, so
//! every block is visited twice (entering and leaving): containers buffer and
//! inspect their descendants before deciding how to terminate a line. After a
//! link-bearing block finishes, the link hoister re-emits the links it found
//! inside as a trailing block of `=> ` lines.

pub mod html;
pub mod inline;
pub mod links;
pub mod list;
pub mod table;

use crate::ast::{Block, Document, Inline, List, Table};
use crate::error::Error;
use crate::text::Region;

pub(crate) const LINK_PREFIX: &str = "=> ";
pub(crate) const QUOTE_PREFIX: &str = "> ";
pub(crate) const ITEM_PREFIX: &str = "* ";
pub(crate) const FENCE: &str = "```";
pub(crate) const HORIZONTAL_RULE: &str = "---";

/// Per-call renderer configuration.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Cap heading depth at three `#` characters. Older Gemini client
    /// conventions allowed three at most; current ones do not care, so this
    /// is off by default.
    pub clamp_headings: bool,
    /// Maximum container nesting depth before rendering fails with
    /// [`Error::NestingTooDeep`], keeping adversarial documents from
    /// exhausting the stack.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            clamp_headings: false,
            max_depth: 128,
        }
    }
}

/// Remaining traversal depth, decremented on every recursive descent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Budget {
    remaining: usize,
    limit: usize,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Budget {
            remaining: limit,
            limit,
        }
    }

    pub(crate) fn descend(self) -> Result<Self, Error> {
        match self.remaining.checked_sub(1) {
            Some(remaining) => Ok(Budget {
                remaining,
                limit: self.limit,
            }),
            None => Err(Error::NestingTooDeep { limit: self.limit }),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Entering,
    Leaving,
}

/// Render a document tree to Gemtext.
///
/// The tree is read-only; all bookkeeping lives in the writer, so one
/// document may be rendered from several threads at once.
pub fn render_document(document: &Document, options: &RenderOptions) -> Result<String, Error> {
    let mut writer = Writer {
        out: String::new(),
        options,
    };
    let budget = Budget::new(options.max_depth);
    for block in &document.blocks {
        writer.block(block, Phase::Entering, budget)?;
        writer.block(block, Phase::Leaving, budget)?;
    }
    let mut out = writer.out;
    strip_trailing_blanks(&mut out);
    Ok(out)
}

/// Collapse any run of trailing blank lines to at most a single newline.
pub(crate) fn strip_trailing_blanks(out: &mut String) {
    while out.ends_with("\n\n") {
        out.pop();
    }
}

struct Writer<'a> {
    out: String,
    options: &'a RenderOptions,
}

impl Writer<'_> {
    fn block(&mut self, block: &Block, phase: Phase, budget: Budget) -> Result<(), Error> {
        match block {
            Block::Heading { level, children } => self.heading(*level, children, phase, budget)?,
            Block::Paragraph(inlines) => self.paragraph(inlines, phase, budget)?,
            Block::BlockQuote(children) => self.blockquote(children, phase, budget)?,
            Block::CodeBlock {
                fenced,
                info,
                literal,
            } => {
                if phase == Phase::Entering {
                    self.code(*fenced, info, literal);
                }
            }
            Block::List(list) => self.list(list, phase, budget)?,
            Block::Table(table) => self.table(table, phase, budget)?,
            Block::HtmlBlock(literal) => {
                if phase == Phase::Entering {
                    self.html_block(literal);
                }
            }
            Block::Rule => {
                if phase == Phase::Entering {
                    self.out.push_str(HORIZONTAL_RULE);
                    self.out.push_str("\n\n");
                }
            }
        }
        Ok(())
    }

    fn heading(
        &mut self,
        level: u8,
        children: &[Inline],
        phase: Phase,
        budget: Budget,
    ) -> Result<(), Error> {
        match phase {
            Phase::Entering => {
                let depth = if self.options.clamp_headings {
                    level.min(3)
                } else {
                    level
                };
                for _ in 0..depth {
                    self.out.push('#');
                }
                self.out.push(' ');
                inline::push_inlines(&mut self.out, children, inline::Breaks::FLAT, budget)?;
            }
            Phase::Leaving => self.out.push_str("\n\n"),
        }
        Ok(())
    }

    fn paragraph(&mut self, inlines: &[Inline], phase: Phase, budget: Budget) -> Result<(), Error> {
        // prose is only rendered when the paragraph is not a pure link
        // block; otherwise the hoisted `=> ` lines are the whole output
        let links_only = links::is_links_only(inlines);
        match phase {
            Phase::Entering => {
                if !links_only {
                    inline::push_inlines(&mut self.out, inlines, inline::Breaks::PARAGRAPH, budget)?;
                    self.out.push('\n');
                }
            }
            Phase::Leaving => {
                if !links_only {
                    self.out.push('\n');
                }
                let found = links::collect_inlines(inlines, budget)?;
                links::links_list(&mut self.out, &found, budget)?;
            }
        }
        Ok(())
    }

    fn blockquote(&mut self, children: &[Block], phase: Phase, budget: Budget) -> Result<(), Error> {
        match phase {
            Phase::Entering => {
                for child in children {
                    let mut text = String::new();
                    if let Block::HtmlBlock(literal) = child {
                        text = html::strip_block(literal);
                        if text.is_empty() {
                            continue;
                        }
                    } else {
                        inline::block_text(&mut text, child, inline::Breaks::QUOTE, budget)?;
                    }
                    let mut region = Region::from_str(&text);
                    if region.is_empty() {
                        self.out.push_str(QUOTE_PREFIX);
                    } else {
                        region.prefix_each_line(QUOTE_PREFIX);
                        self.out.push_str(&region.apply());
                    }
                    // blank line after every quoted unit: Gemini clients have
                    // no quote close marker, and adjacent quotes would merge
                    self.out.push_str("\n\n");
                }
            }
            Phase::Leaving => {
                let found = links::collect_blocks(children, budget)?;
                links::links_list(&mut self.out, &found, budget)?;
            }
        }
        Ok(())
    }

    fn code(&mut self, fenced: bool, info: &str, literal: &str) {
        self.out.push_str(FENCE);
        if fenced {
            self.out.push_str(info);
        }
        self.out.push('\n');
        self.out.push_str(literal);
        self.out.push_str(FENCE);
        self.out.push_str("\n\n");
    }

    fn list(&mut self, list: &List, phase: Phase, budget: Budget) -> Result<(), Error> {
        // nested lists are rendered recursively along with the first level
        if phase == Phase::Entering {
            return Ok(());
        }
        // pure link menus get no bullets, just the hoisted lines
        if !list::is_links_only_list(list) {
            list::render(&mut self.out, list, 0, budget)?;
            self.out.push('\n');
        }
        let found = links::collect_list(list, budget)?;
        links::links_list(&mut self.out, &found, budget)?;
        Ok(())
    }

    fn table(&mut self, table: &Table, phase: Phase, budget: Budget) -> Result<(), Error> {
        match phase {
            Phase::Entering => {
                self.out.push_str(FENCE);
                self.out.push('\n');
                self.out.push_str(&table::ascii_table(table, budget)?);
            }
            Phase::Leaving => {
                self.out.push_str(FENCE);
                self.out.push_str("\n\n");
                let found = links::collect_table(table, budget)?;
                links::links_list(&mut self.out, &found, budget)?;
            }
        }
        Ok(())
    }

    fn html_block(&mut self, literal: &str) {
        let text = html::strip_block(literal);
        if !text.is_empty() {
            self.out.push_str(&text);
            self.out.push_str("\n\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(source: &str) -> String {
        let document = Document::parse(source).expect("parse");
        render_document(&document, &RenderOptions::default()).expect("render")
    }

    #[test]
    fn horizontal_rule_markers_render_identically() {
        assert_eq!(render("---"), "---\n");
        assert_eq!(render("***"), "---\n");
        assert_eq!(render("___"), "---\n");
        assert_eq!(render("Test ---"), "Test ---\n");
        assert_eq!(render("Foo\n\n---\n\nBar"), "Foo\n\n---\n\nBar\n");
        assert_eq!(
            render("Foo\n\n---\n\n---\n\nBar"),
            "Foo\n\n---\n\n---\n\nBar\n"
        );
    }

    #[test]
    fn heading_depth_matches_source() {
        assert_eq!(render("# One"), "# One\n");
        assert_eq!(render("#### Four"), "#### Four\n");
    }

    #[test]
    fn heading_clamp_is_opt_in() {
        let document = Document::parse("##### Five").expect("parse");
        let options = RenderOptions {
            clamp_headings: true,
            ..RenderOptions::default()
        };
        assert_eq!(
            render_document(&document, &options).expect("render"),
            "### Five\n"
        );
    }

    #[test]
    fn links_only_paragraph_has_no_prose_line() {
        let out = render("[a](gemini://a/)\n[b](gemini://b/)");
        assert_eq!(out, "=> gemini://a/ a\n=> gemini://b/ b\n");
    }

    #[test]
    fn mixed_paragraph_hoists_links_after_prose() {
        let out = render("See [the site](https://example.com/) for more.");
        assert_eq!(
            out,
            "See the site for more.\n\n=> https://example.com/ the site\n"
        );
    }

    #[test]
    fn adjacent_blockquotes_stay_separated() {
        let out = render("> first\n\n> second");
        assert_eq!(out, "> first\n\n> second\n");
    }

    #[test]
    fn multiline_quote_keeps_the_prefix() {
        let out = render("> line one\n> line two");
        assert_eq!(out, "> line one\n> line two\n");
    }

    #[test]
    fn code_block_keeps_info_string() {
        let out = render("```rust\nfn main() {}\n```");
        assert_eq!(out, "```rust\nfn main() {}\n```\n");
    }

    #[test]
    fn trailing_blank_strip_is_idempotent() {
        let mut out = "text\n\n\n\n".to_string();
        strip_trailing_blanks(&mut out);
        assert_eq!(out, "text\n");
        strip_trailing_blanks(&mut out);
        assert_eq!(out, "text\n");
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let source = "> ".repeat(200) + "quote";
        let document = Document::parse(&source).expect("parse");
        let err = render_document(&document, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { limit: 128 }));
    }
}
