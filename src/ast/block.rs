use crate::ast::inline::Inline;

/// Block level nodes of the document tree.
///
/// The tree is built once by the parser bridge and consumed read-only by the
/// renderer; containers own an ordered child sequence, leaves own a literal
/// payload.
#[derive(Clone, Debug)]
pub enum Block {
    Heading {
        /// 1-based heading depth as written in the source.
        level: u8,
        children: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    BlockQuote(Vec<Block>),
    List(List),
    CodeBlock {
        fenced: bool,
        /// Info string of a fenced block (`rust` in ` ```rust `), empty for
        /// indented blocks.
        info: String,
        literal: String,
    },
    Table(Table),
    /// Raw embedded HTML, kept verbatim for the sanitizer.
    HtmlBlock(String),
    Rule,
}

#[derive(Clone, Debug)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug)]
pub struct ListItem {
    /// Definition-list term items carry no marker and are separated from the
    /// preceding definition by a blank line.
    pub term: bool,
    pub blocks: Vec<Block>,
}

/// A table cell is plain inline content.
pub type TableCell = Vec<Inline>;

#[derive(Clone, Debug, Default)]
pub struct Table {
    pub header: Vec<TableCell>,
    pub rows: Vec<Vec<TableCell>>,
}
