//! ASCII table rendering.
//!
//! Gemtext has no table syntax, so tables become an ASCII-art grid inside a
//! preformatted fence. Column widths are measured with unicode-width so CJK
//! and other wide text lines up in terminal clients.

use unicode_width::UnicodeWidthStr;

use crate::ast::{Table, TableCell};
use crate::error::Error;
use crate::render::{inline, Budget};
use crate::text::{Line, Region};

/// Build the bordered grid between the fences:
///
/// ```text
/// +------+-----+
/// | Name | Age |
/// +------+-----+
/// | Foo  | 42  |
/// +------+-----+
/// ```
pub(crate) fn ascii_table(table: &Table, budget: Budget) -> Result<String, Error> {
    let header = row_text(&table.header, budget)?;
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        rows.push(row_text(row, budget)?);
    }

    let columns = rows
        .iter()
        .chain(std::iter::once(&header))
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Ok(String::new());
    }
    let mut widths = vec![0usize; columns];
    for row in rows.iter().chain(std::iter::once(&header)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let border = border_line(&widths);
    let mut region = Region::new();
    region.push_back_line(border.clone());
    if !header.is_empty() {
        region.push_back_line(row_line(&header, &widths));
        region.push_back_line(border.clone());
    }
    for row in &rows {
        region.push_back_line(row_line(row, &widths));
    }
    if !rows.is_empty() || header.is_empty() {
        region.push_back_line(border);
    }
    let mut out = region.apply();
    out.push('\n');
    Ok(out)
}

fn row_text(cells: &[TableCell], budget: Budget) -> Result<Vec<String>, Error> {
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        out.push(inline::flat_inlines(cell, budget)?);
    }
    Ok(out)
}

fn border_line(widths: &[usize]) -> Line {
    let mut line = Line::from_str("+");
    for width in widths {
        line.push("-".repeat(width + 2));
        line.push("+");
    }
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> Line {
    let mut line = Line::from_str("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        line.push(" ");
        line.push(cell);
        line.push(" ".repeat(width - cell.width() + 1));
        line.push("|");
    }
    line
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
    fn table_renders_as_fenced_grid() {
        let out = render("| Name | Age |\n| ---- | --- |\n| Foo  | 42  |\n");
        assert_eq!(
            out,
            "\
```
+------+-----+
| Name | Age |
+------+-----+
| Foo  | 42  |
+------+-----+
```
"
        );
    }

    #[test]
    fn wide_cells_set_the_column_width() {
        let out = render("| a | b |\n| - | - |\n| longer | x |\n");
        assert_eq!(
            out,
            "\
```
+--------+---+
| a      | b |
+--------+---+
| longer | x |
+--------+---+
```
"
        );
    }

    #[test]
    fn cell_links_are_hoisted_after_the_fence() {
        let out = render("| h |\n| - |\n| [a](gemini://a/) |\n");
        assert_eq!(
            out,
            "\
```
+---+
| h |
+---+
| a |
+---+
```

=> gemini://a/ a
"
        );
    }
}
