//! Tables as fixed-width text grids.

use crate::dom::{ContentTree, NodeId, select};

/// Render a `<table>` as an ASCII grid:
///
/// ```text
/// +-----+----+
/// | a   | bb |
/// +-----+----+
/// | ccc | d  |
/// +-----+----+
/// ```
///
/// The first row is the header. Cells are trimmed and left-aligned; rows
/// shorter than the widest are padded with empty cells. A table without
/// rows renders as an empty string.
pub fn table_to_text(tree: &ContentTree, table: NodeId) -> String {
    let rows: Vec<Vec<String>> = select(tree, table, "tr")
        .into_iter()
        .map(|tr| {
            select(tree, tr, "th, td")
                .into_iter()
                .map(|cell| tree.text_content(cell).trim().to_string())
                .collect()
        })
        .collect();

    grid_from_rows(&rows)
}

/// Lay out already-extracted cell text.
pub fn grid_from_rows(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            rows.iter()
                .map(|row| row.get(i).map_or(0, |cell| cell.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let format_row = |row: &[String]| {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map_or("", String::as_str);
            let pad = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line.push('\n');
        line
    };

    let mut out = rule.clone();
    out.push_str(&format_row(header));
    out.push_str(&rule);
    for row in body {
        out.push_str(&format_row(row));
    }
    out.push_str(&rule);
    out
}
