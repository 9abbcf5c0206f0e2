//! Plain-text rendering of an [`Aggregate`] for the console report.
//!
//! One row per group, key columns left-aligned and measure columns
//! right-aligned, followed by a TOTAL row.

use store_core::formatting::format_number;
use store_data::aggregator::Aggregate;
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

/// Render `aggregate` as an aligned text table ending in a newline.
pub fn render_table(aggregate: &Aggregate) -> String {
    let mut header: Vec<String> = aggregate
        .keys()
        .iter()
        .map(|k| k.header().to_string())
        .collect();
    header.extend(aggregate.measures().iter().map(|m| m.header().to_string()));

    let key_columns = aggregate.keys().len();
    let mut rows: Vec<Vec<String>> = aggregate
        .groups()
        .iter()
        .map(|group| {
            let mut cells = group.key.clone();
            cells.extend(group.sums.iter().map(|v| format_number(*v, 2)));
            cells
        })
        .collect();

    let mut total = vec!["TOTAL".to_string()];
    total.resize(key_columns, String::new());
    for column in 0..aggregate.measures().len() {
        let sum: f64 = aggregate.groups().iter().map(|g| g.sums[column]).sum();
        total.push(format_number(sum, 2));
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|c| {
            std::iter::once(&header)
                .chain(rows.iter())
                .chain(std::iter::once(&total))
                .map(|row| row[c].width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);

    let mut out = String::new();
    push_row(&mut out, &header, &widths, key_columns);
    out.push_str(&rule);
    out.push('\n');
    for row in rows.drain(..) {
        push_row(&mut out, &row, &widths, key_columns);
    }
    out.push_str(&rule);
    out.push('\n');
    push_row(&mut out, &total, &widths, key_columns);
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize], key_columns: usize) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            // Pad by display width, not char count, for wide glyphs.
            let pad = " ".repeat(width.saturating_sub(cell.width()));
            if i < key_columns {
                format!("{cell}{pad}")
            } else {
                format!("{pad}{cell}")
            }
        })
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    out.push_str(line.trim_end());
    out.push('\n');
}
