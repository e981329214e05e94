//! Excel (.xlsx) reader.

use crate::error::{DocentError, Result};
use calamine::{Data, Reader};

/// Extract the first worksheet as a plain-text table.
pub fn read_xlsx(name: &str, data: &[u8]) -> Result<String> {
    let mut workbook = calamine::open_workbook_auto_from_rs(std::io::Cursor::new(data))
        .map_err(|e| DocentError::extraction(name, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DocentError::extraction(name, "workbook has no worksheets"))?
        .map_err(|e| DocentError::extraction(name, e))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(render_table(&rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Render rows as aligned columns, one line per row, followed by a blank line.
///
/// Empty rows inside the used range are kept as blank lines so row positions
/// match the sheet.
pub(crate) fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut text = String::new();
    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_render_aligns_columns() {
        let rows = vec![
            row(&["name", "qty"]),
            row(&["", ""]),
            row(&["widget", "12"]),
        ];
        assert_eq!(render_table(&rows), "name    qty\n\nwidget  12\n\n");
    }

    #[test]
    fn test_render_keeps_empty_rows() {
        let rows = vec![
            row(&["a", "b"]),
            row(&["", ""]),
            row(&["", ""]),
            row(&["c", "d"]),
        ];
        let text = render_table(&rows);
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text, "a  b\n\n\nc  d\n\n");
    }

    #[test]
    fn test_render_empty_sheet() {
        assert_eq!(render_table(&[]), "\n");
    }

    #[test]
    fn test_cell_text_variants() {
        assert_eq!(cell_text(&Data::Int(3)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_corrupt_workbook() {
        assert!(read_xlsx("bad.xlsx", b"not a workbook").is_err());
    }
}
