fn dashed_line(width: usize) -> String {
    "-".repeat(width)
}

/// Right-aligned plain-text table. Widths assume single-width characters.
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let ncols = header.len();
    let mut widths: Vec<_> = header.iter().map(|entry| entry.len()).collect();

    rows.iter().for_each(|row| {
        debug_assert_eq!(row.len(), ncols, "ragged table");
        row.iter().enumerate().for_each(|(colix, entry)| {
            if entry.len() > widths[colix] {
                widths[colix] = entry.len();
            }
        });
    });

    let mut table = String::new();
    let mut push_row = |cells: Vec<String>| {
        cells.iter().zip(widths.iter()).for_each(|(cell, &width)| {
            table.push_str("  ");
            table.push_str(&" ".repeat(width - cell.len()));
            table.push_str(cell);
        });
        table.push('\n');
    };

    push_row(header.to_vec());
    push_row(widths.iter().map(|&width| dashed_line(width)).collect());
    rows.iter().for_each(|row| push_row(row.clone()));

    table
}

pub fn print_table(header: &[String], rows: &[Vec<String>]) {
    print!("{}", format_table(header, rows));
}
